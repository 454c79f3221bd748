//! Task-local trace context.
//!
//! Each logical call stack (one tokio task tree entered through `in_scope`)
//! owns its own active `TraceId` cell. `begin` extends the active id or
//! starts a fresh tree; `end`/`exception` release one level, and releasing
//! the root frame clears the cell so the next `begin` starts a new tree.
//! Concurrent, unrelated tasks never observe each other's id or depth.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;

use crate::sink::{LogSink, TraceSink};
use crate::types::{Direction, TraceId, TraceRecord, TraceStatus};

tokio::task_local! {
    static ACTIVE_TRACE: RefCell<Option<TraceId>>;
}

/// Handle for begin/end/exception trace logging.
///
/// Cloneable; clones share the same sink. None of the operations returns a
/// `Result` and none of them panics: telemetry must never affect business
/// outcomes.
#[derive(Clone)]
pub struct LogTrace {
    sink: Arc<dyn TraceSink>,
}

impl LogTrace {
    /// Create a trace handle that emits through `tracing`.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }

    /// Create a trace handle with a custom sink.
    pub fn with_sink(sink: Arc<dyn TraceSink>) -> Self {
        Self { sink }
    }

    /// Enter a frame: extend the active trace (or start a fresh tree) and
    /// emit the entry record.
    pub fn begin(&self, message: impl Into<String>) -> TraceStatus {
        let status = TraceStatus::new(advance(), message.into());
        self.sink.emit(&TraceRecord {
            trace_id: status.trace_id.id().to_string(),
            level: status.trace_id.level(),
            direction: Direction::Begin,
            message: status.message.clone(),
            elapsed_ms: None,
            error: None,
            timestamp: status.started_at,
        });
        status
    }

    /// Leave a frame successfully: emit the exit record and release one level.
    pub fn end(&self, status: TraceStatus) {
        self.complete(status, None);
    }

    /// Leave a frame via error: emit the exception record and release one
    /// level. Same depth bookkeeping as the success path.
    pub fn exception(&self, status: TraceStatus, error: &dyn fmt::Display) {
        self.complete(status, Some(error.to_string()));
    }

    fn complete(&self, mut status: TraceStatus, error: Option<String>) {
        let direction = if error.is_some() {
            Direction::Exception
        } else {
            Direction::End
        };
        self.sink.emit(&TraceRecord {
            trace_id: status.trace_id.id().to_string(),
            level: status.trace_id.level(),
            direction,
            message: status.message.clone(),
            elapsed_ms: Some(status.elapsed_ms()),
            error,
            timestamp: Utc::now(),
        });
        status.completed = true;
        release(&status.trace_id);
    }
}

impl Default for LogTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogTrace").finish_non_exhaustive()
    }
}

/// Push one level: extend the active id, or start a fresh root.
///
/// Degrades to an unbooked root id when no scope is installed, so `begin`
/// works (as a flat, per-call trace) even outside `in_scope`.
fn advance() -> TraceId {
    ACTIVE_TRACE
        .try_with(|cell| {
            let mut active = cell.borrow_mut();
            let next = match &*active {
                Some(id) => id.next(),
                None => TraceId::new(),
            };
            *active = Some(next.clone());
            next
        })
        .unwrap_or_default()
}

/// Pop one level. Releasing the root frame clears the cell.
pub(crate) fn release(trace_id: &TraceId) {
    let _ = ACTIVE_TRACE.try_with(|cell| {
        let mut active = cell.borrow_mut();
        *active = if trace_id.is_root() {
            None
        } else {
            Some(trace_id.prev())
        };
    });
}

/// Run a future with an active-trace cell installed for the current task.
///
/// Nests transparently: if a cell is already installed the future runs in
/// the existing scope, so nested proxied calls extend the outer tree.
pub async fn in_scope<F>(f: F) -> F::Output
where
    F: Future,
{
    if ACTIVE_TRACE.try_with(|_| ()).is_ok() {
        f.await
    } else {
        ACTIVE_TRACE.scope(RefCell::new(None), f).await
    }
}

/// Whether a trace is active in the current task.
pub fn is_active() -> bool {
    ACTIVE_TRACE
        .try_with(|cell| cell.borrow().is_some())
        .unwrap_or(false)
}

/// The correlation token of the active trace, if any.
pub fn current_trace_id() -> Option<String> {
    ACTIVE_TRACE
        .try_with(|cell| cell.borrow().as_ref().map(|id| id.id().to_string()))
        .ok()
        .flatten()
}
