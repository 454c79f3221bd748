//! Trace identity and per-frame status types.
//!
//! A `TraceId` names one call tree and carries the nesting depth of the
//! current frame. A `TraceStatus` is the snapshot handed out by
//! `LogTrace::begin` and consumed exactly once by `end`/`exception`.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Correlation id plus nesting depth for one frame of a call tree.
///
/// Every record emitted for the same tree shares the same `id`; `level`
/// grows by one per nested call and shrinks by one on return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId {
    id: String,
    level: u32,
}

impl TraceId {
    /// Create a fresh root id (level 0) for a new call tree.
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            level: 0,
        }
    }

    /// Same tree, one level deeper.
    pub fn next(&self) -> Self {
        Self {
            id: self.id.clone(),
            level: self.level + 1,
        }
    }

    /// Same tree, one level shallower.
    pub fn prev(&self) -> Self {
        Self {
            id: self.id.clone(),
            level: self.level.saturating_sub(1),
        }
    }

    /// True for the outermost frame of a tree.
    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    /// The opaque correlation token shared by the whole tree.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Zero-based nesting depth of this frame.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame snapshot created at `begin` and consumed at `end`/`exception`.
///
/// If a status is dropped without being consumed (the surrounding future was
/// cancelled mid-call), `Drop` still releases the nesting level so depth does
/// not leak into later call trees.
#[derive(Debug)]
pub struct TraceStatus {
    pub(crate) trace_id: TraceId,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) start: Instant,
    pub(crate) message: String,
    pub(crate) completed: bool,
}

impl TraceStatus {
    pub(crate) fn new(trace_id: TraceId, message: String) -> Self {
        Self {
            trace_id,
            started_at: Utc::now(),
            start: Instant::now(),
            message,
            completed: false,
        }
    }

    /// The id/level this frame was entered with.
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// The message used at both entry and exit logging.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Milliseconds elapsed since `begin`.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for TraceStatus {
    fn drop(&mut self) {
        if !self.completed {
            crate::context::release(&self.trace_id);
        }
    }
}

/// Which side of a frame a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Call entry.
    #[serde(rename = "-->")]
    Begin,
    /// Successful return.
    #[serde(rename = "<--")]
    End,
    /// Return via error.
    #[serde(rename = "<X-")]
    Exception,
}

impl Direction {
    /// The arrow marker used in rendered lines.
    pub fn marker(&self) -> &'static str {
        match self {
            Direction::Begin => "-->",
            Direction::End => "<--",
            Direction::Exception => "<X-",
        }
    }
}

/// One structured record per `begin`/`end`/`exception` call.
///
/// Stable enough for correlation tooling: group by `trace_id`, order by
/// emission time to reconstruct the call tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Correlation token shared by the whole call tree.
    pub trace_id: String,

    /// Nesting depth of the frame this record belongs to.
    pub level: u32,

    /// Entry, exit, or exception.
    pub direction: Direction,

    /// Human-readable operation description.
    pub message: String,

    /// Elapsed milliseconds; present on exit records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,

    /// Error description; present on exception records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the record was emitted.
    pub timestamp: DateTime<Utc>,
}

impl TraceRecord {
    /// Render the human-readable line, e.g. `[b2a9e4f1] |   |-->OrderRepository.save()`.
    pub fn render(&self) -> String {
        let mut line = format!(
            "[{}] {}{}",
            self.trace_id,
            indent(self.direction.marker(), self.level),
            self.message
        );
        if let Some(ms) = self.elapsed_ms {
            line.push_str(&format!(" time={}ms", ms));
        }
        if let Some(err) = &self.error {
            line.push_str(&format!(" ex={}", err));
        }
        line
    }
}

/// Depth indentation: `level` branch markers, the last one carrying the arrow.
fn indent(marker: &str, level: u32) -> String {
    if level == 0 {
        return marker.to_string();
    }
    let mut out = String::new();
    for i in 0..level {
        if i == level - 1 {
            out.push('|');
            out.push_str(marker);
        } else {
            out.push_str("|   ");
        }
    }
    out
}
