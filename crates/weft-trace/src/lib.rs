//! Call-tree trace context.
//!
//! This crate tracks nested call depth per logical call stack and emits one
//! structured record per entry/exit/exception:
//!
//! - **Types**: `TraceId`, `TraceStatus`, `TraceRecord`, `Direction`
//! - **Context**: `LogTrace` with begin/end/exception, backed by a
//!   task-local cell installed via `in_scope()`
//! - **Sinks**: `tracing`-backed default, in-memory capture, JSONL file
//!
//! # Usage
//!
//! ```rust,no_run
//! use weft_trace::{LogTrace, in_scope};
//!
//! #[tokio::main]
//! async fn main() {
//!     let trace = LogTrace::new();
//!
//!     in_scope(async {
//!         let status = trace.begin("OrderService.order_item()");
//!
//!         // Do work... nested begin/end calls extend the same tree.
//!
//!         trace.end(status);
//!     })
//!     .await;
//! }
//! ```
//!
//! All records for one tree share an 8-character correlation id; the level
//! field reflects nesting depth, and the exception path performs the same
//! depth bookkeeping as the success path.

pub mod context;
pub mod sink;
pub mod types;

// Re-export main types
pub use context::{LogTrace, current_trace_id, in_scope, is_active};
pub use sink::{JsonlSink, LogSink, MemorySink, SinkError, TraceSink};
pub use types::{Direction, TraceId, TraceRecord, TraceStatus};
