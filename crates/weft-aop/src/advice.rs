//! Advice behaviors that wrap an invocation.
//!
//! An advice may run code before and after the call, transform the result,
//! or decline to proceed at all. Advices in a chain know nothing about each
//! other; composition is the engine's job.

use std::time::Instant;

use async_trait::async_trait;

use weft_trace::{LogTrace, in_scope};

use crate::invocation::Invocation;
use crate::target::CallResult;

/// A behavior polymorphic over "wrap an invocation".
#[async_trait]
pub trait Advice: Send + Sync {
    async fn invoke(&self, invocation: Invocation) -> CallResult;
}

/// Proceeds without doing anything. Models no-op registrations.
pub struct NoopAdvice;

#[async_trait]
impl Advice for NoopAdvice {
    async fn invoke(&self, invocation: Invocation) -> CallResult {
        invocation.proceed().await
    }
}

/// Logs entry/exit/exception with nesting depth via the trace context.
///
/// The outermost proxied call of a task owns the call tree; nested proxied
/// calls extend it. Target errors are logged and re-raised unchanged.
pub struct LogTraceAdvice {
    trace: LogTrace,
}

impl LogTraceAdvice {
    pub fn new(trace: LogTrace) -> Self {
        Self { trace }
    }
}

#[async_trait]
impl Advice for LogTraceAdvice {
    async fn invoke(&self, invocation: Invocation) -> CallResult {
        in_scope(async {
            let status = self.trace.begin(invocation.method().describe());
            match invocation.proceed().await {
                Ok(value) => {
                    self.trace.end(status);
                    Ok(value)
                }
                Err(err) => {
                    self.trace.exception(status, &err);
                    Err(err)
                }
            }
        })
        .await
    }
}

/// Logs wall-clock timing around a call.
pub struct TimeAdvice;

#[async_trait]
impl Advice for TimeAdvice {
    async fn invoke(&self, invocation: Invocation) -> CallResult {
        let description = invocation.method().describe();
        let start = Instant::now();
        tracing::info!("TimeAdvice start: {}", description);

        let result = invocation.proceed().await;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "TimeAdvice end: {}",
            description
        );
        result
    }
}
