//! Error types for the interception engine.

use thiserror::Error;

/// Result type alias for build-time operations.
pub type Result<T> = std::result::Result<T, AopError>;

/// Build-time failures, surfaced when advisors are constructed or wired.
///
/// These never occur at call time: a pointcut expression either parses when
/// the advisor is built or the wiring fails fast.
#[derive(Debug, Error)]
pub enum AopError {
    /// A pointcut expression that cannot be parsed.
    #[error("Pointcut expression error: {0}")]
    Expression(String),
}

/// Call-time failures flowing through an interception chain.
///
/// Advices re-raise these unchanged, so the proxy caller observes exactly
/// what the target raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Raised by the wrapped operation itself.
    #[error("{message}")]
    Target { message: String },

    /// The method name does not resolve on the target.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
}

impl CallError {
    /// A failure raised by the wrapped operation.
    pub fn target(message: impl Into<String>) -> Self {
        Self::Target {
            message: message.into(),
        }
    }
}
