//! A single in-flight proxied call.
//!
//! An `Invocation` carries the target handle, the call identity and
//! arguments, plus the matched advice chain and a cursor into it.
//! `proceed()` consumes the invocation and runs the next link, or the real
//! target once the chain is exhausted; an advice that never calls
//! `proceed()` suppresses the call entirely.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::advice::Advice;
use crate::target::{CallResult, MethodRef, SharedTarget};

/// Handle to the underlying call, handed to each advice in turn.
pub struct Invocation {
    target: SharedTarget,
    method: MethodRef,
    args: Value,
    chain: Arc<[Arc<dyn Advice>]>,
    index: usize,
}

impl Invocation {
    pub(crate) fn new(
        target: SharedTarget,
        method: MethodRef,
        args: Value,
        chain: Arc<[Arc<dyn Advice>]>,
    ) -> Self {
        Self {
            target,
            method,
            args,
            chain,
            index: 0,
        }
    }

    /// The call site being invoked.
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// The call arguments.
    pub fn args(&self) -> &Value {
        &self.args
    }

    /// Execute the next link in the chain and return its result or
    /// propagate its failure unchanged.
    pub async fn proceed(self) -> CallResult {
        match self.chain.get(self.index).cloned() {
            Some(advice) => {
                let next = Self {
                    index: self.index + 1,
                    ..self
                };
                advice.invoke(next).await
            }
            None => self.target.call(&self.method.name, self.args).await,
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.method)
            .field("index", &self.index)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}
