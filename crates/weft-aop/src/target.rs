//! Target call surface.
//!
//! `Target` is the capability interface shared by real components and the
//! proxies the engine builds around them: a named type exposing named async
//! operations over JSON arguments. `FnTarget` is the forwarding adapter for
//! wrapping concrete code that has no trait of its own.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::CallError;

/// Result of one proxied or direct call.
pub type CallResult = std::result::Result<Value, CallError>;

/// Shared handle to a target (or a proxy posing as one).
pub type SharedTarget = Arc<dyn Target>;

/// Identity of a call site: declaring type plus method name.
///
/// This is the entire input to static pointcut matching; argument values
/// never participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Dotted type path, e.g. `app.order.OrderService`.
    pub type_name: String,
    /// Simple method name, e.g. `order_item`.
    pub name: String,
}

impl MethodRef {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Full dotted path, e.g. `app.order.OrderService.order_item`.
    pub fn path(&self) -> String {
        format!("{}.{}", self.type_name, self.name)
    }

    /// Last segment of the type path, e.g. `OrderService`.
    pub fn simple_type_name(&self) -> &str {
        self.type_name.rsplit('.').next().unwrap_or(&self.type_name)
    }

    /// Human-readable call description, e.g. `OrderService.order_item()`.
    pub fn describe(&self) -> String {
        format!("{}.{}()", self.simple_type_name(), self.name)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// An operation surface the engine can wrap.
#[async_trait]
pub trait Target: Send + Sync {
    /// Dotted type path used by class filters and trace messages.
    fn type_name(&self) -> &str;

    /// Names of the exposed operations.
    fn methods(&self) -> Vec<String>;

    /// Invoke one operation.
    async fn call(&self, method: &str, args: Value) -> CallResult;

    /// Introspection: true only for engine-built proxies.
    fn is_proxy(&self) -> bool {
        false
    }
}

type MethodFn = Arc<dyn Fn(Value) -> BoxFuture<'static, CallResult> + Send + Sync>;

/// Forwarding adapter: exposes named async closures as a `Target`.
pub struct FnTarget {
    type_name: String,
    methods: Vec<String>,
    handlers: HashMap<String, MethodFn>,
}

impl FnTarget {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            methods: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register one operation.
    pub fn method<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallResult> + Send + 'static,
    {
        let name = name.into();
        self.methods.push(name.clone());
        self.handlers.insert(name, Arc::new(move |args| Box::pin(f(args))));
        self
    }

    /// Finish building and return a shared handle.
    pub fn build(self) -> SharedTarget {
        Arc::new(self)
    }
}

#[async_trait]
impl Target for FnTarget {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn methods(&self) -> Vec<String> {
        self.methods.clone()
    }

    async fn call(&self, method: &str, args: Value) -> CallResult {
        match self.handlers.get(method) {
            Some(handler) => handler(args).await,
            None => Err(CallError::UnknownMethod(method.to_string())),
        }
    }
}
