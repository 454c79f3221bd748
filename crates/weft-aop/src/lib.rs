//! weft-aop: cross-cutting interception engine
//!
//! This crate wraps arbitrary target operations with ordered chains of
//! advice behaviors selected by pointcut predicates:
//! - `Target`: the async call surface shared by real components and proxies
//! - `Advice`: wrap-an-invocation behavior (before/after/on-failure/suppress)
//! - `Pointcut`: (class filter, method matcher) predicate with name-glob
//!   and `execution(..)` expression variants
//! - `Advisor`: a bound (pointcut, advice) pair
//! - `ProxyFactory`: folds matched advisors into per-method chains behind
//!   a transparent `Proxy`
//! - `AdvisorRegistry`: startup-time mapping from component identity to
//!   advisors, for wiring whole object graphs
//!
//! The composed chain is equivalent to direct nested function calls: the
//! first-registered advisor is the outermost wrapper, errors propagate
//! unchanged, and a method no advisor matches forwards with no overhead.

pub mod advice;
pub mod advisor;
pub mod error;
pub mod invocation;
pub mod pointcut;
pub mod proxy;
pub mod registry;
pub mod target;

pub use advice::{Advice, LogTraceAdvice, NoopAdvice, TimeAdvice};
pub use advisor::Advisor;
pub use error::{AopError, CallError, Result};
pub use invocation::Invocation;
pub use pointcut::{
    ClassFilter, ExpressionMethodMatcher, MethodMatcher, NameMatchMethodMatcher, Pointcut,
};
pub use proxy::{Proxy, ProxyFactory, is_aop_proxy};
pub use registry::AdvisorRegistry;
pub use target::{CallResult, FnTarget, MethodRef, SharedTarget, Target};
