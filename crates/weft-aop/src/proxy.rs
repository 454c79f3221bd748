//! Proxy composition: fold matched advices into per-method invocation
//! chains behind a call surface identical to the target's.
//!
//! Chains are composed once at build time from the static pointcut match;
//! the first-registered advisor becomes the outermost wrapper. A method
//! with no matching advisor forwards directly to the target.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::advice::Advice;
use crate::advisor::Advisor;
use crate::invocation::Invocation;
use crate::pointcut::Pointcut;
use crate::target::{CallResult, MethodRef, SharedTarget, Target};

type AdviceChain = Arc<[Arc<dyn Advice>]>;

/// Pairs a target with an ordered advisor list and builds proxies from it.
pub struct ProxyFactory {
    target: SharedTarget,
    advisors: Vec<Advisor>,
}

impl ProxyFactory {
    pub fn new(target: SharedTarget) -> Self {
        Self {
            target,
            advisors: Vec::new(),
        }
    }

    /// Register an advisor. Registration order is wrapping order: the first
    /// registered advisor observes the call first on entry and last on
    /// return.
    pub fn add_advisor(&mut self, advisor: Advisor) {
        self.advisors.push(advisor);
    }

    /// Register an advice that applies to every method.
    pub fn add_advice(&mut self, advice: Arc<dyn Advice>) {
        self.add_advisor(Advisor::new(Pointcut::always(), advice));
    }

    /// Compose the per-method chains and return the proxy.
    ///
    /// Deterministic and side-effect free: building the same
    /// (target, advisors) pair twice yields chains with identical behavior
    /// and ordering.
    pub fn build(&self) -> Arc<Proxy> {
        let mut chains: HashMap<String, AdviceChain> = HashMap::new();
        for name in self.target.methods() {
            let method = MethodRef::new(self.target.type_name(), &name);
            let chain: Vec<Arc<dyn Advice>> = self
                .advisors
                .iter()
                .filter(|advisor| advisor.applies_to(&method))
                .map(|advisor| advisor.advice().clone())
                .collect();
            if !chain.is_empty() {
                chains.insert(name, Arc::from(chain));
            }
        }
        Arc::new(Proxy {
            target: self.target.clone(),
            chains,
        })
    }
}

/// Call surface indistinguishable from the real target, except via
/// `is_proxy` introspection and logging side effects.
pub struct Proxy {
    target: SharedTarget,
    chains: HashMap<String, AdviceChain>,
}

#[async_trait]
impl Target for Proxy {
    fn type_name(&self) -> &str {
        self.target.type_name()
    }

    fn methods(&self) -> Vec<String> {
        self.target.methods()
    }

    async fn call(&self, method: &str, args: Value) -> CallResult {
        match self.chains.get(method) {
            // No matching advisor: forward directly.
            None => self.target.call(method, args).await,
            Some(chain) => {
                let invocation = Invocation::new(
                    self.target.clone(),
                    MethodRef::new(self.target.type_name(), method),
                    args,
                    chain.clone(),
                );
                invocation.proceed().await
            }
        }
    }

    fn is_proxy(&self) -> bool {
        true
    }
}

/// Introspection query: was this call surface built by the engine?
pub fn is_aop_proxy(target: &dyn Target) -> bool {
    target.is_proxy()
}
