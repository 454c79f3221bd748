//! Startup-time advisor registry.
//!
//! The explicit replacement for container-driven auto-proxying: the
//! assembly layer populates the registry once, then runs every component
//! through `proxy()`. Targets that no registered advisor applies to come
//! back unwrapped.

use crate::advisor::Advisor;
use crate::proxy::ProxyFactory;
use crate::target::{MethodRef, SharedTarget};

#[derive(Debug, Clone)]
enum Scope {
    /// Applies to every component.
    All,
    /// Applies to one component identity (the target's type name).
    Component(String),
}

/// Mapping from component identity to advisor list, in registration order.
#[derive(Default)]
pub struct AdvisorRegistry {
    entries: Vec<(Scope, Advisor)>,
}

impl AdvisorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an advisor to one component.
    pub fn register(&mut self, component: impl Into<String>, advisor: Advisor) {
        self.entries
            .push((Scope::Component(component.into()), advisor));
    }

    /// Attach an advisor to every component.
    pub fn register_global(&mut self, advisor: Advisor) {
        self.entries.push((Scope::All, advisor));
    }

    fn advisors_for(&self, type_name: &str) -> Vec<Advisor> {
        self.entries
            .iter()
            .filter(|(scope, _)| match scope {
                Scope::All => true,
                Scope::Component(name) => name == type_name,
            })
            .map(|(_, advisor)| advisor.clone())
            .collect()
    }

    /// Wrap a target with its registered advisors.
    ///
    /// Returns the target unwrapped when no advisor's pointcut matches any
    /// of its methods.
    pub fn proxy(&self, target: SharedTarget) -> SharedTarget {
        let advisors = self.advisors_for(target.type_name());
        let any_match = target.methods().iter().any(|name| {
            let method = MethodRef::new(target.type_name(), name);
            advisors.iter().any(|advisor| advisor.applies_to(&method))
        });
        if !any_match {
            return target;
        }

        let mut factory = ProxyFactory::new(target);
        for advisor in advisors {
            factory.add_advisor(advisor);
        }
        factory.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::NoopAdvice;
    use crate::pointcut::Pointcut;
    use crate::proxy::is_aop_proxy;
    use crate::target::FnTarget;
    use serde_json::json;
    use std::sync::Arc;

    fn service(type_name: &str) -> SharedTarget {
        FnTarget::new(type_name)
            .method("save", |_| async move { Ok(json!("saved")) })
            .method("find", |_| async move { Ok(json!("found")) })
            .build()
    }

    #[test]
    fn test_unmatched_target_comes_back_unwrapped() {
        let mut registry = AdvisorRegistry::new();
        registry.register_global(Advisor::new(
            Pointcut::name_match(["request*"]),
            Arc::new(NoopAdvice),
        ));

        let proxied = registry.proxy(service("app.Repo"));
        assert!(!is_aop_proxy(proxied.as_ref()));
    }

    #[test]
    fn test_global_advisor_applies_everywhere() {
        let mut registry = AdvisorRegistry::new();
        registry.register_global(Advisor::new(
            Pointcut::name_match(["save*"]),
            Arc::new(NoopAdvice),
        ));

        assert!(is_aop_proxy(registry.proxy(service("app.Repo")).as_ref()));
        assert!(is_aop_proxy(registry.proxy(service("app.Service")).as_ref()));
    }

    #[test]
    fn test_component_advisor_is_scoped() {
        let mut registry = AdvisorRegistry::new();
        registry.register(
            "app.Repo",
            Advisor::new(Pointcut::always(), Arc::new(NoopAdvice)),
        );

        assert!(is_aop_proxy(registry.proxy(service("app.Repo")).as_ref()));
        assert!(!is_aop_proxy(registry.proxy(service("app.Service")).as_ref()));
    }
}
