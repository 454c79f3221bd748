//! Demo order application.
//!
//! The three-layer call tree from the tutorial: controller → service →
//! repository. Each layer is wired through the advisor registry so every
//! level of a request is proxied, and the repository simulates latency and
//! a failing item (`"ex"`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use weft_aop::{
    Advisor, AdvisorRegistry, CallError, FnTarget, LogTraceAdvice, Pointcut, SharedTarget,
};
use weft_trace::LogTrace;

use crate::config::Config;

fn repository(delay: Duration) -> SharedTarget {
    FnTarget::new("hello.app.OrderRepository")
        .method("save", move |args| async move {
            let item_id = args.as_str().unwrap_or_default().to_string();
            if item_id == "ex" {
                return Err(CallError::target("invalid item id"));
            }
            tokio::time::sleep(delay).await;
            Ok(Value::Null)
        })
        .build()
}

fn service(repository: SharedTarget) -> SharedTarget {
    FnTarget::new("hello.app.OrderService")
        .method("order_item", move |args| {
            let repository = repository.clone();
            async move { repository.call("save", args).await }
        })
        .build()
}

fn controller(service: SharedTarget) -> SharedTarget {
    FnTarget::new("hello.app.OrderController")
        .method("request", move |args| {
            let service = service.clone();
            async move {
                service.call("order_item", args).await?;
                Ok(json!("ok"))
            }
        })
        .method("no_log", |_| async move { Ok(json!("ok")) })
        .build()
}

/// Assemble the proxied order stack and return the outermost surface.
pub fn build_app(trace: LogTrace, config: &Config) -> Result<SharedTarget> {
    let pointcut = match &config.advisor.expression {
        Some(expr) => Pointcut::expression(expr).context("invalid advisor expression")?,
        None => Pointcut::name_match(config.advisor.mapped_names.clone()),
    };

    let mut registry = AdvisorRegistry::new();
    if config.trace.enabled {
        registry.register_global(Advisor::new(
            pointcut,
            Arc::new(LogTraceAdvice::new(trace)),
        ));
    }

    let repository = registry.proxy(repository(Duration::from_millis(config.app.delay_ms)));
    let service = registry.proxy(service(repository));
    let controller = registry.proxy(controller(service));
    Ok(controller)
}
