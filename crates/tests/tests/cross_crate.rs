//! Cross-crate integration tests
//!
//! These tests run full call trees through proxied component stacks and
//! verify the trace records the interception engine produces.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use weft_aop::{
    Advice, Advisor, CallError, CallResult, FnTarget, Invocation, LogTraceAdvice, Pointcut,
    ProxyFactory, SharedTarget, Target,
};
use weft_trace::{Direction, JsonlSink, LogTrace, MemorySink, TraceRecord, TraceSink};

fn repository() -> SharedTarget {
    FnTarget::new("shop.app.OrderRepository")
        .method("save", |args| async move {
            if args.as_str() == Some("ex") {
                return Err(CallError::target("item rejected"));
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(Value::Null)
        })
        .build()
}

fn service(repository: SharedTarget) -> SharedTarget {
    FnTarget::new("shop.app.OrderService")
        .method("order_item", move |args| {
            let repository = repository.clone();
            async move { repository.call("save", args).await }
        })
        .build()
}

fn controller(service: SharedTarget) -> SharedTarget {
    FnTarget::new("shop.app.OrderController")
        .method("request", move |args| {
            let service = service.clone();
            async move {
                service.call("order_item", args).await?;
                Ok(json!("ok"))
            }
        })
        .build()
}

fn traced(target: SharedTarget, trace: &LogTrace) -> SharedTarget {
    let mut factory = ProxyFactory::new(target);
    factory.add_advice(Arc::new(LogTraceAdvice::new(trace.clone())));
    factory.build()
}

/// Controller → service → repository, every layer behind a trace proxy.
fn proxied_stack(trace: &LogTrace) -> SharedTarget {
    let repository = traced(repository(), trace);
    let service = traced(service(repository), trace);
    traced(controller(service), trace)
}

fn shape(records: &[TraceRecord]) -> Vec<(u32, Direction, String)> {
    records
        .iter()
        .map(|r| (r.level, r.direction, r.message.clone()))
        .collect()
}

#[tokio::test]
async fn test_full_tree_success_flow() {
    let sink = Arc::new(MemorySink::new());
    let stack = proxied_stack(&LogTrace::with_sink(sink.clone()));

    let result = stack.call("request", json!("itemA")).await.unwrap();
    assert_eq!(result, json!("ok"));

    let records = sink.records();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.trace_id == records[0].trace_id));
    assert_eq!(
        shape(&records),
        vec![
            (0, Direction::Begin, "OrderController.request()".to_string()),
            (1, Direction::Begin, "OrderService.order_item()".to_string()),
            (2, Direction::Begin, "OrderRepository.save()".to_string()),
            (2, Direction::End, "OrderRepository.save()".to_string()),
            (1, Direction::End, "OrderService.order_item()".to_string()),
            (0, Direction::End, "OrderController.request()".to_string()),
        ]
    );
    for record in records.iter().filter(|r| r.direction == Direction::End) {
        assert!(record.elapsed_ms.is_some());
    }
}

#[tokio::test]
async fn test_full_tree_exception_flow() {
    let sink = Arc::new(MemorySink::new());
    let stack = proxied_stack(&LogTrace::with_sink(sink.clone()));

    let err = stack.call("request", json!("ex")).await.unwrap_err();
    assert_eq!(err, CallError::target("item rejected"));

    let records = sink.records();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.trace_id == records[0].trace_id));
    // Each frame's exception record carries the same level as its begin.
    let exits: Vec<(u32, Direction)> = records[3..]
        .iter()
        .map(|r| (r.level, r.direction))
        .collect();
    assert_eq!(
        exits,
        vec![
            (2, Direction::Exception),
            (1, Direction::Exception),
            (0, Direction::Exception),
        ]
    );
    assert!(
        records[3..]
            .iter()
            .all(|r| r.error.as_deref() == Some("item rejected"))
    );
}

#[tokio::test]
async fn test_consecutive_trees_get_fresh_ids() {
    let sink = Arc::new(MemorySink::new());
    let stack = proxied_stack(&LogTrace::with_sink(sink.clone()));

    stack.call("request", json!("itemA")).await.unwrap();
    stack.call("request", json!("itemB")).await.unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 12);
    assert_ne!(records[0].trace_id, records[6].trace_id);
    assert_eq!(records[6].level, 0);
}

#[tokio::test]
async fn test_concurrent_trees_are_isolated() {
    let sink = Arc::new(MemorySink::new());
    let trace = LogTrace::with_sink(sink.clone());
    let stack = proxied_stack(&trace);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let stack = stack.clone();
        handles.push(tokio::spawn(async move {
            stack.call("request", json!("itemA")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = sink.records();
    assert_eq!(records.len(), 24);

    let mut ids: Vec<String> = records.iter().map(|r| r.trace_id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4, "each call tree owns a distinct trace id");

    // Within one tree the level sequence is intact regardless of
    // interleaving with the other trees.
    for id in &ids {
        let levels: Vec<u32> = records
            .iter()
            .filter(|r| &r.trace_id == id)
            .map(|r| r.level)
            .collect();
        assert_eq!(levels, vec![0, 1, 2, 2, 1, 0]);
    }
}

#[tokio::test]
async fn test_two_trace_advisors_nest_on_one_proxy() {
    let sink = Arc::new(MemorySink::new());
    let trace = LogTrace::with_sink(sink.clone());

    let mut factory = ProxyFactory::new(repository());
    factory.add_advisor(Advisor::new(
        Pointcut::always(),
        Arc::new(LogTraceAdvice::new(trace.clone())),
    ));
    factory.add_advisor(Advisor::new(
        Pointcut::always(),
        Arc::new(LogTraceAdvice::new(trace)),
    ));
    let proxy = factory.build();

    proxy.call("save", json!("itemA")).await.unwrap();

    // First-registered advisor is outermost: its begin comes first and its
    // end comes last, one nesting level apart.
    let records = sink.records();
    assert_eq!(
        records.iter().map(|r| r.level).collect::<Vec<_>>(),
        vec![0, 1, 1, 0]
    );
    assert!(records.iter().all(|r| r.trace_id == records[0].trace_id));
}

#[tokio::test]
async fn test_rebuilt_proxy_produces_identical_logs() {
    let sink = Arc::new(MemorySink::new());
    let trace = LogTrace::with_sink(sink.clone());

    let mut factory = ProxyFactory::new(repository());
    factory.add_advisor(Advisor::new(
        Pointcut::name_match(["save*"]),
        Arc::new(LogTraceAdvice::new(trace)),
    ));

    let first = factory.build();
    first.call("save", json!("itemA")).await.unwrap();
    let first_shape = shape(&sink.records());
    sink.clear();

    let second = factory.build();
    second.call("save", json!("itemA")).await.unwrap();

    // Identical modulo trace id and timing.
    assert_eq!(shape(&sink.records()), first_shape);
}

#[tokio::test]
async fn test_trace_and_noop_advisors_call_target_once() {
    struct CountingAdvice {
        calls: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl Advice for CountingAdvice {
        async fn invoke(&self, invocation: Invocation) -> CallResult {
            *self.calls.lock().unwrap() += 1;
            invocation.proceed().await
        }
    }

    let sink = Arc::new(MemorySink::new());
    let calls = Arc::new(Mutex::new(0));

    let mut factory = ProxyFactory::new(repository());
    factory.add_advisor(Advisor::new(
        Pointcut::always(),
        Arc::new(LogTraceAdvice::new(LogTrace::with_sink(sink.clone()))),
    ));
    factory.add_advisor(Advisor::new(
        Pointcut::always(),
        Arc::new(CountingAdvice {
            calls: calls.clone(),
        }),
    ));
    let proxy = factory.build();

    proxy.call("save", json!("itemA")).await.unwrap();

    // One composed chain: the inner advice (and the target) ran exactly once.
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(sink.records().len(), 2);
}

#[tokio::test]
async fn test_records_persist_through_jsonl_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("traces.jsonl");
    let sink: Arc<dyn TraceSink> = Arc::new(JsonlSink::new(&path).unwrap());
    let stack = proxied_stack(&LogTrace::with_sink(sink));

    stack.call("request", json!("itemA")).await.unwrap();

    let records = JsonlSink::read_records(&path).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(
        records.iter().map(|r| r.level).collect::<Vec<_>>(),
        vec![0, 1, 2, 2, 1, 0]
    );
    assert!(records.iter().all(|r| r.trace_id == records[0].trace_id));
}
