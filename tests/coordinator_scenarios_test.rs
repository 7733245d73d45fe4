mod common;

use iterative_mapreduce::prelude::*;
use iterative_mapreduce::testing::{delayed_failure, delayed_value, CallLog};
use iterative_mapreduce::{assert_rejects, assert_resolves};
use std::time::Duration;

type Sum = Coordinator<u32, u32, u32, String>;

#[tokio::test]
async fn test_scenario_ready_values_sum() {
    common::init_test_logging();

    let coordinator = Sum::with_keys([1, 2, 3]);
    coordinator
        .map(|key: &u32| Work::value(*key))
        .reduce_with(|acc, value, _ctx| acc + value, 0);

    assert_resolves!(coordinator, 6);

    let progress = coordinator.progress();
    assert_eq!(progress.resolved, vec![1, 2, 3]);
    assert!(progress.rejected.is_empty());
    assert_eq!(progress.state, CompletionState::Resolved);
}

#[tokio::test]
async fn test_scenario_empty_keys_resolve_with_default() {
    let coordinator: Coordinator<u32, u32, Option<u32>, String> = Coordinator::new();
    coordinator.start_with(Vec::new());

    assert_resolves!(coordinator, None);
    assert!(coordinator.progress().mapped.is_empty());
}

#[tokio::test]
async fn test_scenario_failure_is_data() {
    let coordinator = Sum::with_keys([1]);
    coordinator
        .reduce_with(|acc, value, _ctx| acc + value, 9)
        .map(|_key: &u32| delayed_failure("unreachable".to_string(), Duration::from_millis(5)));

    assert_resolves!(coordinator, 9);

    let progress = coordinator.progress();
    assert_eq!(progress.rejected, vec![1]);
    assert!(progress.resolved.is_empty());
    assert_eq!(progress.in_flight, 0);
}

#[tokio::test]
async fn test_scenario_end_hook_restarts_mapping() {
    let calls = CallLog::new();
    let log = calls.clone();
    let mut cycles = 0;

    let coordinator = Sum::with_keys([1]);
    coordinator
        .reduce(|acc, value, _ctx| acc + value)
        .end(move |_acc, ctx| {
            cycles += 1;
            if cycles == 1 {
                ctx.remap(2);
            }
        })
        .map(move |key: &u32| {
            log.record(key);
            delayed_value(*key * 10, Duration::from_millis(5))
        });

    assert_resolves!(coordinator, 30);
    assert_eq!(calls.calls(), vec![1, 2]);
    assert_eq!(coordinator.progress().end_invocations, 2);
}

#[tokio::test]
async fn test_scenario_no_work_for_key() {
    let coordinator = Sum::with_keys([1, 7, 3]);
    coordinator
        .reduce(|acc, value, _ctx| acc + value)
        .map(|key: &u32| -> Option<Work<u32, String>> {
            (*key != 7).then(|| Work::value(*key))
        });

    assert_resolves!(coordinator, 4);

    let progress = coordinator.progress();
    assert_eq!(progress.mapped, vec![1, 7, 3]);
    assert!(!progress.resolved.contains(&7));
    assert!(!progress.rejected.contains(&7));
    assert_eq!(progress.in_flight, 0);
}

#[tokio::test]
async fn test_end_hook_can_reject() {
    let coordinator = Sum::with_keys([1, 2]);
    coordinator
        .reduce(|acc, value, _ctx| acc + value)
        .end(|acc, ctx| {
            if !ctx.rejected().is_empty() || *acc < 10 {
                ctx.reject(format!("total {} below threshold", acc));
            }
        })
        .map(|key: &u32| Work::value(*key));

    let reason = assert_rejects!(coordinator);
    assert_eq!(reason, "total 3 below threshold");
}

#[tokio::test]
async fn test_deferred_map_results_pass_through() {
    let upstream: Deferred<u32, String> = Deferred::new();
    let source = upstream.clone();

    let coordinator = Sum::with_keys([1, 2]);
    coordinator
        .reduce(|acc, value, _ctx| acc + value)
        .map(move |key: &u32| match *key {
            1 => source.clone().into_work(),
            _ => Deferred::resolved(5).into_work(),
        });

    assert_eq!(coordinator.progress().in_flight, 1);
    upstream.resolve(20);

    assert_resolves!(coordinator, 25);
}

#[tokio::test]
async fn test_progress_serializes() {
    let coordinator = Sum::with_config(CoordinatorConfig::default().with_name("scenario"));
    coordinator
        .reduce(|acc, value, _ctx| acc + value)
        .map(|key: &u32| Work::value(*key))
        .start_with([4, 5]);

    assert_resolves!(coordinator, 9);

    let json = coordinator.progress().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "scenario");
    assert_eq!(value["state"], "resolved");
    assert_eq!(value["resolved"], serde_json::json!([4, 5]));
}
