//! Property-based tests for coordinator bookkeeping

#[cfg(test)]
mod tests {
    use crate::coordinator::Coordinator;
    use crate::deferred::Work;
    use crate::testing::{
        assert_progress_consistent, yielding_value, CallLog, GraphBuilder, DEFAULT_WAIT,
    };
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use tokio_test::block_on;

    fn first_occurrences(keys: &[u8]) -> Vec<u8> {
        let mut seen = BTreeSet::new();
        keys.iter().copied().filter(|key| seen.insert(*key)).collect()
    }

    // Property test: every distinct key is mapped exactly once
    proptest! {
        #[test]
        fn test_map_runs_once_per_distinct_key(keys in prop::collection::vec(0u8..32, 0..64)) {
            let calls = CallLog::new();
            let log = calls.clone();

            let (result, progress) = block_on(async move {
                let coordinator: Coordinator<u8, u32, u32, String> = Coordinator::with_keys(keys);
                coordinator
                    .reduce(|acc, value, ctx| {
                        // Re-submitting the current key must never map it again
                        ctx.remap(*ctx.key());
                        acc + value
                    })
                    .map(move |key: &u8| {
                        log.record(key);
                        Work::value(u32::from(*key))
                    });
                let result = tokio::time::timeout(DEFAULT_WAIT, coordinator.wait()).await;
                (result, coordinator.progress())
            });

            let distinct = first_occurrences(&calls.calls());
            prop_assert_eq!(calls.len(), distinct.len());
            prop_assert_eq!(&progress.mapped, &distinct);

            let expected: u32 = distinct.iter().map(|key| u32::from(*key)).sum();
            prop_assert_eq!(result.ok(), Some(Ok(expected)));
        }
    }

    // Property test: in-flight count and settlement ledgers stay consistent
    proptest! {
        #[test]
        fn test_settlement_ledgers_partition_work(keys in prop::collection::vec(0u16..200, 0..48)) {
            let (result, progress) = block_on(async move {
                let coordinator: Coordinator<u16, u16, usize, String> = Coordinator::with_keys(keys);
                coordinator
                    .reduce(|acc, _value, _ctx| acc + 1)
                    .map(|key: &u16| match key % 4 {
                        0 => Work::skip(),
                        1 => Work::value(*key),
                        2 => Work::failed(format!("key {}", key)),
                        _ => yielding_value(*key),
                    });
                let result = tokio::time::timeout(DEFAULT_WAIT, coordinator.wait()).await;
                (result, coordinator.progress())
            });

            assert_progress_consistent(&progress);
            prop_assert_eq!(progress.in_flight, 0);

            let expected_resolved = progress.mapped.iter().filter(|key| *key % 4 % 2 == 1).count();
            let expected_rejected = progress.mapped.iter().filter(|key| *key % 4 == 2).count();
            prop_assert_eq!(progress.resolved.len(), expected_resolved);
            prop_assert_eq!(progress.rejected.len(), expected_rejected);
            prop_assert_eq!(result.ok(), Some(Ok(expected_resolved)));
        }
    }

    // Property test: a reducer-driven walk visits exactly the reachable nodes
    proptest! {
        #[test]
        fn test_walk_visits_reachable_nodes(
            edges in prop::collection::vec((0u32..24, 0u32..24), 0..60),
            start in 0u32..24,
        ) {
            let graph = GraphBuilder::new().edges(edges).build();
            let expected = graph.reachable_from(start);

            let visited = block_on(async move {
                let coordinator: Coordinator<u32, u32, BTreeSet<u32>, String> =
                    Coordinator::with_keys([start]);
                coordinator
                    .reduce(move |mut visited, node, ctx| {
                        for &next in graph.neighbours(node) {
                            ctx.remap(next);
                        }
                        visited.insert(node);
                        visited
                    })
                    .map(|node: &u32| yielding_value(*node));
                tokio::time::timeout(DEFAULT_WAIT, coordinator.wait()).await
            });

            prop_assert_eq!(visited.ok(), Some(Ok(expected)));
        }
    }
}
