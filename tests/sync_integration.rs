//! Integration tests for the batch synchronizer
//!
//! These tests drive the synchronizer with schedule assignments against a
//! deterministic store fake.

mod common;

use common::{create_assignments, FakeStore};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use visitplan::models::ScheduleAssignment;
use visitplan::sync::{
    BatchOptions, BatchSynchronizer, CancellationHandle, ItemError, SyncError,
};

fn fast_options() -> BatchOptions<ScheduleAssignment> {
    BatchOptions::new()
        .with_concurrency(4)
        .with_retry_base_delay(Duration::from_millis(1))
}

fn ids<'a>(items: impl Iterator<Item = &'a ScheduleAssignment>) -> HashSet<String> {
    items.map(|a| a.candidate_id().to_string()).collect()
}

// ============================================================================
// Accounting
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_every_item_accounted_once(
        n in 0usize..30,
        concurrency in 1usize..8,
        failing in proptest::collection::hash_set(0usize..30, 0..10),
        permanent in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let items = create_assignments(n);
        let failing_ids: Vec<String> = failing
            .iter()
            .filter(|&&i| i < n)
            .map(|i| format!("S-{i:03}"))
            .collect();
        let error = if permanent {
            ItemError::NotFound("gone".into())
        } else {
            ItemError::Http { status: 502, message: "bad gateway".into() }
        };
        let store = FakeStore::always_failing(failing_ids.clone(), error);

        let synchronizer = BatchSynchronizer::new(fast_options().with_concurrency(concurrency));
        let result = runtime.block_on(synchronizer.run(items, &store)).unwrap();

        prop_assert_eq!(result.total_processed(), n);
        prop_assert_eq!(result.success_count() + result.failure_count(), n);
        prop_assert!(result.skipped().is_empty());

        let succeeded = ids(result.succeeded().iter());
        let failed = ids(result.failed_items());
        prop_assert!(succeeded.is_disjoint(&failed));
        prop_assert_eq!(failed, failing_ids.into_iter().collect::<HashSet<_>>());
    }
}

#[tokio::test]
async fn test_all_assignments_synchronized() {
    let store = FakeStore::succeeding();
    let synchronizer = BatchSynchronizer::new(fast_options());

    let result = synchronizer.run(create_assignments(10), &store).await.unwrap();

    assert!(result.is_complete_success());
    assert_eq!(result.success_count(), 10);
    assert_eq!(store.total_calls(), 10);
}

// ============================================================================
// Retry Behaviour
// ============================================================================

#[tokio::test]
async fn test_permanent_error_attempted_once() {
    for error in [
        ItemError::BadRequest("bad".into()),
        ItemError::Unauthorized("token".into()),
        ItemError::Forbidden("nope".into()),
        ItemError::NotFound("gone".into()),
    ] {
        let store = FakeStore::always_failing(["S-002"], error.clone());
        let synchronizer = BatchSynchronizer::new(fast_options());

        let result = synchronizer.run(create_assignments(5), &store).await.unwrap();

        assert_eq!(store.calls_for("S-002"), 1, "{error} must not be retried");
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failed()[0].attempts, 1);
        assert_eq!(result.failed()[0].error, error);
    }
}

#[tokio::test]
async fn test_transient_error_exhausts_retry_budget() {
    let store = FakeStore::always_failing(["S-001"], ItemError::Timeout);
    let synchronizer = BatchSynchronizer::new(fast_options().with_max_retries(2));

    let result = synchronizer.run(create_assignments(3), &store).await.unwrap();

    assert_eq!(store.calls_for("S-001"), 3);
    assert_eq!(result.failed()[0].attempts, 3);
    assert_eq!(result.failed()[0].error, ItemError::Timeout);
    assert_eq!(result.success_count(), 2);
}

#[tokio::test]
async fn test_transient_error_recovers_within_budget() {
    let store = FakeStore::failing_with(
        ["S-000", "S-003"],
        ItemError::Network("connection reset".into()),
        2,
    );
    let synchronizer = BatchSynchronizer::new(fast_options());

    let result = synchronizer.run(create_assignments(5), &store).await.unwrap();

    assert!(result.is_complete_success());
    assert_eq!(store.calls_for("S-000"), 3);
    assert_eq!(store.calls_for("S-001"), 1);
}

// ============================================================================
// Retry-Failed Pass
// ============================================================================

#[tokio::test]
async fn test_retry_failed_targets_only_previous_failures() {
    // fails on the first three calls, so the main pass (3 attempts) fails
    // and the single retry succeeds
    let store = FakeStore::failing_with(
        ["S-001", "S-004"],
        ItemError::Http {
            status: 503,
            message: "unavailable".into(),
        },
        3,
    );
    let synchronizer = BatchSynchronizer::new(fast_options());

    let first = synchronizer.run(create_assignments(6), &store).await.unwrap();
    assert_eq!(first.failure_count(), 2);
    assert_eq!(store.total_calls(), 4 + 2 * 3);

    let retried = synchronizer.retry_failed(&first, &store).await.unwrap();

    assert_eq!(retried.failure_count(), 0);
    assert_eq!(
        ids(retried.succeeded().iter()),
        HashSet::from(["S-001".to_string(), "S-004".to_string()])
    );
    assert_eq!(store.calls_for("S-001"), 4);
    assert_eq!(store.calls_for("S-002"), 1);
    assert_eq!(store.total_calls(), 12);
}

#[tokio::test]
async fn test_retry_failed_uses_single_retry() {
    let store = FakeStore::always_failing(["S-000"], ItemError::Timeout);
    let synchronizer = BatchSynchronizer::new(fast_options());

    let first = synchronizer.run(create_assignments(2), &store).await.unwrap();
    store.reset_calls();

    let retried = synchronizer.retry_failed(&first, &store).await.unwrap();

    assert_eq!(store.calls_for("S-000"), 2);
    assert_eq!(retried.failed()[0].attempts, 2);
}

#[tokio::test]
async fn test_retry_failed_without_failures_is_noop() {
    let store = FakeStore::succeeding();
    let synchronizer = BatchSynchronizer::new(fast_options());

    let first = synchronizer.run(create_assignments(3), &store).await.unwrap();
    store.reset_calls();

    let retried = synchronizer.retry_failed(&first, &store).await.unwrap();

    assert_eq!(retried.total_items(), 0);
    assert_eq!(store.total_calls(), 0);
}

// ============================================================================
// Options, Progress and Cancellation
// ============================================================================

#[tokio::test]
async fn test_invalid_options_fail_before_any_call() {
    let store = FakeStore::succeeding();
    let synchronizer = BatchSynchronizer::new(fast_options().with_concurrency(0));

    let err = synchronizer.run(create_assignments(3), &store).await.unwrap_err();

    assert!(matches!(err, SyncError::InvalidArgument { ref name, .. } if name == "concurrency"));
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_progress_reports_each_chunk() {
    let reports = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);

    let options = fast_options()
        .with_concurrency(4)
        .with_item_name(|a: &ScheduleAssignment| a.candidate.display_name().to_string())
        .on_progress(move |p| sink.lock().unwrap().push((p.processed, p.last_item_name.clone())));
    let synchronizer = BatchSynchronizer::new(options);

    synchronizer
        .run(create_assignments(10), &FakeStore::succeeding())
        .await
        .unwrap();

    assert_eq!(
        *reports.lock().unwrap(),
        vec![
            (4, "Shop 3".to_string()),
            (8, "Shop 7".to_string()),
            (10, "Shop 9".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_cancellation_returns_unstarted_items_as_skipped() {
    let cancel = CancellationHandle::new();
    let trigger = cancel.clone();
    let chunks = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&chunks);

    let options = fast_options().with_concurrency(3).on_progress(move |_| {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            trigger.cancel();
        }
    });
    let synchronizer = BatchSynchronizer::new(options).with_cancellation(cancel);
    let store = FakeStore::succeeding();

    let result = synchronizer.run(create_assignments(9), &store).await.unwrap();

    assert!(result.was_cancelled());
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.skipped().len(), 6);
    assert_eq!(result.total_items(), 9);
    assert_eq!(store.total_calls(), 3);
    assert_eq!(chunks.load(Ordering::SeqCst), 1);
}
