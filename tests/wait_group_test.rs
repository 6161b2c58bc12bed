//! Wait group integration test
//!
//! Runs contextual errors through a wait group and inspects the aggregate.

use errkit::{
    BoxError, Canceled, ContextualError, Field, FieldFormat, SharedError, TaskResult,
    TracingObserver, WaitGroup, find, find_field_in_chain, is, with_name, with_observer,
    with_stop_on_error, with_task_limit,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("errkit=debug")
        .with_test_writer()
        .try_init();
}

fn job_error(id: i64) -> BoxError {
    ContextualError::new(format!("job {} failed", id))
        .with_field(Field::int64("job_id", id))
        .into()
}

#[tokio::test]
async fn test_failures_are_collected_as_a_set() {
    init_tracing();
    let wg = WaitGroup::new([with_name("jobs"), with_observer(Arc::new(TracingObserver))]);

    for id in 0..10i64 {
        wg.spawn(async move {
            tokio::time::sleep(Duration::from_millis((10 - id) as u64)).await;
            if id % 3 == 0 { Err(job_error(id)) } else { Ok(()) }
        })
        .await;
    }

    let errors = wg.wait().await.unwrap_err();
    let failed: HashSet<i64> = errors
        .errors()
        .iter()
        .filter_map(|err| find_field_in_chain(err.as_ref(), "job_id").value().as_i64())
        .collect();
    assert_eq!(failed, HashSet::from([0, 3, 6, 9]));
}

#[tokio::test]
async fn test_all_success_is_ok() {
    let wg = WaitGroup::default();
    for _ in 0..32 {
        wg.spawn(async { TaskResult::Ok(()) }).await;
    }
    assert!(wg.wait().await.is_ok());
    assert_eq!(wg.error_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_task_limit_bounds_concurrency() {
    let wg = WaitGroup::new([with_task_limit(2)]);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    for _ in 0..12 {
        let (running, peak) = (running.clone(), peak.clone());
        wg.spawn(async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
    }

    assert!(wg.wait().await.is_ok());
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_stop_on_error_with_contextual_cause() {
    init_tracing();
    let wg = WaitGroup::new([with_stop_on_error()]);

    wg.spawn(async { Err(job_error(1)) }).await;
    for _ in 0..3 {
        wg.spawn_with_context(|ctx| async move {
            tokio::select! {
                _ = ctx.cancelled() => Err(Box::new(Canceled) as BoxError),
                _ = tokio::time::sleep(Duration::from_secs(10)) => Ok(()),
            }
        })
        .await;
    }

    let errors = wg.wait().await.unwrap_err();
    assert_eq!(errors.safe_len(), 4);
    assert!(is(&errors, &Canceled));

    let cause: SharedError = wg.context().cause().unwrap();
    let contextual = find::<ContextualError>(cause.as_ref()).unwrap();
    assert_eq!(
        contextual.render(FieldFormat::Struct),
        "job 1 failed: [{Key: job_id, Value: 1}]"
    );
}
