use std::sync::Arc;
use steer_dns_jobs::ProbeCycleJob;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::CycleHarness;

#[tokio::test]
async fn test_first_cycle_runs_immediately() {
    let h = CycleHarness::new();
    let job = Arc::new(ProbeCycleJob::new(h.cycle.clone(), Duration::from_secs(3600)));

    tokio::spawn(job.start());
    sleep(Duration::from_millis(200)).await;

    assert_eq!(h.lookup.call_count(), 1);
    assert_eq!(h.publisher.publish_count(), 1);
}

#[tokio::test]
async fn test_cycles_repeat_on_interval() {
    let h = CycleHarness::new();
    let job = Arc::new(ProbeCycleJob::new(h.cycle.clone(), Duration::from_millis(100)));

    tokio::spawn(job.start());
    sleep(Duration::from_millis(450)).await;

    assert!(
        h.publisher.publish_count() >= 3,
        "expected at least 3 cycles, got {}",
        h.publisher.publish_count()
    );
}

#[tokio::test]
async fn test_overrunning_cycle_is_not_stacked() {
    let h = CycleHarness::new();
    h.pinger.set_delay(Duration::from_millis(300));
    let job = Arc::new(ProbeCycleJob::new(h.cycle.clone(), Duration::from_millis(50)));

    tokio::spawn(job.start());
    sleep(Duration::from_millis(200)).await;

    // Ticks at 50..200ms were rejected while the first cycle pinged.
    assert_eq!(h.lookup.call_count(), 1);
    assert!(h.cycle.is_running());
}

#[tokio::test]
async fn test_zero_interval_falls_back_to_default() {
    let h = CycleHarness::new();
    let job = ProbeCycleJob::new(h.cycle, Duration::ZERO);

    assert_eq!(job.interval(), Duration::from_secs(3600));
}

#[tokio::test]
async fn test_cancellation_stops_scheduling() {
    let h = CycleHarness::new();
    let token = CancellationToken::new();
    let job = Arc::new(
        ProbeCycleJob::new(h.cycle.clone(), Duration::from_millis(50))
            .with_cancellation(token.clone()),
    );

    let handle = tokio::spawn(job.start());
    sleep(Duration::from_millis(120)).await;
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("job should stop after cancellation")
        .unwrap();

    sleep(Duration::from_millis(50)).await;
    let after_cancel = h.lookup.call_count();
    sleep(Duration::from_millis(200)).await;
    assert_eq!(h.lookup.call_count(), after_cancel);
}
