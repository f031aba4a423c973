use std::sync::Arc;
use std::time::Duration;

use crate::support::{
    helpers::test_manager,
    sample_jobs::{register_samples, CooperativeJob, SampleJob, Triggered},
};
use installjobs::{FinishedJobsSummary, Phase};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_pre_jobs_of_a_component_are_triggered() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    manager
        .execute_pre(&CancellationToken::new(), "componentOne")
        .await;

    assert_eq!(logger.len(), 2);
    assert!(logger.mentions("sampleOne"));
    assert!(logger.mentions("sampleTwo"));
    assert!(!logger.mentions("sampleThree"));
    assert!(!logger.mentions("sampleFour"));
    assert!(!logger.mentions("sampleFive"));

    let mut triggered = triggered.lock().unwrap().clone();
    triggered.sort();
    assert_eq!(triggered, vec!["sampleOne triggered", "sampleTwo triggered"]);
    assert_ne!(manager.take_duration(), Duration::ZERO);
}

#[tokio::test]
async fn single_pre_job_is_triggered() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    manager
        .execute_pre(&CancellationToken::new(), "componentTwo")
        .await;

    assert_eq!(logger.lines(), vec!["job succeeded: `sampleThree`"]);
    assert_eq!(*triggered.lock().unwrap(), vec!["sampleThree triggered"]);
    assert_ne!(manager.take_duration(), Duration::ZERO);
}

#[tokio::test]
async fn unknown_component_triggers_nothing() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    let report = manager
        .execute_pre(&CancellationToken::new(), "nonExistingComponent")
        .await;

    assert!(report.outcomes.is_empty());
    assert_eq!(logger.len(), 0);
    assert!(triggered.lock().unwrap().is_empty());
    assert!(manager.finished_jobs().is_empty());
    assert_eq!(manager.telemetry().dispatches, 1);
}

#[tokio::test]
async fn pre_dispatch_ignores_post_jobs_of_the_same_component() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    manager
        .execute_pre(&CancellationToken::new(), "componentFour")
        .await;

    assert_eq!(logger.len(), 0);
    assert!(manager.finished_jobs().is_empty());
}

#[tokio::test]
async fn job_error_is_caught_and_reported() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    manager
        .execute_post(&CancellationToken::new(), "componentFour")
        .await;

    assert!(
        logger
            .lines()
            .contains(&"job failed: `sampleFive` with error: JobFiveError".to_string()),
        "unexpected log lines: {:?}",
        logger.lines()
    );

    let finished = manager.finished_jobs();
    assert_eq!(finished.len(), 1);
    assert!(!finished[0].is_success());
    assert_eq!(finished[0].job(), &"sampleFive");
    assert_eq!(
        finished[0].error().map(ToString::to_string).as_deref(),
        Some("JobFiveError")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_job_does_not_hide_sibling_success() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    manager.register(Arc::new(SampleJob::new(
        "sampleFour",
        "componentFour",
        Phase::Post,
        &triggered,
    )));
    manager.register(Arc::new(
        SampleJob::new("sampleFive", "componentFour", Phase::Post, &triggered)
            .failing("JobFiveError"),
    ));

    let report = manager
        .execute_post(&CancellationToken::new(), "componentFour")
        .await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(logger.len(), 2);
    assert!(logger.mentions("job succeeded: `sampleFour`"));
    assert!(logger.mentions("JobFiveError"));
    assert_eq!(
        manager.finished_summary(),
        FinishedJobsSummary {
            succeeded: 1,
            failed: 1
        }
    );
}

#[tokio::test]
async fn duration_is_reset_after_read() {
    let (mut manager, _logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    let cancel = CancellationToken::new();
    manager.execute_pre(&cancel, "componentOne").await;
    manager.execute_post(&cancel, "componentThree").await;

    assert_ne!(manager.take_duration(), Duration::ZERO);
    assert_eq!(manager.take_duration(), Duration::ZERO);
}

#[tokio::test]
async fn finished_jobs_accumulate_across_dispatches() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    let cancel = CancellationToken::new();
    manager.execute_pre(&cancel, "componentOne").await;
    manager.execute_pre(&cancel, "componentTwo").await;
    manager.execute_post(&cancel, "componentThree").await;
    manager.execute_post(&cancel, "componentFour").await;

    assert_eq!(logger.len(), 5);
    assert_eq!(
        manager.finished_summary(),
        FinishedJobsSummary {
            succeeded: 4,
            failed: 1
        }
    );
    let mut names: Vec<String> = manager
        .finished_jobs()
        .iter()
        .map(|outcome| outcome.job().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "sampleFive",
            "sampleFour",
            "sampleOne",
            "sampleThree",
            "sampleTwo"
        ]
    );

    manager.reset_finished_jobs();
    assert!(manager.finished_jobs().is_empty());
}

#[tokio::test]
async fn pre_registry_reset_keeps_post_jobs() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    manager.reset_phase(Phase::Pre);

    assert!(manager.registry().phase_jobs(Phase::Pre).is_empty());
    assert_eq!(manager.registry().phase_jobs(Phase::Post).len(), 2);

    let cancel = CancellationToken::new();
    manager.execute_pre(&cancel, "componentOne").await;
    assert_eq!(logger.len(), 0);
    manager.execute_post(&cancel, "componentThree").await;
    assert_eq!(logger.lines(), vec!["job succeeded: `sampleFour`"]);
}

#[tokio::test]
async fn post_registry_reset_keeps_pre_jobs() {
    let (mut manager, _logger) = test_manager();
    let triggered = Triggered::default();
    register_samples(&mut manager, &triggered);

    manager.reset_phase(Phase::Post);

    assert!(manager.registry().phase_jobs(Phase::Post).is_empty());
    assert_eq!(manager.registry().phase_jobs(Phase::Pre).len(), 3);
    assert_eq!(
        manager
            .registry()
            .lookup("componentOne", Phase::Pre)
            .len(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_releases_cooperative_jobs() {
    let (mut manager, logger) = test_manager();
    let triggered = Triggered::default();
    manager.register(Arc::new(CooperativeJob {
        name: "waitForRollout",
        component: "componentOne",
        phase: Phase::Post,
    }));
    manager.register(Arc::new(SampleJob::new(
        "sampleOne",
        "componentOne",
        Phase::Post,
        &triggered,
    )));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let report = timeout(
        Duration::from_secs(5),
        manager.execute_post(&cancel, "componentOne"),
    )
    .await
    .expect("dispatch should return once the cooperative job observes cancellation");

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.succeeded(), 1);
    assert!(logger.mentions("job failed: `waitForRollout` with error: waitForRollout interrupted"));
    assert!(manager.take_duration() >= Duration::from_millis(40));
}
