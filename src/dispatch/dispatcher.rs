//! Fan-out/fan-in execution of every job registered for one component and phase.
//!
//! One tokio task is spawned per job. Each task publishes exactly one outcome into a
//! channel sized for the whole bucket, so no producer ever waits on the consumer. The
//! coordinating future joins every task before draining the channel, then logs and
//! records the outcomes and finally accrues the elapsed wall-clock time.

use crate::jobs::job::{Component, Job, JobError, Phase};
use crate::jobs::outcome::{FinishedJobs, JobOutcome};
use crate::jobs::registry::{PhaseJobs, SharedJob};
use crate::runtime::context::RunContext;
use crate::runtime::duration::DurationTracker;
use crate::runtime::telemetry::DispatchTelemetry;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// State written by the dispatcher after every invocation.
#[derive(Debug, Default)]
pub struct DispatchRecords {
    pub(crate) finished: FinishedJobs,
    pub(crate) duration: DurationTracker,
    pub(crate) telemetry: DispatchTelemetry,
}

impl DispatchRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finished(&self) -> &FinishedJobs {
        &self.finished
    }

    pub fn duration(&self) -> &DurationTracker {
        &self.duration
    }

    pub fn telemetry(&self) -> &DispatchTelemetry {
        &self.telemetry
    }
}

/// Outcomes of a single dispatch, in the order they arrived.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub component: Component,
    pub phase: Phase,
    pub outcomes: Vec<JobOutcome>,
    pub elapsed: Duration,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

enum TaskStatus {
    Finished(JobOutcome),
    Panicked(JobOutcome),
}

/// Runs every job registered under `component` in `jobs` concurrently and waits for all
/// of them. Never fails: job errors and panics become failed outcomes.
///
/// `cancel` is handed to each job untouched. Jobs are never aborted, so the call only
/// returns once every job has returned on its own.
#[tracing::instrument(
    name = "dispatch",
    skip_all,
    fields(component = %component, phase = %jobs.phase())
)]
pub async fn execute<C, K>(
    cancel: &CancellationToken,
    component: &Component,
    jobs: &PhaseJobs<C, K>,
    context: &RunContext<C, K>,
    records: &DispatchRecords,
) -> DispatchReport
where
    C: Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    let phase = jobs.phase();
    let bucket = jobs.get(component.as_str());
    let start = Instant::now();
    records.telemetry.record_dispatch(bucket.len());

    let mut outcomes = Vec::with_capacity(bucket.len());
    if !bucket.is_empty() {
        tracing::debug!(jobs = bucket.len(), "launching jobs");
        let (status_tx, mut status_rx) = mpsc::channel(bucket.len());

        let handles: Vec<_> = bucket
            .iter()
            .map(|job| {
                let job = job.clone();
                let context = context.clone();
                let cancel = cancel.clone();
                let component = component.clone();
                let status_tx = status_tx.clone();
                tokio::spawn(async move {
                    let status = run_job(job, &context, cancel, component, phase).await;
                    if status_tx.send(status).await.is_err() {
                        tracing::warn!("job status receiver dropped before outcome was published");
                    }
                })
            })
            .collect();
        drop(status_tx);

        for result in join_all(handles).await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "job task did not run to completion");
            }
        }

        while let Some(status) = status_rx.recv().await {
            let outcome = match status {
                TaskStatus::Finished(outcome) => {
                    if outcome.is_success() {
                        records.telemetry.record_success();
                    } else {
                        records.telemetry.record_failure();
                    }
                    outcome
                }
                TaskStatus::Panicked(outcome) => {
                    records.telemetry.record_panic();
                    outcome
                }
            };

            tracing::debug!(
                job = %outcome.job(),
                success = outcome.is_success(),
                elapsed_ms = outcome.elapsed().as_millis() as u64,
                "job finished"
            );
            context.logger().info(&outcome.log_line());
            records.finished.push(outcome.clone());
            outcomes.push(outcome);
        }
    }

    let elapsed = start.elapsed();
    records.duration.add(elapsed);
    tracing::debug!(
        jobs = outcomes.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "dispatch finished"
    );

    DispatchReport {
        component: component.clone(),
        phase,
        outcomes,
        elapsed,
    }
}

async fn run_job<C, K>(
    job: SharedJob<C, K>,
    context: &RunContext<C, K>,
    cancel: CancellationToken,
    component: Component,
    phase: Phase,
) -> TaskStatus
where
    C: Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    let name = job.identify();
    let started = Instant::now();
    let result = AssertUnwindSafe(invoke(job.as_ref(), context, cancel))
        .catch_unwind()
        .await;
    let elapsed = started.elapsed();

    match result {
        Ok(Ok(())) => TaskStatus::Finished(JobOutcome::succeeded(name, component, phase, elapsed)),
        Ok(Err(err)) => TaskStatus::Finished(JobOutcome::failed(
            JobError::new(name, component, phase, err),
            elapsed,
        )),
        Err(panic_payload) => {
            let panic_msg = panic_message(panic_payload.as_ref());
            tracing::error!(job = %name, panic = %panic_msg, "job panicked");
            let err = anyhow::anyhow!("job panicked: {panic_msg}");
            TaskStatus::Panicked(JobOutcome::failed(
                JobError::new(name, component, phase, err),
                elapsed,
            ))
        }
    }
}

async fn invoke<C, K>(
    job: &dyn Job<C, K>,
    context: &RunContext<C, K>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    job.execute(context.config(), context.client(), cancel).await
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
