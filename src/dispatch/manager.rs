use crate::dispatch::dispatcher::{self, DispatchRecords, DispatchReport};
use crate::jobs::job::{Component, Phase};
use crate::jobs::outcome::{FinishedJobsSummary, JobOutcome};
use crate::jobs::registry::{JobRegistry, SharedJob};
use crate::runtime::context::RunContext;
use crate::runtime::logger::JobLogger;
use crate::runtime::telemetry::TelemetrySnapshot;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Owns the job registry, the run context and the records accumulated across
/// dispatches for one installation.
///
/// Registration, reset and context setters take `&mut self` and dispatch takes `&self`,
/// so the registry cannot change while a dispatch is in flight.
pub struct JobManager<C, K> {
    registry: JobRegistry<C, K>,
    context: RunContext<C, K>,
    records: DispatchRecords,
}

impl<C, K> JobManager<C, K>
where
    C: Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    pub fn new(config: Arc<C>, client: Arc<K>) -> Self {
        Self {
            registry: JobRegistry::new(),
            context: RunContext::new(config, client),
            records: DispatchRecords::new(),
        }
    }

    pub fn with_registry(registry: JobRegistry<C, K>, config: Arc<C>, client: Arc<K>) -> Self {
        Self {
            registry,
            context: RunContext::new(config, client),
            records: DispatchRecords::new(),
        }
    }

    pub fn set_config(&mut self, config: Arc<C>) {
        self.context.set_config(config);
    }

    pub fn set_kube_client(&mut self, client: Arc<K>) {
        self.context.set_client(client);
    }

    pub fn set_logger(&mut self, logger: Arc<dyn JobLogger>) {
        self.context.set_logger(logger);
    }

    pub fn context(&self) -> &RunContext<C, K> {
        &self.context
    }

    pub fn register(&mut self, job: SharedJob<C, K>) {
        self.registry.register(job);
    }

    pub fn registry(&self) -> &JobRegistry<C, K> {
        &self.registry
    }

    pub fn reset_phase(&mut self, phase: Phase) {
        self.registry.reset_phase(phase);
    }

    /// Runs the jobs registered to run before `component` is deployed or upgraded.
    pub async fn execute_pre(
        &self,
        cancel: &CancellationToken,
        component: impl Into<Component>,
    ) -> DispatchReport {
        self.execute(cancel, component, Phase::Pre).await
    }

    /// Runs the jobs registered to run after `component` is deployed or upgraded.
    pub async fn execute_post(
        &self,
        cancel: &CancellationToken,
        component: impl Into<Component>,
    ) -> DispatchReport {
        self.execute(cancel, component, Phase::Post).await
    }

    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        component: impl Into<Component>,
        phase: Phase,
    ) -> DispatchReport {
        let component = component.into();
        dispatcher::execute(
            cancel,
            &component,
            self.registry.phase_jobs(phase),
            &self.context,
            &self.records,
        )
        .await
    }

    /// Returns the time spent dispatching since the previous call and resets it.
    pub fn take_duration(&self) -> Duration {
        self.records.duration.take()
    }

    pub fn reset_duration(&self) {
        self.records.duration.reset();
    }

    pub fn finished_jobs(&self) -> Vec<JobOutcome> {
        self.records.finished.snapshot()
    }

    pub fn failed_jobs(&self) -> Vec<JobOutcome> {
        self.records.finished.failed()
    }

    pub fn finished_summary(&self) -> FinishedJobsSummary {
        self.records.finished.summary()
    }

    pub fn reset_finished_jobs(&self) {
        self.records.finished.reset();
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.records.telemetry.snapshot()
    }
}

impl<C, K> fmt::Debug for JobManager<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobManager")
            .field("registry", &self.registry)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}
