use crate::dispatch::dispatcher::DispatchReport;
use crate::dispatch::manager::JobManager;
use crate::jobs::job::Component;
use anyhow::{Context, Result};
use std::future::Future;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Pre-job, install and post-job reports for one component.
#[derive(Debug)]
pub struct ComponentRun {
    pub component: Component,
    pub pre: DispatchReport,
    pub post: DispatchReport,
}

/// Drives components through their pre jobs, the caller's install step and their
/// post jobs, sharing one root [`CancellationToken`].
pub struct InstallRunner<C, K> {
    manager: JobManager<C, K>,
    shutdown: CancellationToken,
}

impl<C, K> InstallRunner<C, K>
where
    C: Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    pub fn new(manager: JobManager<C, K>) -> Self {
        Self {
            manager,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns a clone of the root token so callers can cancel the run from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn manager(&self) -> &JobManager<C, K> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut JobManager<C, K> {
        &mut self.manager
    }

    pub fn into_manager(self) -> JobManager<C, K> {
        self.manager
    }

    /// Spawns a task that cancels the root token on Ctrl-C (SIGINT).
    pub fn cancel_on_ctrl_c(&self) -> JoinHandle<()> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = signal::ctrl_c() => {
                    match result {
                        Ok(()) => tracing::info!("Ctrl-C received; cancelling installation"),
                        Err(err) => tracing::warn!(error = %err, "failed to listen for Ctrl-C"),
                    }
                    shutdown.cancel();
                }
                _ = shutdown.cancelled() => {}
            }
        })
    }

    /// Runs the pre jobs of `component`, then `install`, then its post jobs.
    ///
    /// A failing install step skips the post jobs and is returned to the caller. Job
    /// failures are only recorded; they never fail this call.
    pub async fn run_component<F>(
        &self,
        component: impl Into<Component>,
        install: F,
    ) -> Result<ComponentRun>
    where
        F: Future<Output = Result<()>>,
    {
        let component = component.into();
        let pre = self.manager.execute_pre(&self.shutdown, component.clone()).await;

        install
            .await
            .with_context(|| format!("failed to install component {component}"))?;

        let post = self
            .manager
            .execute_post(&self.shutdown, component.clone())
            .await;

        Ok(ComponentRun {
            component,
            pre,
            post,
        })
    }

    /// Runs [`InstallRunner::run_component`] for each component in order. Once the root
    /// token is cancelled, the remaining components are skipped.
    pub async fn run_components<I, F, Fut>(
        &self,
        components: I,
        mut install: F,
    ) -> Result<Vec<ComponentRun>>
    where
        I: IntoIterator,
        I::Item: Into<Component>,
        F: FnMut(Component) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut runs = Vec::new();
        for component in components {
            let component = component.into();
            if self.shutdown.is_cancelled() {
                tracing::info!(
                    component = %component,
                    "installation cancelled; skipping remaining components"
                );
                break;
            }

            let run = self
                .run_component(component.clone(), install(component))
                .await?;
            runs.push(run);
        }

        let duration = self.manager.take_duration();
        let summary = self.manager.finished_summary();
        tracing::info!(
            components = runs.len(),
            jobs_succeeded = summary.succeeded,
            jobs_failed = summary.failed,
            jobs_elapsed_ms = duration.as_millis() as u64,
            "component jobs finished"
        );
        Ok(runs)
    }
}
