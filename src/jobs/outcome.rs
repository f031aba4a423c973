use crate::jobs::job::{Component, JobError, JobName, Phase};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Result of a single job execution within one dispatch.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    job: JobName,
    component: Component,
    phase: Phase,
    elapsed: Duration,
    error: Option<Arc<JobError>>,
}

impl JobOutcome {
    pub fn succeeded(job: JobName, component: Component, phase: Phase, elapsed: Duration) -> Self {
        Self {
            job,
            component,
            phase,
            elapsed,
            error: None,
        }
    }

    pub fn failed(error: JobError, elapsed: Duration) -> Self {
        Self {
            job: error.job().clone(),
            component: error.component().clone(),
            phase: error.phase(),
            elapsed,
            error: Some(Arc::new(error)),
        }
    }

    pub fn job(&self) -> &JobName {
        &self.job
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Wall-clock time spent inside the job's `execute`.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&JobError> {
        self.error.as_deref()
    }

    /// Line handed to the job logger for this outcome.
    pub fn log_line(&self) -> String {
        match &self.error {
            None => format!("job succeeded: `{}`", self.job),
            Some(err) => format!("job failed: `{}` with error: {err:#}", self.job),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FinishedJobsSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl FinishedJobsSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Append-only log of outcomes accumulated across dispatches.
#[derive(Debug, Default)]
pub struct FinishedJobs {
    outcomes: Mutex<Vec<JobOutcome>>,
}

impl FinishedJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: JobOutcome) {
        self.lock().push(outcome);
    }

    pub fn snapshot(&self) -> Vec<JobOutcome> {
        self.lock().clone()
    }

    pub fn failed(&self) -> Vec<JobOutcome> {
        self.lock()
            .iter()
            .filter(|outcome| !outcome.is_success())
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> FinishedJobsSummary {
        self.lock()
            .iter()
            .fold(FinishedJobsSummary::default(), |mut summary, outcome| {
                if outcome.is_success() {
                    summary.succeeded += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JobOutcome>> {
        // Outcomes are only appended; a poisoned guard still holds a consistent list.
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
