//! Registry of jobs keyed by component, one mapping per phase.

use crate::jobs::job::{Component, Job, Phase};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type SharedJob<C, K> = Arc<dyn Job<C, K>>;

/// Jobs registered for a single phase, keyed by component. Insertion order within a
/// component is kept but has no bearing on execution order.
pub struct PhaseJobs<C, K> {
    phase: Phase,
    jobs: HashMap<Component, Vec<SharedJob<C, K>>>,
}

impl<C, K> PhaseJobs<C, K> {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            jobs: HashMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Jobs registered for `component`; empty when nothing was registered.
    pub fn get(&self, component: &str) -> &[SharedJob<C, K>] {
        self.jobs
            .get(component)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn push(&mut self, component: Component, job: SharedJob<C, K>) {
        self.jobs.entry(component).or_default().push(job);
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.jobs.keys()
    }

    /// Total number of jobs across all components.
    pub fn len(&self) -> usize {
        self.jobs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl<C, K> fmt::Debug for PhaseJobs<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (component, jobs) in &self.jobs {
            let names: Vec<String> = jobs.iter().map(|job| job.identify().to_string()).collect();
            map.entry(component, &names);
        }
        map.finish()
    }
}

/// Pre and post phase job mappings.
pub struct JobRegistry<C, K> {
    pre: PhaseJobs<C, K>,
    post: PhaseJobs<C, K>,
}

impl<C, K> JobRegistry<C, K> {
    pub fn new() -> Self {
        Self {
            pre: PhaseJobs::new(Phase::Pre),
            post: PhaseJobs::new(Phase::Post),
        }
    }

    /// Appends `job` to the phase and component it declares through [`Job::when`].
    /// Registering the same job twice makes it run twice.
    pub fn register(&mut self, job: SharedJob<C, K>) {
        let (component, phase) = job.when();
        tracing::debug!(
            job = %job.identify(),
            component = %component,
            phase = %phase,
            "registering job"
        );
        self.phase_jobs_mut(phase).push(component, job);
    }

    pub fn lookup(&self, component: &str, phase: Phase) -> &[SharedJob<C, K>] {
        self.phase_jobs(phase).get(component)
    }

    pub fn phase_jobs(&self, phase: Phase) -> &PhaseJobs<C, K> {
        match phase {
            Phase::Pre => &self.pre,
            Phase::Post => &self.post,
        }
    }

    /// Drops every job registered for `phase`. The other phase is left untouched.
    pub fn reset_phase(&mut self, phase: Phase) {
        *self.phase_jobs_mut(phase) = PhaseJobs::new(phase);
    }

    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    fn phase_jobs_mut(&mut self, phase: Phase) -> &mut PhaseJobs<C, K> {
        match phase {
            Phase::Pre => &mut self.pre,
            Phase::Post => &mut self.post,
        }
    }
}

impl<C, K> Default for JobRegistry<C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, K> fmt::Debug for JobRegistry<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRegistry")
            .field("pre", &self.pre)
            .field("post", &self.post)
            .finish()
    }
}
