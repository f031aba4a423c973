use anyhow::Error as AnyError;
use core::future::Future;
use core::pin::Pin;
use std::borrow::Borrow;
use std::fmt;
use tokio_util::sync::CancellationToken;

pub type JobFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Name of an installable unit. Jobs are bucketed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component(String);

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Component {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Stable identifier reported by [`Job::identify`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq<&str> for JobName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// When a job runs relative to the install or upgrade of its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pre,
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pre => f.write_str("pre"),
            Phase::Post => f.write_str("post"),
        }
    }
}

/// Error recorded when a job's `execute` returns a failure or panics.
#[derive(Debug)]
pub struct JobError {
    job: JobName,
    component: Component,
    phase: Phase,
    source: AnyError,
}

impl JobError {
    pub fn new(job: JobName, component: Component, phase: Phase, source: AnyError) -> Self {
        Self {
            job,
            component,
            phase,
            source,
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

    pub fn into_source(self) -> AnyError {
        self.source
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl std::error::Error for JobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Hook run before or after a component is deployed.
///
/// `C` is the installation configuration and `K` the cluster client handle; both are
/// shared read-only across every job of a dispatch. Implementations are expected to
/// return promptly once `cancel` fires. The dispatcher never aborts a job, so a job
/// that ignores cancellation keeps its dispatch waiting.
pub trait Job<C, K>: Send + Sync {
    fn identify(&self) -> JobName;

    /// Component and phase this job is registered under. Must be stable.
    fn when(&self) -> (Component, Phase);

    fn execute<'a>(&'a self, config: &'a C, client: &'a K, cancel: CancellationToken)
        -> JobFuture<'a>;
}
