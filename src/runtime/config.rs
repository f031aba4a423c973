use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CANCEL_TIMEOUT_SECS: u64 = 15 * 60;
const DEFAULT_QUIT_TIMEOUT_SECS: u64 = 20 * 60;
const DEFAULT_HELM_TIMEOUT_SECS: u64 = 6 * 60;
const DEFAULT_BACKOFF_INITIAL_INTERVAL_SECS: u64 = 3;
const DEFAULT_BACKOFF_MAX_ELAPSED_TIME_SECS: u64 = 5 * 60;

/// Installation settings handed to every job of a run.
///
/// Instances are built through [`InstallationConfig::builder`] or
/// [`InstallationConfig::new`], both of which validate before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationConfig {
    workers_count: usize,
    cancel_timeout: Duration,
    quit_timeout: Duration,
    helm_timeout: Duration,
    backoff_initial_interval: Duration,
    backoff_max_elapsed_time: Duration,
    profile: Option<String>,
    version: String,
    kubeconfig_path: Option<PathBuf>,
}

pub struct InstallationConfigParams {
    pub workers_count: usize,
    pub cancel_timeout: Duration,
    pub quit_timeout: Duration,
    pub helm_timeout: Duration,
    pub backoff_initial_interval: Duration,
    pub backoff_max_elapsed_time: Duration,
    pub profile: Option<String>,
    pub version: String,
    pub kubeconfig_path: Option<PathBuf>,
}

impl InstallationConfig {
    pub fn builder() -> InstallationConfigBuilder {
        InstallationConfigBuilder::default()
    }

    /// Constructs and validates a configuration from concrete values.
    pub fn new(params: InstallationConfigParams) -> Result<Self> {
        let InstallationConfigParams {
            workers_count,
            cancel_timeout,
            quit_timeout,
            helm_timeout,
            backoff_initial_interval,
            backoff_max_elapsed_time,
            profile,
            version,
            kubeconfig_path,
        } = params;

        let config = Self {
            workers_count,
            cancel_timeout,
            quit_timeout,
            helm_timeout,
            backoff_initial_interval,
            backoff_max_elapsed_time,
            profile: profile
                .map(|profile| profile.trim().to_owned())
                .filter(|profile| !profile.is_empty()),
            version: version.trim().to_owned(),
            kubeconfig_path,
        };

        config.validate()?;
        Ok(config)
    }

    /// Number of components deployed in parallel by the installer.
    pub fn workers_count(&self) -> usize {
        self.workers_count
    }

    /// Time after which a cancelled installation stops waiting for running work.
    pub fn cancel_timeout(&self) -> Duration {
        self.cancel_timeout
    }

    /// Time after which a cancelled installation is abandoned outright.
    pub fn quit_timeout(&self) -> Duration {
        self.quit_timeout
    }

    pub fn helm_timeout(&self) -> Duration {
        self.helm_timeout
    }

    pub fn backoff_initial_interval(&self) -> Duration {
        self.backoff_initial_interval
    }

    pub fn backoff_max_elapsed_time(&self) -> Duration {
        self.backoff_max_elapsed_time
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn kubeconfig_path(&self) -> Option<&Path> {
        self.kubeconfig_path.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers_count == 0 {
            bail!("workers_count must be greater than 0");
        }

        if self.cancel_timeout.is_zero() {
            bail!("cancel_timeout must be greater than 0");
        }

        if self.quit_timeout.is_zero() {
            bail!("quit_timeout must be greater than 0");
        }

        if self.quit_timeout < self.cancel_timeout {
            bail!(
                "quit_timeout ({:?}) must not be shorter than cancel_timeout ({:?})",
                self.quit_timeout,
                self.cancel_timeout,
            );
        }

        if self.helm_timeout.is_zero() {
            bail!("helm_timeout must be greater than 0");
        }

        if self.backoff_initial_interval.is_zero() {
            bail!("backoff_initial_interval must be greater than 0");
        }

        if self.backoff_max_elapsed_time < self.backoff_initial_interval {
            bail!("backoff_max_elapsed_time must not be shorter than backoff_initial_interval");
        }

        if self.version.is_empty() {
            bail!("version cannot be empty");
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InstallationConfigBuilder {
    workers_count: Option<usize>,
    cancel_timeout: Option<Duration>,
    quit_timeout: Option<Duration>,
    helm_timeout: Option<Duration>,
    backoff_initial_interval: Option<Duration>,
    backoff_max_elapsed_time: Option<Duration>,
    profile: Option<String>,
    version: Option<String>,
    kubeconfig_path: Option<PathBuf>,
}

impl InstallationConfigBuilder {
    pub fn workers_count(mut self, count: usize) -> Self {
        self.workers_count = Some(count);
        self
    }

    pub fn cancel_timeout(mut self, timeout: Duration) -> Self {
        self.cancel_timeout = Some(timeout);
        self
    }

    pub fn quit_timeout(mut self, timeout: Duration) -> Self {
        self.quit_timeout = Some(timeout);
        self
    }

    pub fn helm_timeout(mut self, timeout: Duration) -> Self {
        self.helm_timeout = Some(timeout);
        self
    }

    pub fn backoff_initial_interval(mut self, interval: Duration) -> Self {
        self.backoff_initial_interval = Some(interval);
        self
    }

    pub fn backoff_max_elapsed_time(mut self, elapsed: Duration) -> Self {
        self.backoff_max_elapsed_time = Some(elapsed);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn kubeconfig_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<InstallationConfig> {
        let params = InstallationConfigParams {
            workers_count: self.workers_count.context("workers_count is required")?,
            cancel_timeout: self
                .cancel_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_CANCEL_TIMEOUT_SECS)),
            quit_timeout: self
                .quit_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_QUIT_TIMEOUT_SECS)),
            helm_timeout: self
                .helm_timeout
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_HELM_TIMEOUT_SECS)),
            backoff_initial_interval: self
                .backoff_initial_interval
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_BACKOFF_INITIAL_INTERVAL_SECS)),
            backoff_max_elapsed_time: self
                .backoff_max_elapsed_time
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_BACKOFF_MAX_ELAPSED_TIME_SECS)),
            profile: self.profile,
            version: self.version.context("version is required")?,
            kubeconfig_path: self.kubeconfig_path,
        };

        InstallationConfig::new(params)
    }
}
