pub mod dispatch;
pub mod jobs;
pub mod runtime;

pub use dispatch::dispatcher::{DispatchRecords, DispatchReport};
pub use dispatch::manager::JobManager;
pub use jobs::job::{Component, Job, JobError, JobFuture, JobName, Phase};
pub use jobs::outcome::{FinishedJobs, FinishedJobsSummary, JobOutcome};
pub use jobs::registry::{JobRegistry, PhaseJobs, SharedJob};
pub use runtime::config::{InstallationConfig, InstallationConfigBuilder, InstallationConfigParams};
pub use runtime::context::RunContext;
pub use runtime::duration::DurationTracker;
pub use runtime::logger::{JobLogger, TracingLogger};
pub use runtime::runner::{ComponentRun, InstallRunner};
pub use runtime::telemetry::{init_tracing, DispatchTelemetry, TelemetrySnapshot};
