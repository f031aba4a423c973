/// Sink receiving one line per finished job.
pub trait JobLogger: Send + Sync {
    fn info(&self, message: &str);
}

/// Default sink forwarding outcome lines to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl JobLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "installjobs::jobs", "{message}");
    }
}
