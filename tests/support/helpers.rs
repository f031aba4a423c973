use std::sync::{Arc, Mutex};

use installjobs::{InstallationConfig, JobLogger, JobManager};
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING_SUBSCRIBER);
}

/// Stand-in for a cluster client; jobs only need a handle to pass around.
#[derive(Debug, Default)]
pub struct FakeKubeClient {
    pub namespace: String,
}

/// Collects every line the job manager emits.
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap().len()
    }

    pub fn mentions(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|line| line.contains(needle))
    }
}

impl JobLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_owned());
    }
}

pub type TestManager = JobManager<InstallationConfig, FakeKubeClient>;

pub fn installation_config() -> InstallationConfig {
    InstallationConfig::builder()
        .workers_count(1)
        .version("2.4.0")
        .build()
        .expect("test installation config must be valid")
}

/// Manager wired with a single-worker config, a fake client and a recording logger.
pub fn test_manager() -> (TestManager, Arc<RecordingLogger>) {
    init_tracing();
    let logger = Arc::new(RecordingLogger::default());
    let mut manager = JobManager::new(
        Arc::new(installation_config()),
        Arc::new(FakeKubeClient {
            namespace: "kyma-installer".to_owned(),
        }),
    );
    manager.set_logger(logger.clone());
    (manager, logger)
}
