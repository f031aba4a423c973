use crate::runtime::logger::{JobLogger, TracingLogger};
use std::fmt;
use std::sync::Arc;

/// Configuration, cluster client and logger shared by every job of a dispatch.
///
/// Cloning is cheap; each spawned job task holds its own handle.
pub struct RunContext<C, K> {
    config: Arc<C>,
    client: Arc<K>,
    logger: Arc<dyn JobLogger>,
}

impl<C, K> RunContext<C, K> {
    pub fn new(config: Arc<C>, client: Arc<K>) -> Self {
        Self {
            config,
            client,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn config(&self) -> &Arc<C> {
        &self.config
    }

    pub fn client(&self) -> &Arc<K> {
        &self.client
    }

    pub fn logger(&self) -> &Arc<dyn JobLogger> {
        &self.logger
    }

    pub fn set_config(&mut self, config: Arc<C>) {
        self.config = config;
    }

    pub fn set_client(&mut self, client: Arc<K>) {
        self.client = client;
    }

    pub fn set_logger(&mut self, logger: Arc<dyn JobLogger>) {
        self.logger = logger;
    }
}

impl<C, K> Clone for RunContext<C, K> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            client: self.client.clone(),
            logger: self.logger.clone(),
        }
    }
}

impl<C: fmt::Debug, K> fmt::Debug for RunContext<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
