use std::sync::Arc;

use formsg_core::config::SubmissionConfig;
use formsg_core::registry::FieldTypeRegistry;
use formsg_core::validation::ValidationContext;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FieldTypeRegistry>,
    pub config: Arc<SubmissionConfig>,
}

impl AppState {
    pub fn new(registry: FieldTypeRegistry, config: SubmissionConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    /// Validation context for one request. "Today" is read once per call.
    pub fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.registry, &self.config)
    }
}
