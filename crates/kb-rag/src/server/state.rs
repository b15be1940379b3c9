//! Application state for the knowledge-base server

use std::sync::Arc;

use crate::config::KbConfig;
use crate::knowledge_base::KnowledgeBase;
use crate::qa::QaService;

/// Shared application state
///
/// Everything behind it is read-only once the knowledge base is built, so
/// handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: KbConfig,
    /// Question answering over the built knowledge base
    qa: QaService,
}

impl AppState {
    /// Create application state around a ready QA service
    pub fn new(config: KbConfig, qa: QaService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, qa }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &KbConfig {
        &self.inner.config
    }

    /// Get the QA service
    pub fn qa(&self) -> &QaService {
        &self.inner.qa
    }

    /// Get the knowledge base
    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        self.inner.qa.knowledge_base()
    }
}
