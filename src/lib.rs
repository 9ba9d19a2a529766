pub mod config;
pub mod dispatcher;
pub mod parser;
pub mod provider;
pub mod rest;

use std::sync::Arc;
use std::time::Instant;

use config::Config;
use provider::TextModel;

/// Shared application state passed to every route handler.
pub struct AppContext {
    pub config: Arc<Config>,
    /// Text-generation backend.  Trait object so tests can drive the full
    /// stack with a scripted model.
    pub model: Arc<dyn TextModel>,
    pub started_at: Instant,
}

impl AppContext {
    pub fn new(config: Config, model: Arc<dyn TextModel>) -> Self {
        Self {
            config: Arc::new(config),
            model,
            started_at: Instant::now(),
        }
    }
}
