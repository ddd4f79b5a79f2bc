use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Dispatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the provider list and the round-robin cursor. One per process.
    pub dispatcher: Arc<Dispatcher>,
    pub config: Config,
}
