//! Application state for the HTTP server.

use std::sync::Arc;

use crate::auth::VerifierChain;
use crate::config::ServiceConfig;
use crate::store::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for snapshot and history operations
    pub repository: Arc<dyn FullRepository>,
    /// Runtime configuration (debounce, limits, auth settings)
    pub config: Arc<ServiceConfig>,
    /// Ordered credential verifier chain
    pub verifiers: Arc<VerifierChain>,
}

impl AppState {
    /// Create the state, assembling the verifier chain from the config.
    pub fn new(repository: Arc<dyn FullRepository>, config: ServiceConfig) -> Self {
        let verifiers = Arc::new(VerifierChain::from_config(&config.auth));
        Self {
            repository,
            config: Arc::new(config),
            verifiers,
        }
    }
}
