// Application state module
// Shared, read-only state handed to every request

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::immich::ImmichClient;

/// Application state
pub struct AppState {
    pub config: Config,
    pub immich: ImmichClient,
    /// Connections currently being served
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            immich: ImmichClient::new(&config.immich),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }
}
