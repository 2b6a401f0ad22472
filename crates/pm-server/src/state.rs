//! Server state management
//!
//! All collaborators are constructed once at startup and injected into
//! handlers through axum's `State`; there are no process-global singletons.

use std::sync::Arc;

use pm_config::ConfigManager;
use pm_oauth::{ConnectionStore, TokenExchanger};
use pm_providers::{ProviderRegistry, ProxyFetcher};

/// Server state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (per-provider credentials)
    pub config: Arc<ConfigManager>,

    /// Persisted per-provider connection documents
    pub store: Arc<ConnectionStore>,

    /// Supported provider descriptors
    pub registry: Arc<ProviderRegistry>,

    /// Token exchange/refresh client
    pub exchanger: Arc<TokenExchanger>,

    /// Authenticated pass-through client for provider APIs
    pub fetcher: Arc<ProxyFetcher>,
}

impl AppState {
    pub fn new(config: Arc<ConfigManager>, store: Arc<ConnectionStore>) -> Self {
        Self {
            config,
            store,
            registry: Arc::new(ProviderRegistry::new()),
            exchanger: Arc::new(TokenExchanger::new()),
            fetcher: Arc::new(ProxyFetcher::new()),
        }
    }
}
