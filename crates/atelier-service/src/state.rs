//! Application state.

use std::sync::Arc;

use atelier_store::RocksStore;

use crate::config::ServiceConfig;
use crate::gateway::MidtransClient;
use crate::generative::GeminiClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger store.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Midtrans client for top-ups (optional).
    pub gateway: Option<Arc<MidtransClient>>,

    /// Gemini client for the generation proxy (optional).
    pub generative: Option<Arc<GeminiClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let gateway = config.midtrans_server_key.as_ref().and_then(|key| {
            match MidtransClient::new(
                key,
                config.midtrans_client_key.clone(),
                config.midtrans_production,
            ) {
                Ok(client) => {
                    let client = match &config.midtrans_snap_url {
                        Some(url) => client.with_snap_url(url),
                        None => client,
                    };
                    tracing::info!(
                        production = config.midtrans_production,
                        "Midtrans integration enabled"
                    );
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Midtrans client");
                    None
                }
            }
        });

        if gateway.is_none() {
            tracing::warn!("Midtrans not configured - top-ups will not be available");
        }

        let generative = config.gemini_api_key.as_ref().and_then(|key| {
            match GeminiClient::new(key, &config.gemini_model) {
                Ok(client) => {
                    let client = match &config.gemini_api_url {
                        Some(url) => client.with_base_url(url),
                        None => client,
                    };
                    tracing::info!(model = %config.gemini_model, "Gemini integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Gemini client");
                    None
                }
            }
        });

        if generative.is_none() {
            tracing::warn!("Gemini not configured - generation will not be available");
        }

        Self {
            store,
            config,
            gateway,
            generative,
        }
    }
}
