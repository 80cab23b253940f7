//! Application state - shared across all handlers.
//!
//! Every collaborator is an injected trait object built exactly once here;
//! handlers and the closer never reach for module-level clients.

use std::sync::Arc;

use bartr_core::TradeCloser;
use bartr_core::ports::{ObjectStore, SearchIndex, TokenVerifier, TradeStore};
use bartr_infra::auth::JwtTokenVerifier;
use bartr_infra::media::{FsObjectStore, InMemoryObjectStore};
use bartr_infra::search::InMemorySearchIndex;
use bartr_infra::store::MemoryTradeStore;

#[cfg(feature = "postgres")]
use bartr_infra::store::{DatabaseConfig, PostgresTradeStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeStore>,
    pub closer: Arc<TradeCloser>,
    pub search: Arc<dyn SearchIndex>,
    pub media: Arc<dyn ObjectStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let store: Arc<dyn TradeStore> = {
            if let Some(url) = &config.database_url {
                let db_config = DatabaseConfig {
                    url: url.clone(),
                    max_connections: config.db_max_connections,
                    min_connections: config.db_min_connections,
                };
                match PostgresTradeStore::connect(&db_config).await {
                    Ok(store) => Arc::new(store),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Arc::new(MemoryTradeStore::new())
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory trade store.");
                Arc::new(MemoryTradeStore::new())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let store: Arc<dyn TradeStore> = {
            tracing::info!("Running without postgres feature - using in-memory trade store");
            Arc::new(MemoryTradeStore::new())
        };

        let media: Arc<dyn ObjectStore> = match &config.media_root {
            Some(root) => Arc::new(FsObjectStore::new(root, config.media_base_url.clone())),
            None => {
                tracing::warn!("MEDIA_ROOT not set. Post images are held in memory.");
                Arc::new(InMemoryObjectStore::new(config.media_base_url.clone()))
            }
        };

        let closer = Arc::new(TradeCloser::new(store.clone()));
        let search: Arc<dyn SearchIndex> = Arc::new(InMemorySearchIndex::new());
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::from_env());

        tracing::info!("Application state initialized");

        Self {
            store,
            closer,
            search,
            media,
            verifier,
        }
    }
}
