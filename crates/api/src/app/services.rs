use std::sync::Arc;

use chrono::Duration;

use albumhub_auth::{Hs256JwtValidator, Hs256TokenIssuer, JwtValidator};
use albumhub_infra::{AccountStore, AppConfig, CatalogStore, InMemoryStore, PostgresStore};

/// Everything a handler needs, shared behind one `Arc`.
pub struct AppServices {
    pub catalog: Arc<dyn CatalogStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub tokens: Hs256TokenIssuer,
    pub jwt: Arc<dyn JwtValidator>,
}

impl AppServices {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        accounts: Arc<dyn AccountStore>,
        jwt_secret: &str,
        token_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            accounts,
            tokens: Hs256TokenIssuer::new(jwt_secret, token_ttl),
            jwt: Arc::new(Hs256JwtValidator::new(jwt_secret)),
        }
    }

    /// Services over a fresh in-memory store.
    pub fn in_memory(jwt_secret: &str, token_ttl: Duration) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store, jwt_secret, token_ttl)
    }
}

/// Select the store backend from configuration.
///
/// With `DATABASE_URL` set, connects to Postgres and applies the bootstrap
/// schema; otherwise falls back to the in-memory store.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(PostgresStore::connect(url, config.database_max_connections).await?);
            store.bootstrap().await?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "using postgres store"
            );
            Ok(AppServices::new(
                store.clone(),
                store,
                &config.jwt_secret,
                config.token_ttl,
            ))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Ok(AppServices::in_memory(&config.jwt_secret, config.token_ttl))
        }
    }
}
