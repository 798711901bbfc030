//! Storage and auth wiring shared by every handler.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use gatehouse_auth::{AccountDirectory, Hs256JwtValidator, Hs256TokenIssuer, SessionValidator};
use gatehouse_infra::seed::{self, SeedError};
use gatehouse_infra::{AccountStore, AppConfig, CascadingSoftDelete, CatalogStore, InMemoryStore, PostgresStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("storage unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("bootstrap failed: {0}")]
    Seed(#[from] SeedError),
}

pub struct AppServices {
    pub accounts: Arc<dyn AccountStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub sessions: Arc<SessionValidator>,
    pub tokens: Hs256TokenIssuer,
    pub cascade: CascadingSoftDelete<Arc<dyn CatalogStore>>,
    /// Take the client address from `X-Forwarded-For` instead of the peer.
    pub trust_forwarded_for: bool,
}

impl AppServices {
    /// Wire every service onto one store.
    pub fn new<S>(store: Arc<S>, jwt_secret: &str, cascade_max_attempts: u32) -> Self
    where
        S: AccountStore + CatalogStore + 'static,
    {
        let directory: Arc<dyn AccountDirectory> = store.clone();
        let accounts: Arc<dyn AccountStore> = store.clone();
        let catalog: Arc<dyn CatalogStore> = store;

        let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret));
        let sessions = Arc::new(SessionValidator::new(jwt, directory));

        Self {
            accounts,
            cascade: CascadingSoftDelete::new(catalog.clone(), cascade_max_attempts),
            catalog,
            sessions,
            tokens: Hs256TokenIssuer::new(jwt_secret),
            trust_forwarded_for: false,
        }
    }

    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

/// Pick the store from `config`, prepare it and run the bootstrap seed.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url).await?;
            store.migrate().await?;
            tracing::info!("using postgres store");
            seeded(Arc::new(store), config).await
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            seeded(Arc::new(InMemoryStore::new()), config).await
        }
    }
}

async fn seeded<S>(store: Arc<S>, config: &AppConfig) -> Result<AppServices, StartupError>
where
    S: AccountStore + CatalogStore + 'static,
{
    seed::bootstrap(&*store, &config.developer, config.admin.as_ref(), Utc::now()).await?;
    Ok(AppServices::new(store, &config.jwt_secret, config.cascade_max_attempts)
        .with_trust_forwarded_for(config.trust_forwarded_for))
}
