//! Service wiring: directory selection, hashing/token setup, shared services.

use std::sync::Arc;

use salon_auth::{
    AccountAdminService, AccountDirectory, AuthSessionService, Hs256TokenService, PasswordError,
    PasswordHasher, RequestGuardChain, TokenService,
};
use salon_infra::{AppConfig, InMemoryAccountDirectory, PostgresAccountDirectory};

/// Shared application services (constructed once at startup).
pub struct AppServices {
    pub directory: Arc<dyn AccountDirectory>,
    pub hasher: PasswordHasher,
    pub sessions: AuthSessionService,
    pub admin: AccountAdminService,
    pub guard: Arc<RequestGuardChain>,
}

impl AppServices {
    pub fn new(config: &AppConfig, directory: Arc<dyn AccountDirectory>) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::with_params(
            config.password.memory_cost,
            config.password.time_cost,
            config.password.parallelism,
        )?;

        let tokens: Arc<dyn TokenService> = Arc::new(Hs256TokenService::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl(),
        ));

        Ok(Self {
            sessions: AuthSessionService::new(directory.clone(), hasher.clone(), tokens.clone())?,
            admin: AccountAdminService::new(directory.clone(), hasher.clone()),
            guard: Arc::new(RequestGuardChain::new(tokens, directory.clone())),
            directory,
            hasher,
        })
    }
}

/// Pick the account directory: Postgres when a URL is configured, otherwise
/// an in-memory directory that forgets everything on restart.
pub async fn build_directory(config: &AppConfig) -> anyhow::Result<Arc<dyn AccountDirectory>> {
    match &config.database.url {
        Some(url) => {
            let directory = PostgresAccountDirectory::connect(url).await?;
            directory.migrate().await?;
            tracing::info!("using postgres account directory");
            Ok(Arc::new(directory))
        }
        None => {
            tracing::warn!("database.url not set; accounts are kept in memory only");
            Ok(Arc::new(InMemoryAccountDirectory::new()))
        }
    }
}
