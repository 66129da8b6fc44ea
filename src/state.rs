use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::graphql::{build_schema, AppSchema};
use crate::store::{memory::MemoryStore, postgres::PgStore, Store};

/// A failed migration aborts start-up.
pub async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    info!("migrations applied");
    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub schema: AppSchema,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = if config.is_in_memory() {
            warn!("using the in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::default()) as Arc<dyn Store>
        } else {
            let db = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await
                .context("connect to database")?;

            run_migrations(&db).await?;
            Arc::new(PgStore::new(db)) as Arc<dyn Store>
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        let schema = build_schema(store, jwt.clone());
        Self {
            config,
            jwt,
            schema,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::with_store(Arc::new(MemoryStore::default()))
    }

    #[cfg(test)]
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let config = Arc::new(AppConfig {
            database_url: crate::config::MEMORY_URL_SCHEME.into(),
            max_connections: 1,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(store, config)
    }
}
