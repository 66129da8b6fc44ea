use std::net::SocketAddr;

use anyhow::Context;

/// `DATABASE_URL` prefix that selects the in-memory store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "salesdesk".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "salesdesk-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24),
        };
        Ok(Self {
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(4000),
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.starts_with(MEMORY_URL_SCHEME)
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
