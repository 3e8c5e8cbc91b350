//! Connection configuration from the environment.
//!
//! All settings come from `DB_*` environment variables with documented
//! defaults, matching the `.env` file format the tool has always used.

use crate::error::Error;
use deadpool_postgres::{PoolConfig, Runtime, SslMode};
use tokio_postgres::NoTls;

/// Maximum number of connections held by the pool.
///
/// One interactive session never needs more than a couple, but the pool
/// stays bounded so embedding callers cannot run the server out of slots.
const POOL_MAX_SIZE: usize = 4;

/// Connection settings for the orgchart database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub port: u16,
    /// Require encrypted transport. The connector itself is `NoTls`, so a
    /// server that only accepts TLS fails at connect time instead of
    /// silently downgrading.
    pub ssl: bool,
}

impl DbConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("DB_PORT is not a valid port: {raw:?}")))?,
            None => 5432,
        };

        let ssl = match lookup("DB_SSL").as_deref() {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => {
                return Err(Error::Config(format!(
                    "DB_SSL must be \"true\" or \"false\", got {other:?}"
                )));
            }
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            user: lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            dbname: lookup("DB_NAME").unwrap_or_else(|| "orgchart".to_string()),
            port,
            ssl,
        })
    }

    /// Build a bounded connection pool from these settings.
    ///
    /// The pool is the caller's to own and drop; nothing here is global.
    pub fn create_pool(&self) -> Result<deadpool_postgres::Pool, Error> {
        Ok(self
            .pool_config()
            .create_pool(Some(Runtime::Tokio1), NoTls)?)
    }

    fn pool_config(&self) -> deadpool_postgres::Config {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some(self.host.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.dbname = Some(self.dbname.clone());
        cfg.port = Some(self.port);
        cfg.ssl_mode = Some(if self.ssl {
            SslMode::Require
        } else {
            SslMode::Disable
        });
        cfg.pool = Some(PoolConfig::new(POOL_MAX_SIZE));
        cfg
    }
}
