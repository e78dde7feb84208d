//! Process configuration loaded via OrthoConfig.
//!
//! Values are layered from defaults, a configuration file, `LIBRARY_*`
//! environment variables and command-line flags.

use std::net::{Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::{DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, PoolConfig};

/// Port used when no bind address is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Startup configuration for the library backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIBRARY")]
pub struct LibrarySettings {
    /// PostgreSQL connection string. Required to start the server.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept warm.
    pub pool_min_idle: Option<u32>,
    /// Apply embedded migrations before serving. Defaults to `true`.
    pub run_migrations: Option<bool>,
}

/// Returned when a required setting is absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required setting: {key}")]
pub struct MissingSetting {
    key: &'static str,
}

impl LibrarySettings {
    /// Configured bind address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Whether to apply embedded migrations at startup.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Database connection string.
    ///
    /// # Errors
    /// Returns [`MissingSetting`] when `LIBRARY_DATABASE_URL` is not set.
    pub fn database_url(&self) -> Result<&str, MissingSetting> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(MissingSetting {
                key: "LIBRARY_DATABASE_URL",
            })
    }

    /// Pool limits derived from these settings.
    ///
    /// # Errors
    /// Returns [`MissingSetting`] when no database URL is configured.
    pub fn pool_config(&self) -> Result<PoolConfig, MissingSetting> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_MAX_SIZE))
            .with_min_idle(Some(self.pool_min_idle.unwrap_or(DEFAULT_MIN_IDLE))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const KEYS: [&str; 5] = [
        "LIBRARY_DATABASE_URL",
        "LIBRARY_BIND_ADDR",
        "LIBRARY_POOL_MAX_SIZE",
        "LIBRARY_POOL_MIN_IDLE",
        "LIBRARY_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> LibrarySettings {
        LibrarySettings::load_from_iter([OsString::from("library-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.run_migrations());
        assert_eq!(
            settings.database_url(),
            Err(MissingSetting {
                key: "LIBRARY_DATABASE_URL"
            })
        );
        assert!(settings.pool_config().is_err());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "LIBRARY_DATABASE_URL",
                Some("postgres://library@localhost/library".to_owned()),
            ),
            ("LIBRARY_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("LIBRARY_POOL_MAX_SIZE", Some("4".to_owned())),
            ("LIBRARY_POOL_MIN_IDLE", Some("1".to_owned())),
            ("LIBRARY_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let pool = settings.pool_config().expect("pool config");

        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert!(!settings.run_migrations());
        assert_eq!(pool.database_url(), "postgres://library@localhost/library");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.min_idle(), Some(1));
    }

    #[rstest]
    fn blank_database_url_counts_as_missing() {
        let mut env = KEYS.map(|key| (key, None::<String>));
        env[0].1 = Some("   ".to_owned());
        let _guard = lock_env(env);

        assert!(load_from_empty_args().database_url().is_err());
    }
}
