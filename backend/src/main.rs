//! Backend entry-point: loads settings, prepares the database and serves the
//! REST API.

mod server;

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use library_backend::inbound::http::health::HealthState;
use library_backend::outbound::persistence::{DbPool, run_pending_migrations};
use library_backend::settings::LibrarySettings;

use server::{PoolProbe, ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

fn load_settings() -> io::Result<LibrarySettings> {
    let args: Vec<OsString> = std::env::args_os().collect();
    LibrarySettings::load_from_iter(args).map_err(|err| io::Error::other(err.to_string()))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let settings = load_settings()?;
    let pool_config = settings.pool_config().map_err(io::Error::other)?;

    if settings.run_migrations() {
        run_pending_migrations(pool_config.database_url())
            .await
            .map_err(io::Error::other)?;
    } else {
        info!("skipping database migrations");
    }

    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
    let health_state =
        web::Data::new(HealthState::new().with_probe(Arc::new(PoolProbe::new(pool.clone()))));

    let server = create_server(
        health_state.clone(),
        ServerConfig::new(settings.bind_addr(), pool),
    )?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
