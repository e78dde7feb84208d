//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use async_trait::async_trait;
use tracing::info;

use library_backend::Trace;
#[cfg(debug_assertions)]
use library_backend::doc::ApiDoc;
use library_backend::inbound::http::api_scope;
use library_backend::inbound::http::health::{HealthState, ReadinessProbe, live, ready};
use library_backend::inbound::http::state::HttpState;
use library_backend::outbound::persistence::{
    DbPool, DieselBookRepository, DieselLoanHistoryRepository, DieselUserRepository,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Readiness check that round-trips a statement through the pool.
pub struct PoolProbe {
    pool: DbPool,
}

impl PoolProbe {
    /// Probe the database behind `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadinessProbe for PoolProbe {
    async fn check(&self) -> Result<(), String> {
        self.pool.ping().await.map_err(|err| err.to_string())
    }
}

/// Wire the domain services over the Diesel repositories.
fn build_http_state(pool: &DbPool) -> HttpState {
    HttpState::from_repositories(
        Arc::new(DieselBookRepository::new(pool.clone())),
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselLoanHistoryRepository::new(pool.clone())),
    )
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config.db_pool));
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "HTTP server listening");
    health_state.mark_ready();
    Ok(server)
}
