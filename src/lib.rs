pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{CartService, OrderService};
use crate::auth::{Authenticator, JwtAuthenticator};
use crate::domain::ports::CartStore;
use crate::handlers::ApiDoc;
use crate::infrastructure::DieselCartStore;

pub use config::AppConfig;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs any pending migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Builds an actix-web `Server` bound to the configured host and port.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: &AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let store: Arc<dyn CartStore> = Arc::new(DieselCartStore::new(pool));
    let cart_service = web::Data::new(CartService::new(store.clone()));
    let order_service = web::Data::new(OrderService::new(store));
    let authenticator: Arc<dyn Authenticator> = Arc::new(JwtAuthenticator::new(
        config.jwt_secret.as_bytes(),
        config.token_ttl_hours,
    ));
    let authenticator = web::Data::from(authenticator);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(cart_service.clone())
            .app_data(order_service.clone())
            .app_data(authenticator.clone())
            .wrap(Logger::default())
            .configure(handlers::routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run())
}
