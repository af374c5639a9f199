pub mod application;
pub mod config;
pub mod db;
pub mod documents;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::document_service::DocumentService;
use crate::application::sale_service::SaleService;
use crate::domain::errors::DomainError;
use crate::domain::ports::{DocumentArchive, SaleRepository};
use crate::handlers::{ApiDoc, SharedDocumentService, SharedSaleService};
use crate::infrastructure::{DieselDocumentArchive, DieselSaleRepository};

pub use config::AppConfig;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Internal(format!("migrations failed: {}", e)))?;
    Ok(())
}

/// Build and return an actix-web `Server` bound to the configured address.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let sales: Arc<dyn SaleRepository> = Arc::new(DieselSaleRepository::new(pool.clone()));
    let archive: Arc<dyn DocumentArchive> = Arc::new(DieselDocumentArchive::new(pool));
    let sale_service: web::Data<SharedSaleService> = web::Data::new(SaleService::new(sales));
    let document_service: web::Data<SharedDocumentService> =
        web::Data::new(DocumentService::new(archive));

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(sale_service.clone())
            .app_data(document_service.clone())
            .app_data(config.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind)?
    .run())
}
