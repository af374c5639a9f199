pub mod documents;
pub mod sales;

use std::sync::Arc;

use actix_web::web;
use utoipa::OpenApi;

use crate::application::document_service::DocumentService;
use crate::application::sale_service::SaleService;
use crate::domain::ports::{DocumentArchive, SaleRepository};

pub type SharedSaleService = SaleService<Arc<dyn SaleRepository>>;
pub type SharedDocumentService = DocumentService<Arc<dyn DocumentArchive>>;

#[derive(OpenApi)]
#[openapi(
    paths(
        sales::preview_sale,
        sales::create_sale,
        sales::get_sale,
        sales::shift_report,
        documents::create_dkp,
        documents::create_pnd,
        documents::create_cash_receipt,
        documents::create_sales_receipt,
        documents::create_europrotocol,
        documents::get_document,
        documents::get_document_html,
    ),
    tags(
        (name = "sales", description = "Sale composition and checkout"),
        (name = "shifts", description = "Cash shift reports"),
        (name = "documents", description = "Printable forms and their archive"),
    )
)]
pub struct ApiDoc;

/// Registers every route. Services and config are expected as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sales")
            .route("", web::post().to(sales::create_sale))
            .route("/preview", web::post().to(sales::preview_sale))
            .route("/{id}", web::get().to(sales::get_sale)),
    )
    .route("/shifts/report", web::get().to(sales::shift_report))
    .service(
        web::scope("/documents")
            .route("/dkp", web::post().to(documents::create_dkp))
            .route("/pnd", web::post().to(documents::create_pnd))
            .route("/cash-receipt", web::post().to(documents::create_cash_receipt))
            .route("/sales-receipt", web::post().to(documents::create_sales_receipt))
            .route("/europrotocol", web::post().to(documents::create_europrotocol))
            .route("/{id}", web::get().to(documents::get_document))
            .route("/{id}/html", web::get().to(documents::get_document_html)),
    );
}
