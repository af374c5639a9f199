use std::fmt::Display;

use actix_web::{http::header::ContentType, web, HttpResponse};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::document_service::RenderedDocument;
use crate::config::AppConfig;
use crate::documents::{
    DkpTemplateData, DocumentPayload, EuroprotocolData, PndTemplateData, ReceiptTemplateData,
};
use crate::domain::records::DocumentSnapshot;
use crate::domain::shift::PaymentMethod;
use crate::errors::AppError;

use super::SharedDocumentService;

pub const DOCUMENT_ID_HEADER: &str = "X-Document-Id";

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentSnapshotResponse {
    pub id: Uuid,
    pub kind: String,
    pub reference: Option<String>,
    /// The template input exactly as it was rendered.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    pub created_at: String,
}

impl From<DocumentSnapshot> for DocumentSnapshotResponse {
    fn from(s: DocumentSnapshot) -> Self {
        Self {
            id: s.id,
            kind: s.kind,
            reference: s.reference,
            payload: s.payload,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

fn html_response(doc: RenderedDocument) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .insert_header((DOCUMENT_ID_HEADER, doc.id.to_string()))
        .body(doc.html)
}

async fn render(
    service: web::Data<SharedDocumentService>,
    payload: DocumentPayload,
) -> Result<HttpResponse, AppError> {
    let doc = web::block(move || service.render_and_archive(payload)).await??;
    Ok(html_response(doc))
}

/// Wall-clock time of the agency's desk, as printed on receipts.
fn print_timestamp<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%d.%m.%Y %H:%M").to_string()
}

/// Fills what the agent usually leaves to the system: the agency header, the
/// print timestamp and a readable payment method.
fn complete_receipt(mut data: ReceiptTemplateData, config: &AppConfig) -> ReceiptTemplateData {
    if data.agency_name.trim().is_empty() {
        data.agency_name = config.agency.name.clone();
    }
    if data.agency_inn.trim().is_empty() {
        data.agency_inn = config.agency.inn.clone();
    }
    if data.agency_address.trim().is_empty() {
        data.agency_address = config.agency.address.clone();
    }
    if data.generated_at.trim().is_empty() {
        data.generated_at = print_timestamp(Local::now());
    }
    if let Some(method) = PaymentMethod::parse(&data.payment_method) {
        data.payment_method = method.label_ru().to_string();
    }
    data
}

/// POST /documents/dkp
#[utoipa::path(
    post,
    path = "/documents/dkp",
    request_body = DkpTemplateData,
    responses(
        (status = 200, description = "Vehicle sale contract", body = String, content_type = "text/html",
            headers(("X-Document-Id" = Uuid, description = "Archived snapshot id"))),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn create_dkp(
    service: web::Data<SharedDocumentService>,
    body: web::Json<DkpTemplateData>,
) -> Result<HttpResponse, AppError> {
    render(service, DocumentPayload::Dkp(body.into_inner())).await
}

/// POST /documents/pnd
#[utoipa::path(
    post,
    path = "/documents/pnd",
    request_body = PndTemplateData,
    responses(
        (status = 200, description = "Personal data consent", body = String, content_type = "text/html",
            headers(("X-Document-Id" = Uuid, description = "Archived snapshot id"))),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn create_pnd(
    service: web::Data<SharedDocumentService>,
    body: web::Json<PndTemplateData>,
) -> Result<HttpResponse, AppError> {
    render(service, DocumentPayload::Pnd(body.into_inner())).await
}

/// POST /documents/cash-receipt
///
/// 80mm thermal receipt. Blank agency fields are taken from configuration.
#[utoipa::path(
    post,
    path = "/documents/cash-receipt",
    request_body = ReceiptTemplateData,
    responses(
        (status = 200, description = "Cash receipt", body = String, content_type = "text/html",
            headers(("X-Document-Id" = Uuid, description = "Archived snapshot id"))),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn create_cash_receipt(
    service: web::Data<SharedDocumentService>,
    config: web::Data<AppConfig>,
    body: web::Json<ReceiptTemplateData>,
) -> Result<HttpResponse, AppError> {
    let data = complete_receipt(body.into_inner(), &config);
    render(service, DocumentPayload::CashReceipt(data)).await
}

/// POST /documents/sales-receipt
#[utoipa::path(
    post,
    path = "/documents/sales-receipt",
    request_body = ReceiptTemplateData,
    responses(
        (status = 200, description = "A4 sales receipt", body = String, content_type = "text/html",
            headers(("X-Document-Id" = Uuid, description = "Archived snapshot id"))),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn create_sales_receipt(
    service: web::Data<SharedDocumentService>,
    config: web::Data<AppConfig>,
    body: web::Json<ReceiptTemplateData>,
) -> Result<HttpResponse, AppError> {
    let data = complete_receipt(body.into_inner(), &config);
    render(service, DocumentPayload::SalesReceipt(data)).await
}

/// POST /documents/europrotocol
#[utoipa::path(
    post,
    path = "/documents/europrotocol",
    request_body = EuroprotocolData,
    responses(
        (status = 200, description = "Accident notice, three sheets", body = String, content_type = "text/html",
            headers(("X-Document-Id" = Uuid, description = "Archived snapshot id"))),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn create_europrotocol(
    service: web::Data<SharedDocumentService>,
    body: web::Json<EuroprotocolData>,
) -> Result<HttpResponse, AppError> {
    render(service, DocumentPayload::Europrotocol(body.into_inner())).await
}

/// GET /documents/{id}
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(
        ("id" = Uuid, Path, description = "Document UUID"),
    ),
    responses(
        (status = 200, description = "Archived snapshot", body = DocumentSnapshotResponse),
        (status = 404, description = "Document not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn get_document(
    service: web::Data<SharedDocumentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let snapshot = web::block(move || service.get_snapshot(id)).await??;

    match snapshot {
        Some(s) => Ok(HttpResponse::Ok().json(DocumentSnapshotResponse::from(s))),
        None => Err(AppError::NotFound),
    }
}

/// GET /documents/{id}/html
///
/// Renders an archived snapshot again.
#[utoipa::path(
    get,
    path = "/documents/{id}/html",
    params(
        ("id" = Uuid, Path, description = "Document UUID"),
    ),
    responses(
        (status = 200, description = "Re-rendered document", body = String, content_type = "text/html"),
        (status = 404, description = "Document not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "documents"
)]
pub async fn get_document_html(
    service: web::Data<SharedDocumentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let doc = web::block(move || service.rerender(id)).await??;

    doc.map(html_response).ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_lookup(|name| match name {
            "DATABASE_URL" => Some("postgres://localhost/agency".to_string()),
            "AGENCY_NAME" => Some("ИП Петров".to_string()),
            "AGENCY_INN" => Some("500100732259".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn receipt_blanks_are_filled_from_config() {
        let data = complete_receipt(
            ReceiptTemplateData {
                payment_method: "card".to_string(),
                ..Default::default()
            },
            &config(),
        );

        assert_eq!(data.agency_name, "ИП Петров");
        assert_eq!(data.agency_inn, "500100732259");
        assert_eq!(data.payment_method, "Банковская карта");
        assert!(!data.generated_at.is_empty());
    }

    #[test]
    fn receipt_values_from_request_win() {
        let data = complete_receipt(
            ReceiptTemplateData {
                agency_name: "ООО «Гарант»".to_string(),
                generated_at: "19.10.2026 10:15".to_string(),
                payment_method: "по договорённости".to_string(),
                ..Default::default()
            },
            &config(),
        );

        assert_eq!(data.agency_name, "ООО «Гарант»");
        assert_eq!(data.generated_at, "19.10.2026 10:15");
        assert_eq!(data.payment_method, "по договорённости");
    }

    #[test]
    fn print_timestamp_uses_the_local_offset() {
        let utc = chrono::Utc.with_ymd_and_hms(2026, 10, 19, 21, 30, 0).unwrap();
        let moscow = chrono::FixedOffset::east_opt(3 * 3600).unwrap();

        assert_eq!(print_timestamp(utc.with_timezone(&moscow)), "20.10.2026 00:30");
    }
}
