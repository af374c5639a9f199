//! In-process tests of the HTTP surface. The diesel repositories are swapped
//! for in-memory implementations of the same ports.

use std::sync::{Arc, Mutex};

use actix_web::{http::StatusCode, test, web, App};
use agency_desk::application::document_service::DocumentService;
use agency_desk::application::sale_service::SaleService;
use agency_desk::domain::errors::DomainError;
use agency_desk::domain::ports::{DocumentArchive, SaleRepository};
use agency_desk::domain::records::{DocumentSnapshot, NewSale, SaleLineView, SaleView};
use agency_desk::domain::shift::ShiftSale;
use agency_desk::handlers::{self, documents::DOCUMENT_ID_HEADER};
use agency_desk::AppConfig;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Default)]
struct MemorySales {
    sales: Mutex<Vec<SaleView>>,
}

impl SaleRepository for MemorySales {
    fn create(&self, sale: NewSale) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        let view = SaleView {
            id,
            client_id: sale.client_id,
            payment_method: sale.payment_method.as_str().to_string(),
            rounding_amount: sale.rounding_amount,
            debt_amount: sale.debt_amount,
            commission_amount: sale.commission_amount,
            total: sale.total,
            created_at: Utc::now(),
            lines: sale
                .lines
                .into_iter()
                .map(|l| SaleLineView {
                    id: Uuid::new_v4(),
                    kind: l.kind.as_str().to_string(),
                    reference_id: l.reference_id,
                    description: l.description,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    amount: l.amount,
                    details: l.details,
                })
                .collect(),
        };
        self.sales.lock().unwrap().push(view);
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        Ok(self.sales.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ShiftSale>, DomainError> {
        let sales = self.sales.lock().unwrap();
        Ok(sales
            .iter()
            .filter(|s| s.created_at >= from && s.created_at < to)
            .map(|s| ShiftSale {
                id: s.id,
                payment_method: agency_desk::domain::shift::PaymentMethod::parse(
                    &s.payment_method,
                )
                .unwrap(),
                total: s.total.clone(),
                created_at: s.created_at,
            })
            .collect())
    }
}

#[derive(Default)]
struct MemoryArchive {
    docs: Mutex<Vec<DocumentSnapshot>>,
}

impl DocumentArchive for MemoryArchive {
    fn save(
        &self,
        kind: &str,
        reference: Option<String>,
        payload: Value,
    ) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        self.docs.lock().unwrap().push(DocumentSnapshot {
            id,
            kind: kind.to_string(),
            reference,
            payload,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<DocumentSnapshot>, DomainError> {
        Ok(self.docs.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }
}

fn config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        "AGENCY_NAME" => Some("ООО «Полис»".to_string()),
        _ => None,
    })
    .unwrap()
}

macro_rules! app {
    () => {{
        let sales: Arc<dyn SaleRepository> = Arc::new(MemorySales::default());
        let archive: Arc<dyn DocumentArchive> = Arc::new(MemoryArchive::default());
        test::init_service(
            App::new()
                .app_data(web::Data::new(SaleService::new(sales)))
                .app_data(web::Data::new(DocumentService::new(archive)))
                .app_data(web::Data::new(config()))
                .configure(handlers::configure),
        )
        .await
    }};
}

fn osago_sale() -> Value {
    json!({
        "payment_method": "cash",
        "insurance_items": [
            { "product_id": "osago", "series": "ХХХ", "number": "0123456789", "premium": "1180" }
        ],
        "catalog": [
            { "id": "stamp", "name": "Stamp Duty", "default_price": "50" }
        ],
        "links": [
            { "product_id": "osago", "service_id": "stamp", "inclusion_type": "auto", "deletion_prohibited": true }
        ],
        "rounding": { "enabled": true }
    })
}

#[actix_web::test]
async fn preview_links_services_and_rounds_up() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/sales/preview")
        .set_json(osago_sale())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["service_items"].as_array().unwrap().len(), 1);
    assert_eq!(body["service_items"][0]["service_id"], "stamp");
    assert_eq!(body["service_items"][0]["quantity"], 1);
    assert_eq!(body["service_items"][0]["is_auto_linked"], true);
    assert_eq!(body["summary"]["subtotal"], "1230");
    assert_eq!(body["summary"]["rounding_amount"], "70");
    assert_eq!(body["summary"]["total"], "1300");
}

#[actix_web::test]
async fn preview_coerces_malformed_amounts_to_zero() {
    let app = app!();
    let mut sale = osago_sale();
    sale["insurance_items"][0]["premium"] = json!("twelve hundred");
    sale["rounding"] = json!({ "enabled": false });

    let req = test::TestRequest::post()
        .uri("/sales/preview")
        .set_json(sale)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["summary"]["total"], "50");
}

#[actix_web::test]
async fn checkout_stores_sale_with_lines() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/sales")
        .set_json(osago_sale())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["total"], "1300");

    let id = created["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/sales/{}", id))
        .to_request();
    let sale: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(sale["payment_method"], "cash");
    let kinds: Vec<&str> = sale["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["insurance", "service", "rounding"]);
    assert_eq!(sale["lines"][0]["details"]["number"], "0123456789");
    assert_eq!(sale["lines"][1]["details"]["is_auto_linked"], true);
    assert_eq!(sale["lines"][1]["details"]["deletion_prohibited"], true);
}

#[actix_web::test]
async fn amounts_too_large_to_store_are_rejected() {
    let app = app!();
    let mut sale = osago_sale();
    sale["insurance_items"][0]["premium"] = json!("1e1000000");

    for uri in ["/sales/preview", "/sales"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(sale.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn checkout_rejects_unknown_payment_method() {
    let app = app!();
    let mut sale = osago_sale();
    sale["payment_method"] = json!("barter");

    let req = test::TestRequest::post()
        .uri("/sales")
        .set_json(sale)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn checkout_rejects_empty_sale() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/sales")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_sale_is_404() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri(&format!("/sales/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn shift_report_sums_cash_into_drawer() {
    let app = app!();
    let from = (Utc::now() - chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%SZ");

    let req = test::TestRequest::post()
        .uri("/sales")
        .set_json(osago_sale())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let to = (Utc::now() + chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%SZ");
    let req = test::TestRequest::get()
        .uri(&format!(
            "/shifts/report?from={}&to={}&opening_balance=500",
            from, to
        ))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(report["sales_count"], 1);
    assert_eq!(report["total"], "1300");
    assert_eq!(report["expected_cash"], "1800");
    assert_eq!(report["breakdown"][0]["method"], "cash");
}

#[actix_web::test]
async fn document_is_rendered_archived_and_rerendered() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/documents/dkp")
        .set_json(json!({
            "contract_number": "ДКП-42",
            "city": "Тверь",
            "seller": { "full_name": "<script>alert(1)</script>" },
            "price": "150000"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let id = resp
        .headers()
        .get(DOCUMENT_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("ДКП-42"));
    assert!(html.contains("Сто пятьдесят тысяч рублей 00 копеек"));
    assert!(!html.contains("<script>alert"));

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}", id))
        .to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snapshot["kind"], "dkp");
    assert_eq!(snapshot["reference"], "ДКП-42");
    assert_eq!(snapshot["payload"]["city"], "Тверь");

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}/html", id))
        .to_request();
    let again = test::call_and_read_body(&app, req).await;
    assert_eq!(String::from_utf8(again.to_vec()).unwrap(), html);
}

#[actix_web::test]
async fn cash_receipt_gets_agency_header_from_config() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/documents/cash-receipt")
        .set_json(json!({
            "receipt_number": "17",
            "generated_at": "19.10.2026 12:00",
            "payment_method": "cash",
            "items": [{ "name": "ОСАГО ХХХ 0123456789", "price": "1180" }],
            "rounding_amount": "20"
        }))
        .to_request();
    let html = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(html.to_vec()).unwrap();

    assert!(html.contains("ООО «Полис»"));
    assert!(html.contains("КАССОВЫЙ ЧЕК № 17"));
    assert!(html.contains("Наличные"));
    assert!(html.contains("print()"));
}

#[actix_web::test]
async fn every_document_kind_renders_from_empty_input() {
    let app = app!();

    for path in [
        "/documents/dkp",
        "/documents/pnd",
        "/documents/cash-receipt",
        "/documents/sales-receipt",
        "/documents/europrotocol",
    ] {
        let req = test::TestRequest::post()
            .uri(path)
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", path);
        assert!(resp.headers().contains_key(DOCUMENT_ID_HEADER), "{}", path);
    }
}

#[actix_web::test]
async fn unknown_document_is_404() {
    let app = app!();

    for uri in [
        format!("/documents/{}", Uuid::new_v4()),
        format!("/documents/{}/html", Uuid::new_v4()),
    ] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}
