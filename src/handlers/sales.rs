use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::sale_draft::{CatalogContext, DebtEntry, SaleDraft};
use crate::config::AppConfig;
use crate::domain::money;
use crate::domain::records::SaleView;
use crate::domain::sale::{
    CatalogService, InclusionType, InsuranceItem, ProductServiceLink, RoundingSettings,
    SaleSummary, ServiceItem,
};
use crate::domain::shift::{PaymentMethod, ShiftTotals};
use crate::domain::vehicle::VehicleDescriptor;
use crate::errors::AppError;

use super::SharedSaleService;

/// Amounts travel as strings. Anything that does not parse counts as zero;
/// parsed values are rounded to kopecks and must fit the stored columns.
fn parse_amount(value: &str) -> Result<BigDecimal, AppError> {
    let parsed = match BigDecimal::from_str(value.trim()) {
        Ok(parsed) => parsed,
        Err(_) => {
            if !value.trim().is_empty() {
                log::debug!("amount '{}' is not a number, using 0", value);
            }
            return Ok(BigDecimal::default());
        }
    };
    money::normalize_amount(&parsed)
        .ok_or_else(|| AppError::BadRequest(format!("amount '{}' is out of range", value.trim())))
}

fn default_quantity() -> u32 {
    1
}

fn default_payment_method() -> String {
    PaymentMethod::Cash.as_str().to_string()
}

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct VehicleRequest {
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: String,
    pub plate: String,
    pub vin_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InsuranceItemRequest {
    /// Kept when the client already tracks the row.
    pub id: Option<Uuid>,
    pub product_id: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub number: String,
    pub insurer_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Decimal as a string, e.g. "1180.00"
    #[serde(default)]
    pub premium: String,
    #[serde(default)]
    pub commission_percent: String,
    pub is_roundable: Option<bool>,
    #[serde(default)]
    pub vehicle: VehicleRequest,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ServiceItemRequest {
    pub id: Option<Uuid>,
    pub service_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub is_auto_linked: bool,
    #[serde(default)]
    pub quantity_override: bool,
    pub is_roundable: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CatalogServiceRequest {
    pub id: String,
    pub name: String,
    pub default_price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductServiceLinkRequest {
    pub product_id: String,
    pub service_id: String,
    /// `auto` or `manual`
    pub inclusion_type: String,
    #[serde(default)]
    pub deletion_prohibited: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DebtRequest {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    pub amount: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoundingRequest {
    pub enabled: bool,
    /// Falls back to the configured step.
    pub step: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaleRequest {
    pub client_id: Option<Uuid>,
    /// `cash`, `card` or `transfer`. Defaults to `cash`.
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    pub insurance_items: Vec<InsuranceItemRequest>,
    #[serde(default)]
    pub service_items: Vec<ServiceItemRequest>,
    #[serde(default)]
    pub catalog: Vec<CatalogServiceRequest>,
    #[serde(default)]
    pub links: Vec<ProductServiceLinkRequest>,
    pub rounding: Option<RoundingRequest>,
    #[serde(default)]
    pub debts: Vec<DebtRequest>,
}

impl SaleRequest {
    fn catalog_context(&self) -> Result<CatalogContext, AppError> {
        let links = self
            .links
            .iter()
            .map(|l| {
                let inclusion_type = InclusionType::parse(&l.inclusion_type).ok_or_else(|| {
                    AppError::BadRequest(format!("unknown inclusion type '{}'", l.inclusion_type))
                })?;
                Ok(ProductServiceLink {
                    product_id: l.product_id.clone(),
                    service_id: l.service_id.clone(),
                    inclusion_type,
                    deletion_prohibited: l.deletion_prohibited,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        let catalog = self
            .catalog
            .iter()
            .map(|s| {
                Ok(CatalogService {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    default_price: parse_amount(&s.default_price)?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(CatalogContext { links, catalog })
    }

    fn payment_method(&self) -> Result<PaymentMethod, AppError> {
        PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            AppError::BadRequest(format!("unknown payment method '{}'", self.payment_method))
        })
    }

    fn into_draft(self, default_step: &BigDecimal) -> Result<SaleDraft, AppError> {
        let rounding = match self.rounding {
            Some(r) => RoundingSettings {
                enabled: r.enabled,
                step: match r.step.as_deref() {
                    Some(step) => parse_amount(step)?,
                    None => default_step.clone(),
                },
            },
            None => RoundingSettings {
                enabled: false,
                step: default_step.clone(),
            },
        };
        let mut draft = SaleDraft::new(self.client_id, rounding);

        draft.insurance_items = self
            .insurance_items
            .into_iter()
            .map(|i| {
                Ok(InsuranceItem {
                    id: i.id.unwrap_or_else(Uuid::new_v4),
                    series: i.series,
                    number: i.number,
                    insurer_id: i.insurer_id,
                    start_date: i.start_date,
                    end_date: i.end_date,
                    commission_percent: parse_amount(&i.commission_percent)?,
                    is_roundable: i.is_roundable,
                    vehicle: VehicleDescriptor {
                        brand: i.vehicle.brand,
                        model: i.vehicle.model,
                        year: i.vehicle.year,
                        color: i.vehicle.color,
                        plate: i.vehicle.plate,
                        vin_code: i.vehicle.vin_code.trim().to_uppercase(),
                    },
                    ..InsuranceItem::new(i.product_id, parse_amount(&i.premium)?)
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        draft.service_items = self
            .service_items
            .into_iter()
            .map(|s| {
                let mut item = ServiceItem::manual(
                    &CatalogService {
                        id: s.service_id,
                        name: s.name,
                        default_price: parse_amount(&s.unit_price)?,
                    },
                    s.quantity,
                );
                if let Some(id) = s.id {
                    item.id = id;
                }
                item.is_auto_linked = s.is_auto_linked;
                item.quantity_override = s.is_auto_linked && s.quantity_override;
                item.is_roundable = s.is_roundable;
                Ok(item)
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        draft.debts = self
            .debts
            .into_iter()
            .map(|d| {
                Ok(DebtEntry {
                    id: d.id.unwrap_or_else(Uuid::new_v4),
                    description: d.description,
                    amount: parse_amount(&d.amount)?,
                    selected: d.selected,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(draft)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShiftReportParams {
    /// Shift start (inclusive), RFC 3339
    pub from: DateTime<Utc>,
    /// Shift end (exclusive), RFC 3339
    pub to: DateTime<Utc>,
    /// Cash in the drawer when the shift opened. Defaults to 0.
    pub opening_balance: Option<String>,
}

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceItemResponse {
    pub id: Uuid,
    pub service_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_amount: String,
    pub is_auto_linked: bool,
    pub deletion_prohibited: bool,
    pub quantity_override: bool,
    pub auto_quantity: Option<u32>,
    /// The overridden quantity differs from what the links expect.
    pub out_of_sync: bool,
}

impl From<&ServiceItem> for ServiceItemResponse {
    fn from(item: &ServiceItem) -> Self {
        Self {
            id: item.id,
            service_id: item.service_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            total_amount: item.total_amount.to_string(),
            is_auto_linked: item.is_auto_linked,
            deletion_prohibited: item.deletion_prohibited,
            quantity_override: item.quantity_override,
            auto_quantity: item.auto_quantity,
            out_of_sync: item.is_out_of_sync(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleSummaryResponse {
    pub subtotal: String,
    pub roundable_subtotal: String,
    pub rounding_amount: String,
    pub debt_total: String,
    pub total: String,
    pub commission_total: String,
}

impl From<&SaleSummary> for SaleSummaryResponse {
    fn from(s: &SaleSummary) -> Self {
        Self {
            subtotal: s.subtotal.to_string(),
            roundable_subtotal: s.roundable_subtotal.to_string(),
            rounding_amount: s.rounding_amount.to_string(),
            debt_total: s.debt_total.to_string(),
            total: s.total.to_string(),
            commission_total: s.commission_total.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalePreviewResponse {
    pub service_items: Vec<ServiceItemResponse>,
    pub summary: SaleSummaryResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSaleResponse {
    pub id: Uuid,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleLineResponse {
    pub id: Uuid,
    pub kind: String,
    pub reference_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: String,
    pub amount: String,
    /// Policy or service attributes captured at checkout.
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleResponse {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub payment_method: String,
    pub rounding_amount: String,
    pub debt_amount: String,
    pub commission_amount: String,
    pub total: String,
    pub created_at: String,
    pub lines: Vec<SaleLineResponse>,
}

impl From<SaleView> for SaleResponse {
    fn from(sale: SaleView) -> Self {
        Self {
            id: sale.id,
            client_id: sale.client_id,
            payment_method: sale.payment_method,
            rounding_amount: sale.rounding_amount.to_string(),
            debt_amount: sale.debt_amount.to_string(),
            commission_amount: sale.commission_amount.to_string(),
            total: sale.total.to_string(),
            created_at: sale.created_at.to_rfc3339(),
            lines: sale
                .lines
                .into_iter()
                .map(|l| SaleLineResponse {
                    id: l.id,
                    kind: l.kind,
                    reference_id: l.reference_id,
                    description: l.description,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    amount: l.amount.to_string(),
                    details: l.details,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentBreakdownResponse {
    pub method: String,
    pub label: String,
    pub count: u32,
    pub amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftReportResponse {
    pub opening_balance: String,
    pub sales_count: u32,
    pub total: String,
    pub expected_cash: String,
    pub breakdown: Vec<PaymentBreakdownResponse>,
}

impl From<ShiftTotals> for ShiftReportResponse {
    fn from(t: ShiftTotals) -> Self {
        Self {
            opening_balance: t.opening_balance.to_string(),
            sales_count: t.sales_count,
            total: t.total.to_string(),
            expected_cash: t.expected_cash.to_string(),
            breakdown: t
                .breakdown
                .into_iter()
                .map(|b| PaymentBreakdownResponse {
                    method: b.method.as_str().to_string(),
                    label: b.method.label_ru().to_string(),
                    count: b.count,
                    amount: b.amount.to_string(),
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /sales/preview
///
/// Reconciles auto-linked services against the submitted catalog and returns
/// the totals. Nothing is stored.
#[utoipa::path(
    post,
    path = "/sales/preview",
    request_body = SaleRequest,
    responses(
        (status = 200, description = "Reconciled services and totals", body = SalePreviewResponse),
        (status = 400, description = "Unknown inclusion type or amount out of range"),
    ),
    tag = "sales"
)]
pub async fn preview_sale(
    service: web::Data<SharedSaleService>,
    config: web::Data<AppConfig>,
    body: web::Json<SaleRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let ctx = body.catalog_context()?;
    let draft = body.into_draft(&config.rounding_step)?;

    let preview = web::block(move || service.preview(draft, &ctx)).await?;

    Ok(HttpResponse::Ok().json(SalePreviewResponse {
        service_items: preview.service_items.iter().map(Into::into).collect(),
        summary: (&preview.summary).into(),
    }))
}

/// POST /sales
///
/// Completes the sale: services are reconciled, totals computed and the sale
/// with all its lines stored in one transaction.
#[utoipa::path(
    post,
    path = "/sales",
    request_body = SaleRequest,
    responses(
        (status = 201, description = "Sale stored", body = CreateSaleResponse),
        (status = 400, description = "Empty sale, unknown payment method or amount out of range"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn create_sale(
    service: web::Data<SharedSaleService>,
    config: web::Data<AppConfig>,
    body: web::Json<SaleRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let ctx = body.catalog_context()?;
    let payment_method = body.payment_method()?;
    let draft = body.into_draft(&config.rounding_step)?;

    let result = web::block(move || service.checkout(draft, payment_method, &ctx)).await??;

    Ok(HttpResponse::Created().json(CreateSaleResponse {
        id: result.id,
        total: result.total.to_string(),
    }))
}

/// GET /sales/{id}
#[utoipa::path(
    get,
    path = "/sales/{id}",
    params(
        ("id" = Uuid, Path, description = "Sale UUID"),
    ),
    responses(
        (status = 200, description = "Sale found", body = SaleResponse),
        (status = 404, description = "Sale not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "sales"
)]
pub async fn get_sale(
    service: web::Data<SharedSaleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let sale_id = path.into_inner();

    let result = web::block(move || service.get_sale(sale_id)).await??;

    match result {
        Some(sale) => Ok(HttpResponse::Ok().json(SaleResponse::from(sale))),
        None => Err(AppError::NotFound),
    }
}

/// GET /shifts/report
///
/// Totals per payment method for sales made in `[from, to)` and the cash
/// expected in the drawer.
#[utoipa::path(
    get,
    path = "/shifts/report",
    params(ShiftReportParams),
    responses(
        (status = 200, description = "Shift totals", body = ShiftReportResponse),
        (status = 400, description = "Start after end"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "shifts"
)]
pub async fn shift_report(
    service: web::Data<SharedSaleService>,
    query: web::Query<ShiftReportParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let opening_balance = match params.opening_balance.as_deref() {
        Some(balance) => parse_amount(balance)?,
        None => BigDecimal::default(),
    };

    let totals = web::block(move || service.shift_report(params.from, params.to, &opening_balance))
        .await??;

    Ok(HttpResponse::Ok().json(ShiftReportResponse::from(totals)))
}
