use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::errors::DomainError;
use super::money;
use super::sale::{InsuranceItem, SaleSummary, ServiceItem};
use super::shift::PaymentMethod;
use super::vehicle::VehicleDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleLineKind {
    Insurance,
    Service,
    Rounding,
    Debt,
}

impl SaleLineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleLineKind::Insurance => "insurance",
            SaleLineKind::Service => "service",
            SaleLineKind::Rounding => "rounding",
            SaleLineKind::Debt => "debt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSaleLine {
    pub kind: SaleLineKind,
    pub reference_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
    pub commission_amount: BigDecimal,
    /// Row attributes that have no column of their own.
    pub details: Value,
}

#[derive(Debug, Clone)]
pub struct NewSale {
    pub client_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub lines: Vec<NewSaleLine>,
    pub rounding_amount: BigDecimal,
    pub debt_amount: BigDecimal,
    pub commission_amount: BigDecimal,
    pub total: BigDecimal,
}

fn insurance_details(item: &InsuranceItem) -> Value {
    let vehicle = &item.vehicle;
    json!({
        "id": item.id,
        "series": item.series,
        "number": item.number,
        "insurer_id": item.insurer_id,
        "start_date": item.start_date.map(|d| d.to_string()),
        "end_date": item.end_date.map(|d| d.to_string()),
        "commission_percent": item.commission_percent.to_string(),
        "is_roundable": item.is_roundable,
        "vehicle": {
            "brand": vehicle.brand,
            "model": vehicle.model,
            "year": vehicle.year,
            "color": vehicle.color,
            "plate": vehicle.plate,
            "vin_code": vehicle.vin_code,
        },
    })
}

fn service_details(item: &ServiceItem) -> Value {
    json!({
        "id": item.id,
        "is_auto_linked": item.is_auto_linked,
        "deletion_prohibited": item.deletion_prohibited,
        "quantity_override": item.quantity_override,
        "auto_quantity": item.auto_quantity,
        "is_roundable": item.is_roundable,
    })
}

fn adjustment_line(kind: SaleLineKind, description: &str, amount: &BigDecimal) -> NewSaleLine {
    NewSaleLine {
        kind,
        reference_id: String::new(),
        description: description.to_string(),
        quantity: 1,
        unit_price: amount.clone(),
        amount: amount.clone(),
        commission_amount: BigDecimal::zero(),
        details: json!({}),
    }
}

fn check_storable(what: &str, amount: &BigDecimal) -> Result<(), DomainError> {
    if money::fits_column(amount) {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "{} {} is too large to store",
            what, amount
        )))
    }
}

impl NewSale {
    /// Flattens a composed sale into storable lines. Rounding and debt
    /// repayment get a line of their own when non-zero.
    pub fn compose(
        client_id: Option<Uuid>,
        payment_method: PaymentMethod,
        insurance: &[InsuranceItem],
        services: &[ServiceItem],
        summary: &SaleSummary,
    ) -> Result<Self, DomainError> {
        let mut lines: Vec<NewSaleLine> = insurance
            .iter()
            .map(|item| NewSaleLine {
                kind: SaleLineKind::Insurance,
                reference_id: item.product_id.clone(),
                description: item.policy_reference(),
                quantity: 1,
                unit_price: item.premium.clone(),
                amount: item.premium.clone(),
                commission_amount: item.commission_amount(),
                details: insurance_details(item),
            })
            .collect();

        for item in services {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                DomainError::InvalidInput(format!(
                    "quantity {} of '{}' is out of range",
                    item.quantity, item.name
                ))
            })?;
            lines.push(NewSaleLine {
                kind: SaleLineKind::Service,
                reference_id: item.service_id.clone(),
                description: item.name.clone(),
                quantity,
                unit_price: item.unit_price.clone(),
                amount: item.total_amount.clone(),
                commission_amount: BigDecimal::zero(),
                details: service_details(item),
            });
        }

        if !summary.rounding_amount.is_zero() {
            lines.push(adjustment_line(
                SaleLineKind::Rounding,
                "Округление",
                &summary.rounding_amount,
            ));
        }
        if !summary.debt_total.is_zero() {
            lines.push(adjustment_line(
                SaleLineKind::Debt,
                "Погашение задолженности",
                &summary.debt_total,
            ));
        }

        for line in &lines {
            check_storable(&line.description, &line.amount)?;
            check_storable(&line.description, &line.unit_price)?;
        }
        check_storable("sale total", &summary.total)?;
        check_storable("commission", &summary.commission_total)?;

        Ok(Self {
            client_id,
            payment_method,
            lines,
            rounding_amount: summary.rounding_amount.clone(),
            debt_amount: summary.debt_total.clone(),
            commission_amount: summary.commission_total.clone(),
            total: summary.total.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SaleLineView {
    pub id: Uuid,
    pub kind: String,
    pub reference_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
    pub details: Value,
}

fn text(details: &Value, key: &str) -> String {
    details[key].as_str().unwrap_or_default().to_string()
}

fn date(details: &Value, key: &str) -> Option<NaiveDate> {
    details[key].as_str().and_then(|d| d.parse().ok())
}

impl SaleLineView {
    /// Rebuilds the insurance item a stored insurance line was made from.
    pub fn insurance_item(&self) -> Option<InsuranceItem> {
        if self.kind != SaleLineKind::Insurance.as_str() {
            return None;
        }
        let d = &self.details;
        let vehicle = &d["vehicle"];
        Some(InsuranceItem {
            id: d["id"].as_str().and_then(|id| id.parse().ok())?,
            product_id: self.reference_id.clone(),
            series: text(d, "series"),
            number: text(d, "number"),
            insurer_id: d["insurer_id"].as_str().map(str::to_string),
            start_date: date(d, "start_date"),
            end_date: date(d, "end_date"),
            premium: self.unit_price.clone(),
            commission_percent: d["commission_percent"]
                .as_str()
                .and_then(|p| BigDecimal::from_str(p).ok())
                .unwrap_or_default(),
            vehicle: VehicleDescriptor {
                brand: text(vehicle, "brand"),
                model: text(vehicle, "model"),
                year: vehicle["year"].as_i64().and_then(|y| i32::try_from(y).ok()),
                color: text(vehicle, "color"),
                plate: text(vehicle, "plate"),
                vin_code: text(vehicle, "vin_code"),
            },
            is_roundable: d["is_roundable"].as_bool(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SaleView {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub payment_method: String,
    pub rounding_amount: BigDecimal,
    pub debt_amount: BigDecimal,
    pub commission_amount: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLineView>,
}

/// Archived template input, kept verbatim so the document can be rendered again.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub id: Uuid,
    pub kind: String,
    pub reference: Option<String>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}
