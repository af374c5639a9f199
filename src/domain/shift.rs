use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }

    /// Label printed on receipts.
    pub fn label_ru(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Наличные",
            PaymentMethod::Card => "Банковская карта",
            PaymentMethod::Transfer => "Безналичный перевод",
        }
    }
}

/// A stored sale as seen by the shift report.
#[derive(Debug, Clone)]
pub struct ShiftSale {
    pub id: Uuid,
    pub payment_method: PaymentMethod,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentBreakdown {
    pub method: PaymentMethod,
    pub count: u32,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTotals {
    pub opening_balance: BigDecimal,
    pub sales_count: u32,
    pub total: BigDecimal,
    pub breakdown: Vec<PaymentBreakdown>,
    /// Cash that should be in the drawer at closing.
    pub expected_cash: BigDecimal,
}

pub fn summarize_shift(opening_balance: &BigDecimal, sales: &[ShiftSale]) -> ShiftTotals {
    let breakdown: Vec<PaymentBreakdown> = PaymentMethod::ALL
        .iter()
        .map(|method| {
            let matching = sales.iter().filter(|s| s.payment_method == *method);
            PaymentBreakdown {
                method: *method,
                count: matching.clone().count() as u32,
                amount: matching.fold(BigDecimal::zero(), |acc, s| acc + &s.total),
            }
        })
        .collect();

    let total = breakdown
        .iter()
        .fold(BigDecimal::zero(), |acc, b| acc + &b.amount);
    let cash = breakdown
        .iter()
        .find(|b| b.method == PaymentMethod::Cash)
        .map(|b| b.amount.clone())
        .unwrap_or_else(BigDecimal::zero);

    ShiftTotals {
        opening_balance: opening_balance.clone(),
        sales_count: sales.len() as u32,
        total,
        breakdown,
        expected_cash: opening_balance.clone() + cash,
    }
}
