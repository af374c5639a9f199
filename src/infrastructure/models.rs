use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::{document_archive, sale_items, sales};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sales)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleRow {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub payment_method: String,
    pub rounding_amount: BigDecimal,
    pub debt_amount: BigDecimal,
    pub commission_amount: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sales)]
pub struct NewSaleRow {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub payment_method: String,
    pub rounding_amount: BigDecimal,
    pub debt_amount: BigDecimal,
    pub commission_amount: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = sale_items)]
#[diesel(belongs_to(SaleRow, foreign_key = sale_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub position: i32,
    pub kind: String,
    pub reference_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
    pub commission_amount: BigDecimal,
    pub details: Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sale_items)]
pub struct NewSaleItemRow {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub position: i32,
    pub kind: String,
    pub reference_id: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
    pub commission_amount: BigDecimal,
    pub details: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = document_archive)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentRow {
    pub id: Uuid,
    pub kind: String,
    pub reference: Option<String>,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_archive)]
pub struct NewDocumentRow {
    pub id: Uuid,
    pub kind: String,
    pub reference: Option<String>,
    pub payload: Value,
}
