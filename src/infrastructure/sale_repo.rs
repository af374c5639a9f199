use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::SaleRepository;
use crate::domain::records::{NewSale, SaleLineView, SaleView};
use crate::domain::shift::{PaymentMethod, ShiftSale};
use crate::schema::{sale_items, sales};

use super::models::{NewSaleItemRow, NewSaleRow, SaleItemRow, SaleRow};

pub struct DieselSaleRepository {
    pool: DbPool,
}

impl DieselSaleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SaleRepository for DieselSaleRepository {
    fn create(&self, sale: NewSale) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let sale_id = Uuid::new_v4();
            diesel::insert_into(sales::table)
                .values(&NewSaleRow {
                    id: sale_id,
                    client_id: sale.client_id,
                    payment_method: sale.payment_method.as_str().to_string(),
                    rounding_amount: sale.rounding_amount.clone(),
                    debt_amount: sale.debt_amount.clone(),
                    commission_amount: sale.commission_amount.clone(),
                    total: sale.total.clone(),
                })
                .execute(conn)?;

            // Lines keep the order they were composed in.
            let rows: Vec<NewSaleItemRow> = sale
                .lines
                .iter()
                .enumerate()
                .map(|(position, line)| NewSaleItemRow {
                    id: Uuid::new_v4(),
                    sale_id,
                    position: position as i32,
                    kind: line.kind.as_str().to_string(),
                    reference_id: line.reference_id.clone(),
                    description: line.description.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price.clone(),
                    amount: line.amount.clone(),
                    commission_amount: line.commission_amount.clone(),
                    details: line.details.clone(),
                })
                .collect();
            diesel::insert_into(sale_items::table)
                .values(&rows)
                .execute(conn)?;

            Ok(sale_id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        let mut conn = self.pool.get()?;

        let sale = sales::table
            .filter(sales::id.eq(id))
            .select(SaleRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let lines = SaleItemRow::belonging_to(&sale)
            .select(SaleItemRow::as_select())
            .order(sale_items::position.asc())
            .load(&mut conn)?;

        Ok(Some(SaleView {
            id: sale.id,
            client_id: sale.client_id,
            payment_method: sale.payment_method,
            rounding_amount: sale.rounding_amount,
            debt_amount: sale.debt_amount,
            commission_amount: sale.commission_amount,
            total: sale.total,
            created_at: sale.created_at,
            lines: lines
                .into_iter()
                .map(|l| SaleLineView {
                    id: l.id,
                    kind: l.kind,
                    reference_id: l.reference_id,
                    description: l.description,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    amount: l.amount,
                    details: l.details,
                })
                .collect(),
        }))
    }

    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ShiftSale>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = sales::table
            .filter(sales::created_at.ge(from))
            .filter(sales::created_at.lt(to))
            .order(sales::created_at.asc())
            .select(SaleRow::as_select())
            .load(&mut conn)?;

        rows.into_iter()
            .map(|row| {
                let payment_method = PaymentMethod::parse(&row.payment_method).ok_or_else(|| {
                    DomainError::Internal(format!(
                        "sale {} has unknown payment method '{}'",
                        row.id, row.payment_method
                    ))
                })?;
                Ok(ShiftSale {
                    id: row.id,
                    payment_method,
                    total: row.total,
                    created_at: row.created_at,
                })
            })
            .collect()
    }
}
