use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;
use super::records::{DocumentSnapshot, NewSale, SaleView};
use super::shift::ShiftSale;

pub trait SaleRepository: Send + Sync + 'static {
    fn create(&self, sale: NewSale) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError>;
    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ShiftSale>, DomainError>;
}

pub trait DocumentArchive: Send + Sync + 'static {
    fn save(&self, kind: &str, reference: Option<String>, payload: Value)
        -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<DocumentSnapshot>, DomainError>;
}

impl<T: SaleRepository + ?Sized> SaleRepository for Arc<T> {
    fn create(&self, sale: NewSale) -> Result<Uuid, DomainError> {
        (**self).create(sale)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        (**self).find_by_id(id)
    }

    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ShiftSale>, DomainError> {
        (**self).list_between(from, to)
    }
}

impl<T: DocumentArchive + ?Sized> DocumentArchive for Arc<T> {
    fn save(
        &self,
        kind: &str,
        reference: Option<String>,
        payload: Value,
    ) -> Result<Uuid, DomainError> {
        (**self).save(kind, reference, payload)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<DocumentSnapshot>, DomainError> {
        (**self).find_by_id(id)
    }
}
