use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::DocumentArchive;
use crate::domain::records::DocumentSnapshot;
use crate::schema::document_archive;

use super::models::{DocumentRow, NewDocumentRow};

pub struct DieselDocumentArchive {
    pool: DbPool,
}

impl DieselDocumentArchive {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DocumentArchive for DieselDocumentArchive {
    fn save(
        &self,
        kind: &str,
        reference: Option<String>,
        payload: Value,
    ) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::new_v4();
        diesel::insert_into(document_archive::table)
            .values(&NewDocumentRow {
                id,
                kind: kind.to_string(),
                reference,
                payload,
            })
            .execute(&mut conn)?;
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<DocumentSnapshot>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = document_archive::table
            .filter(document_archive::id.eq(id))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(|r| DocumentSnapshot {
            id: r.id,
            kind: r.kind,
            reference: r.reference,
            payload: r.payload,
            created_at: r.created_at,
        }))
    }
}
