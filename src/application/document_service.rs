use uuid::Uuid;

use crate::documents::{DocumentKind, DocumentPayload};
use crate::domain::errors::DomainError;
use crate::domain::ports::DocumentArchive;
use crate::domain::records::DocumentSnapshot;

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub html: String,
}

pub struct DocumentService<A> {
    archive: A,
}

impl<A: DocumentArchive> DocumentService<A> {
    pub fn new(archive: A) -> Self {
        Self { archive }
    }

    /// Renders the document and archives the input it was rendered from.
    pub fn render_and_archive(
        &self,
        payload: DocumentPayload,
    ) -> Result<RenderedDocument, DomainError> {
        let html = payload.render();
        let kind = payload.kind();
        let json = payload
            .to_json()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let id = self.archive.save(kind.as_str(), payload.reference(), json)?;
        log::info!("archived {} document {}", kind.as_str(), id);
        Ok(RenderedDocument { id, kind, html })
    }

    pub fn get_snapshot(&self, id: Uuid) -> Result<Option<DocumentSnapshot>, DomainError> {
        self.archive.find_by_id(id)
    }

    pub fn rerender(&self, id: Uuid) -> Result<Option<RenderedDocument>, DomainError> {
        let Some(snapshot) = self.archive.find_by_id(id)? else {
            return Ok(None);
        };
        let kind = DocumentKind::parse(&snapshot.kind).ok_or_else(|| {
            DomainError::Internal(format!("unknown archived document kind '{}'", snapshot.kind))
        })?;
        let payload = DocumentPayload::from_json(kind, snapshot.payload)
            .map_err(|e| DomainError::Internal(format!("corrupt snapshot {}: {}", id, e)))?;
        Ok(Some(RenderedDocument {
            id,
            kind,
            html: payload.render(),
        }))
    }
}
