pub mod document_service;
pub mod sale_draft;
pub mod sale_service;
