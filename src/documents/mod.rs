//! HTML generators for the agency's printed forms.
//!
//! Each generator is a pure function of its input struct. [`DocumentPayload`]
//! ties the inputs to their kind so archived snapshots can be rendered again.

pub mod dkp;
pub mod europrotocol;
pub mod html;
pub mod pnd;
pub mod receipt;
pub mod words;

use serde_json::Value;

pub use dkp::{generate_dkp_html, DkpParty, DkpTemplateData, DkpVehicle};
pub use europrotocol::{generate_europrotocol_html, EuroprotocolData, EuroprotocolVehicle};
pub use html::escape_html;
pub use pnd::{generate_pnd_body_fragment, generate_pnd_html, PndTemplateData};
pub use receipt::{
    generate_cash_receipt_html, generate_sales_receipt_html, ReceiptLine, ReceiptTemplateData,
};
pub use words::number_to_words_rub;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Dkp,
    Pnd,
    CashReceipt,
    SalesReceipt,
    Europrotocol,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Dkp,
        DocumentKind::Pnd,
        DocumentKind::CashReceipt,
        DocumentKind::SalesReceipt,
        DocumentKind::Europrotocol,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Dkp => "dkp",
            DocumentKind::Pnd => "pnd",
            DocumentKind::CashReceipt => "cash-receipt",
            DocumentKind::SalesReceipt => "sales-receipt",
            DocumentKind::Europrotocol => "europrotocol",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentPayload {
    Dkp(DkpTemplateData),
    Pnd(PndTemplateData),
    CashReceipt(ReceiptTemplateData),
    SalesReceipt(ReceiptTemplateData),
    Europrotocol(EuroprotocolData),
}

/// Characters kept in the archive's `reference` column.
pub const MAX_REFERENCE_LEN: usize = 255;

impl DocumentPayload {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentPayload::Dkp(_) => DocumentKind::Dkp,
            DocumentPayload::Pnd(_) => DocumentKind::Pnd,
            DocumentPayload::CashReceipt(_) => DocumentKind::CashReceipt,
            DocumentPayload::SalesReceipt(_) => DocumentKind::SalesReceipt,
            DocumentPayload::Europrotocol(_) => DocumentKind::Europrotocol,
        }
    }

    pub fn render(&self) -> String {
        match self {
            DocumentPayload::Dkp(data) => generate_dkp_html(data),
            DocumentPayload::Pnd(data) => generate_pnd_html(data),
            DocumentPayload::CashReceipt(data) => generate_cash_receipt_html(data),
            DocumentPayload::SalesReceipt(data) => generate_sales_receipt_html(data),
            DocumentPayload::Europrotocol(data) => generate_europrotocol_html(data),
        }
    }

    /// Short identifier stored next to the snapshot for lookups. Cut to the
    /// width of the `reference` column.
    pub fn reference(&self) -> Option<String> {
        let value = match self {
            DocumentPayload::Dkp(data) => data.contract_number.trim(),
            DocumentPayload::Pnd(data) => data.full_name.trim(),
            DocumentPayload::CashReceipt(data) | DocumentPayload::SalesReceipt(data) => {
                data.receipt_number.trim()
            }
            DocumentPayload::Europrotocol(data) => data.accident_date.trim(),
        };
        (!value.is_empty()).then(|| value.chars().take(MAX_REFERENCE_LEN).collect())
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            DocumentPayload::Dkp(data) => serde_json::to_value(data),
            DocumentPayload::Pnd(data) => serde_json::to_value(data),
            DocumentPayload::CashReceipt(data) | DocumentPayload::SalesReceipt(data) => {
                serde_json::to_value(data)
            }
            DocumentPayload::Europrotocol(data) => serde_json::to_value(data),
        }
    }

    pub fn from_json(kind: DocumentKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            DocumentKind::Dkp => DocumentPayload::Dkp(serde_json::from_value(value)?),
            DocumentKind::Pnd => DocumentPayload::Pnd(serde_json::from_value(value)?),
            DocumentKind::CashReceipt => {
                DocumentPayload::CashReceipt(serde_json::from_value(value)?)
            }
            DocumentKind::SalesReceipt => {
                DocumentPayload::SalesReceipt(serde_json::from_value(value)?)
            }
            DocumentKind::Europrotocol => {
                DocumentPayload::Europrotocol(serde_json::from_value(value)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_parse_back() {
        for kind in DocumentKind::ALL {
            assert_eq!(DocumentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DocumentKind::parse("invoice"), None);
    }

    #[test]
    fn archived_json_renders_the_same_document() {
        let payload = DocumentPayload::Pnd(PndTemplateData {
            full_name: "Сидорова Анна".to_string(),
            ..Default::default()
        });
        let json = payload.to_json().expect("serialize");

        let restored = DocumentPayload::from_json(DocumentKind::Pnd, json).expect("deserialize");

        assert_eq!(restored, payload);
        assert_eq!(restored.render(), payload.render());
        assert_eq!(restored.reference().as_deref(), Some("Сидорова Анна"));
    }

    #[test]
    fn long_reference_is_cut_to_column_width() {
        let payload = DocumentPayload::Pnd(PndTemplateData {
            full_name: format!("  {}  ", "Я".repeat(300)),
            ..Default::default()
        });

        let reference = payload.reference().expect("reference");

        assert_eq!(reference.chars().count(), MAX_REFERENCE_LEN);
        assert!(reference.starts_with('Я'));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let value = serde_json::json!({ "receipt_number": "7", "items": [{ "name": "Полис", "price": "1000" }] });
        let payload =
            DocumentPayload::from_json(DocumentKind::CashReceipt, value).expect("deserialize");

        let DocumentPayload::CashReceipt(data) = &payload else {
            panic!("wrong payload kind");
        };
        assert_eq!(data.items[0].quantity, 1);
        assert_eq!(payload.kind(), DocumentKind::CashReceipt);
        assert!(payload.render().contains("КАССОВЫЙ ЧЕК № 7"));
    }

    #[test]
    fn blank_reference_is_none() {
        let payload = DocumentPayload::Dkp(DkpTemplateData::default());
        assert_eq!(payload.reference(), None);
    }
}
