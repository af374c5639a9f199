use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::sale_draft::{CatalogContext, SaleDraft};
use crate::domain::errors::DomainError;
use crate::domain::ports::SaleRepository;
use crate::domain::records::{NewSale, SaleView};
use crate::domain::sale::{SaleSummary, ServiceItem};
use crate::domain::shift::{summarize_shift, PaymentMethod, ShiftTotals};

#[derive(Debug, Clone)]
pub struct SalePreview {
    pub service_items: Vec<ServiceItem>,
    pub summary: SaleSummary,
}

#[derive(Debug, Clone)]
pub struct CheckoutResult {
    pub id: Uuid,
    pub total: BigDecimal,
}

pub struct SaleService<R> {
    repo: R,
}

impl<R: SaleRepository> SaleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn preview(&self, mut draft: SaleDraft, ctx: &CatalogContext) -> SalePreview {
        draft.reconcile(ctx);
        let summary = draft.summary();
        SalePreview {
            service_items: draft.service_items,
            summary,
        }
    }

    pub fn checkout(
        &self,
        mut draft: SaleDraft,
        payment_method: PaymentMethod,
        ctx: &CatalogContext,
    ) -> Result<CheckoutResult, DomainError> {
        draft.reconcile(ctx);
        if draft.insurance_items.is_empty() && draft.service_items.is_empty() {
            return Err(DomainError::InvalidInput(
                "a sale needs at least one item".to_string(),
            ));
        }
        let summary = draft.summary();
        let sale = NewSale::compose(
            draft.client_id,
            payment_method,
            &draft.insurance_items,
            &draft.service_items,
            &summary,
        )?;
        let id = self.repo.create(sale)?;
        log::info!(
            "sale {} stored: total {}, paid by {}",
            id,
            summary.total,
            payment_method.as_str()
        );
        Ok(CheckoutResult {
            id,
            total: summary.total,
        })
    }

    pub fn get_sale(&self, id: Uuid) -> Result<Option<SaleView>, DomainError> {
        self.repo.find_by_id(id)
    }

    pub fn shift_report(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        opening_balance: &BigDecimal,
    ) -> Result<ShiftTotals, DomainError> {
        if from > to {
            return Err(DomainError::InvalidInput(
                "shift start must not be after its end".to_string(),
            ));
        }
        let sales = self.repo.list_between(from, to)?;
        Ok(summarize_shift(opening_balance, &sales))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use bigdecimal::Zero;
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::sale::{
        CatalogService, InclusionType, InsuranceItem, ProductServiceLink, RoundingSettings,
    };
    use crate::domain::shift::ShiftSale;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[derive(Default)]
    struct MemoryRepo {
        stored: Mutex<Vec<(Uuid, NewSale)>>,
        shift: Vec<ShiftSale>,
    }

    impl SaleRepository for MemoryRepo {
        fn create(&self, sale: NewSale) -> Result<Uuid, DomainError> {
            let id = Uuid::new_v4();
            self.stored.lock().unwrap().push((id, sale));
            Ok(id)
        }

        fn find_by_id(&self, _id: Uuid) -> Result<Option<SaleView>, DomainError> {
            Ok(None)
        }

        fn list_between(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<ShiftSale>, DomainError> {
            Ok(self
                .shift
                .iter()
                .filter(|s| s.created_at >= from && s.created_at < to)
                .cloned()
                .collect())
        }
    }

    fn ctx() -> CatalogContext {
        CatalogContext {
            links: vec![ProductServiceLink {
                product_id: "osago".to_string(),
                service_id: "stamp".to_string(),
                inclusion_type: InclusionType::Auto,
                deletion_prohibited: true,
            }],
            catalog: vec![CatalogService {
                id: "stamp".to_string(),
                name: "Stamp Duty".to_string(),
                default_price: dec("50"),
            }],
        }
    }

    fn draft() -> SaleDraft {
        let mut draft = SaleDraft::new(
            None,
            RoundingSettings {
                enabled: true,
                step: dec("100"),
            },
        );
        draft
            .insurance_items
            .push(InsuranceItem::new("osago", dec("1180")));
        draft
    }

    #[test]
    fn preview_reconciles_without_storing() {
        let service = SaleService::new(MemoryRepo::default());

        let preview = service.preview(draft(), &ctx());

        assert_eq!(preview.service_items.len(), 1);
        assert_eq!(preview.summary.total, dec("1300"));
        assert!(service.repo.stored.lock().unwrap().is_empty());
    }

    #[test]
    fn checkout_persists_composed_lines() {
        let service = SaleService::new(MemoryRepo::default());

        let result = service
            .checkout(draft(), PaymentMethod::Card, &ctx())
            .expect("checkout");

        assert_eq!(result.total, dec("1300"));
        let stored = service.repo.stored.lock().unwrap();
        let (id, sale) = &stored[0];
        assert_eq!(*id, result.id);
        assert_eq!(sale.lines.len(), 3);
        assert_eq!(sale.rounding_amount, dec("70"));
        assert_eq!(sale.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn empty_sale_is_rejected() {
        let service = SaleService::new(MemoryRepo::default());
        let empty = SaleDraft::new(None, RoundingSettings::default());

        let result = service.checkout(empty, PaymentMethod::Cash, &ctx());

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn auto_rows_left_without_their_policy_are_rejected() {
        let service = SaleService::new(MemoryRepo::default());
        let mut stale = draft();
        stale.reconcile(&ctx());
        stale.insurance_items.clear();
        assert_eq!(stale.service_items.len(), 1);

        let result = service.checkout(stale, PaymentMethod::Cash, &ctx());

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(service.repo.stored.lock().unwrap().is_empty());
    }

    #[test]
    fn shift_report_covers_requested_window() {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let sale = |minutes: i64, method: PaymentMethod, total: &str| ShiftSale {
            id: Uuid::new_v4(),
            payment_method: method,
            total: dec(total),
            created_at: start + Duration::minutes(minutes),
        };
        let repo = MemoryRepo {
            shift: vec![
                sale(10, PaymentMethod::Cash, "1300"),
                sale(20, PaymentMethod::Card, "700"),
                sale(60 * 12, PaymentMethod::Cash, "500"),
            ],
            ..Default::default()
        };
        let service = SaleService::new(repo);

        let totals = service
            .shift_report(start, start + Duration::hours(9), &dec("2000"))
            .expect("report");

        assert_eq!(totals.sales_count, 2);
        assert_eq!(totals.total, dec("2000"));
        assert_eq!(totals.expected_cash, dec("3300"));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let service = SaleService::new(MemoryRepo::default());
        let now = Utc::now();
        let result = service.shift_report(now, now - Duration::hours(1), &BigDecimal::zero());
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }
}
