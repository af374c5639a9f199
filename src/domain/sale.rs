use bigdecimal::{BigDecimal, RoundingMode, Zero};
use chrono::NaiveDate;
use uuid::Uuid;

use super::vehicle::VehicleDescriptor;

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionType {
    /// Quantity follows the number of matching insurance items.
    Auto,
    /// Offered to the agent but never added on its own.
    Manual,
}

impl InclusionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InclusionType::Auto => "auto",
            InclusionType::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(InclusionType::Auto),
            "manual" => Some(InclusionType::Manual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductServiceLink {
    pub product_id: String,
    pub service_id: String,
    pub inclusion_type: InclusionType,
    pub deletion_prohibited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogService {
    pub id: String,
    pub name: String,
    pub default_price: BigDecimal,
}

// ── Line items ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceItem {
    pub id: Uuid,
    pub product_id: String,
    pub series: String,
    pub number: String,
    pub insurer_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub premium: BigDecimal,
    pub commission_percent: BigDecimal,
    pub vehicle: VehicleDescriptor,
    /// Only an explicit `false` takes the item out of rounding.
    pub is_roundable: Option<bool>,
}

impl InsuranceItem {
    pub fn new(product_id: impl Into<String>, premium: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            series: String::new(),
            number: String::new(),
            insurer_id: None,
            start_date: None,
            end_date: None,
            premium,
            commission_percent: BigDecimal::zero(),
            vehicle: VehicleDescriptor::default(),
            is_roundable: None,
        }
    }

    /// Agent commission in currency units, rounded half-up to kopecks.
    pub fn commission_amount(&self) -> BigDecimal {
        let raw = (&self.premium * &self.commission_percent) / BigDecimal::from(100);
        raw.with_scale_round(2, RoundingMode::HalfUp)
    }

    /// `ХХХ 0123456789` style policy reference.
    pub fn policy_reference(&self) -> String {
        format!("{} {}", self.series.trim(), self.number.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceItem {
    pub id: Uuid,
    pub service_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub total_amount: BigDecimal,
    pub is_auto_linked: bool,
    pub deletion_prohibited: bool,
    /// Set when the agent edited the quantity of an auto-linked row.
    pub quantity_override: bool,
    /// Quantity the catalog links expect. Refreshed even while overridden.
    pub auto_quantity: Option<u32>,
    pub is_roundable: Option<bool>,
}

impl ServiceItem {
    pub fn manual(service: &CatalogService, quantity: u32) -> Self {
        let mut item = Self {
            id: Uuid::new_v4(),
            service_id: service.id.clone(),
            name: service.name.clone(),
            quantity,
            unit_price: service.default_price.clone(),
            total_amount: BigDecimal::zero(),
            is_auto_linked: false,
            deletion_prohibited: false,
            quantity_override: false,
            auto_quantity: None,
            is_roundable: None,
        };
        item.recalculate();
        item
    }

    fn auto_linked(service: &CatalogService, expected: &ExpectedService) -> Self {
        let mut item = Self::manual(service, expected.quantity);
        item.is_auto_linked = true;
        item.deletion_prohibited = expected.deletion_prohibited;
        item.auto_quantity = Some(expected.quantity);
        item.recalculate();
        item
    }

    pub fn recalculate(&mut self) {
        self.total_amount = &self.unit_price * &BigDecimal::from(self.quantity);
    }

    /// The agent's quantity no longer matches what the links expect.
    pub fn is_out_of_sync(&self) -> bool {
        self.quantity_override && self.auto_quantity.is_some_and(|q| q != self.quantity)
    }
}

/// A row of the sale as seen by the rounding and total calculations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleItem {
    Insurance(InsuranceItem),
    Service(ServiceItem),
    Rounding(BigDecimal),
}

impl SaleItem {
    pub fn amount(&self) -> &BigDecimal {
        match self {
            SaleItem::Insurance(item) => &item.premium,
            SaleItem::Service(item) => &item.total_amount,
            SaleItem::Rounding(amount) => amount,
        }
    }

    pub fn is_rounding(&self) -> bool {
        matches!(self, SaleItem::Rounding(_))
    }

    pub fn is_roundable(&self) -> bool {
        match self {
            SaleItem::Insurance(item) => item.is_roundable != Some(false),
            SaleItem::Service(item) => item.is_roundable != Some(false),
            SaleItem::Rounding(_) => false,
        }
    }
}

/// Flattens both lists into calculation rows, insurance first.
pub fn sale_items(insurance: &[InsuranceItem], services: &[ServiceItem]) -> Vec<SaleItem> {
    insurance
        .iter()
        .cloned()
        .map(SaleItem::Insurance)
        .chain(services.iter().cloned().map(SaleItem::Service))
        .collect()
}

// ── Auto-linked services ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct ExpectedService {
    service_id: String,
    quantity: u32,
    deletion_prohibited: bool,
}

fn expected_services(
    insurance_items: &[InsuranceItem],
    links: &[ProductServiceLink],
) -> Vec<ExpectedService> {
    let mut product_counts: Vec<(&str, u32)> = Vec::new();
    for item in insurance_items {
        match product_counts
            .iter_mut()
            .find(|(id, _)| *id == item.product_id.as_str())
        {
            Some((_, count)) => *count += 1,
            None => product_counts.push((item.product_id.as_str(), 1)),
        }
    }

    let mut expected: Vec<ExpectedService> = Vec::new();
    for (product_id, count) in product_counts {
        for link in links
            .iter()
            .filter(|l| l.inclusion_type == InclusionType::Auto && l.product_id == product_id)
        {
            match expected.iter_mut().find(|e| e.service_id == link.service_id) {
                Some(entry) => {
                    entry.quantity += count;
                    entry.deletion_prohibited |= link.deletion_prohibited;
                }
                None => expected.push(ExpectedService {
                    service_id: link.service_id.clone(),
                    quantity: count,
                    deletion_prohibited: link.deletion_prohibited,
                }),
            }
        }
    }
    expected
}

/// Brings auto-linked service rows in line with the current insurance items.
///
/// Manual rows pass through untouched. Surviving auto rows keep their
/// position; services that became expected are appended in the order their
/// products first appear. A row the agent overrode keeps its quantity and
/// only has `auto_quantity` refreshed.
pub fn reconcile_auto_services(
    insurance_items: &[InsuranceItem],
    links: &[ProductServiceLink],
    catalog: &[CatalogService],
    previous: &[ServiceItem],
) -> Vec<ServiceItem> {
    let expected = expected_services(insurance_items, links);
    let mut placed: Vec<&str> = Vec::new();
    let mut result: Vec<ServiceItem> = Vec::with_capacity(previous.len() + expected.len());

    for row in previous {
        if !row.is_auto_linked {
            result.push(row.clone());
            continue;
        }
        if placed.contains(&row.service_id.as_str()) {
            continue;
        }
        let Some(exp) = expected.iter().find(|e| e.service_id == row.service_id) else {
            log::debug!("dropping auto-linked service {}", row.service_id);
            continue;
        };

        let mut updated = row.clone();
        updated.auto_quantity = Some(exp.quantity);
        updated.deletion_prohibited = exp.deletion_prohibited;
        if !updated.quantity_override {
            updated.quantity = exp.quantity;
        }
        updated.recalculate();
        placed.push(row.service_id.as_str());
        result.push(updated);
    }

    for exp in &expected {
        if placed.contains(&exp.service_id.as_str()) {
            continue;
        }
        match catalog.iter().find(|s| s.id == exp.service_id) {
            Some(service) => result.push(ServiceItem::auto_linked(service, exp)),
            None => log::warn!(
                "auto-linked service {} is missing from the catalog",
                exp.service_id
            ),
        }
    }

    result
}

// ── Rounding and totals ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundingSettings {
    pub enabled: bool,
    pub step: BigDecimal,
}

impl Default for RoundingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            step: BigDecimal::from(100),
        }
    }
}

fn sum<'a>(amounts: impl Iterator<Item = &'a BigDecimal>) -> BigDecimal {
    amounts.fold(BigDecimal::zero(), |acc, a| acc + a)
}

pub fn roundable_subtotal(items: &[SaleItem]) -> BigDecimal {
    sum(items
        .iter()
        .filter(|i| i.is_roundable())
        .map(SaleItem::amount))
}

/// Amount that lifts the roundable subtotal to the next multiple of `step`.
///
/// Always in `[0, step)`; zero when disabled or when there is nothing to round.
pub fn compute_rounding_amount(items: &[SaleItem], is_enabled: bool, step: &BigDecimal) -> BigDecimal {
    if !is_enabled || *step <= BigDecimal::zero() {
        return BigDecimal::zero();
    }
    let subtotal = roundable_subtotal(items);
    if subtotal <= BigDecimal::zero() {
        return BigDecimal::zero();
    }
    let remainder = subtotal % step.clone();
    if remainder.is_zero() {
        BigDecimal::zero()
    } else {
        step.clone() - remainder
    }
}

/// Non-rounding items + rounding + debts repaid within this sale.
pub fn compute_total(
    items: &[SaleItem],
    rounding_amount: &BigDecimal,
    selected_debt_total: &BigDecimal,
) -> BigDecimal {
    let items_total = sum(items
        .iter()
        .filter(|i| !i.is_rounding())
        .map(SaleItem::amount));
    items_total + rounding_amount + selected_debt_total
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleSummary {
    pub subtotal: BigDecimal,
    pub roundable_subtotal: BigDecimal,
    pub rounding_amount: BigDecimal,
    pub debt_total: BigDecimal,
    pub total: BigDecimal,
    pub commission_total: BigDecimal,
}

pub fn summarize_sale(
    insurance: &[InsuranceItem],
    services: &[ServiceItem],
    rounding: &RoundingSettings,
    selected_debt_total: &BigDecimal,
) -> SaleSummary {
    let items = sale_items(insurance, services);
    let rounding_amount = compute_rounding_amount(&items, rounding.enabled, &rounding.step);
    let zero = BigDecimal::zero();
    let subtotal = compute_total(&items, &zero, &zero);
    let total = compute_total(&items, &rounding_amount, selected_debt_total);
    let commission_total = insurance
        .iter()
        .map(InsuranceItem::commission_amount)
        .fold(BigDecimal::zero(), |acc, c| acc + c);

    SaleSummary {
        subtotal,
        roundable_subtotal: roundable_subtotal(&items),
        rounding_amount,
        debt_total: selected_debt_total.clone(),
        total,
        commission_total,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn osago() -> InsuranceItem {
        InsuranceItem::new("osago", dec("1180"))
    }

    fn stamp_link() -> ProductServiceLink {
        ProductServiceLink {
            product_id: "osago".to_string(),
            service_id: "stamp".to_string(),
            inclusion_type: InclusionType::Auto,
            deletion_prohibited: false,
        }
    }

    fn catalog() -> Vec<CatalogService> {
        vec![
            CatalogService {
                id: "stamp".to_string(),
                name: "Stamp Duty".to_string(),
                default_price: dec("50"),
            },
            CatalogService {
                id: "copy".to_string(),
                name: "Document copy".to_string(),
                default_price: dec("20"),
            },
        ]
    }

    fn rounding_rows(amount: &str) -> Vec<SaleItem> {
        vec![SaleItem::Insurance(InsuranceItem::new("osago", dec(amount)))]
    }

    // ── reconcile_auto_services ───────────────────────────────────────────────

    #[test]
    fn reconcile_adds_auto_service_for_linked_product() {
        let rows = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog(), &[]);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.service_id, "stamp");
        assert_eq!(row.name, "Stamp Duty");
        assert!(row.is_auto_linked);
        assert_eq!(row.quantity, 1);
        assert_eq!(row.unit_price, dec("50"));
        assert_eq!(row.total_amount, dec("50"));
        assert_eq!(row.auto_quantity, Some(1));
    }

    #[test]
    fn reconcile_counts_every_matching_insurance_item() {
        let rows = reconcile_auto_services(
            &[osago(), osago(), InsuranceItem::new("kasko", dec("9000"))],
            &[stamp_link()],
            &catalog(),
            &[],
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 2);
        assert_eq!(rows[0].total_amount, dec("100"));
    }

    #[test]
    fn reconcile_accumulates_links_from_several_products() {
        let links = vec![
            stamp_link(),
            ProductServiceLink {
                product_id: "kasko".to_string(),
                service_id: "stamp".to_string(),
                inclusion_type: InclusionType::Auto,
                deletion_prohibited: true,
            },
        ];
        let rows = reconcile_auto_services(
            &[osago(), InsuranceItem::new("kasko", dec("9000"))],
            &links,
            &catalog(),
            &[],
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 2);
        assert!(rows[0].deletion_prohibited);
    }

    #[test]
    fn reconcile_ignores_manual_links() {
        let link = ProductServiceLink {
            inclusion_type: InclusionType::Manual,
            ..stamp_link()
        };
        let rows = reconcile_auto_services(&[osago()], &[link], &catalog(), &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let insurance = vec![osago(), osago()];
        let first = reconcile_auto_services(&insurance, &[stamp_link()], &catalog(), &[]);
        let second = reconcile_auto_services(&insurance, &[stamp_link()], &catalog(), &first);

        assert_eq!(first, second);
    }

    #[test]
    fn reconcile_updates_existing_row_in_place() {
        let first = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog(), &[]);
        let second =
            reconcile_auto_services(&[osago(), osago()], &[stamp_link()], &catalog(), &first);

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].quantity, 2);
        assert_eq!(second[0].total_amount, dec("100"));
    }

    #[test]
    fn reconcile_preserves_manual_override_but_refreshes_auto_quantity() {
        let mut rows = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog(), &[]);
        rows[0].quantity = 5;
        rows[0].quantity_override = true;
        rows[0].recalculate();

        let rows = reconcile_auto_services(
            &[osago(), osago(), osago()],
            &[stamp_link()],
            &catalog(),
            &rows,
        );

        assert_eq!(rows[0].quantity, 5);
        assert_eq!(rows[0].auto_quantity, Some(3));
        assert_eq!(rows[0].total_amount, dec("250"));
        assert!(rows[0].is_out_of_sync());
    }

    #[test]
    fn reconcile_drops_auto_rows_no_longer_expected() {
        let rows = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog(), &[]);
        let rows = reconcile_auto_services(&[], &[stamp_link()], &catalog(), &rows);
        assert!(rows.is_empty());
    }

    #[test]
    fn reconcile_never_touches_manual_rows() {
        let catalog = catalog();
        let mut manual = ServiceItem::manual(&catalog[0], 4);
        manual.unit_price = dec("45");
        manual.recalculate();

        let rows = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog, &[manual.clone()]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], manual);
        assert!(rows[1].is_auto_linked);
        assert_eq!(rows[1].quantity, 1);

        let rows = reconcile_auto_services(&[], &[stamp_link()], &catalog, &rows);
        assert_eq!(rows, vec![manual]);
    }

    #[test]
    fn reconcile_removes_duplicate_auto_rows() {
        let first = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog(), &[]);
        let doubled = vec![first[0].clone(), first[0].clone()];
        let rows = reconcile_auto_services(&[osago()], &[stamp_link()], &catalog(), &doubled);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn reconcile_skips_services_missing_from_catalog() {
        let link = ProductServiceLink {
            service_id: "ghost".to_string(),
            ..stamp_link()
        };
        let rows = reconcile_auto_services(&[osago()], &[link], &catalog(), &[]);
        assert!(rows.is_empty());
    }

    // ── rounding ──────────────────────────────────────────────────────────────

    #[test]
    fn rounding_lifts_subtotal_to_next_step() {
        let items = rounding_rows("1230");
        let amount = compute_rounding_amount(&items, true, &dec("100"));
        assert_eq!(amount, dec("70"));
        assert_eq!(roundable_subtotal(&items) + amount, dec("1300"));
    }

    #[test]
    fn rounding_is_zero_when_disabled() {
        for value in ["1", "1230", "99.99", "100"] {
            let amount = compute_rounding_amount(&rounding_rows(value), false, &dec("100"));
            assert!(amount.is_zero(), "{value} rounded while disabled");
        }
    }

    #[test]
    fn rounding_is_zero_for_exact_multiple_and_empty_sale() {
        assert!(compute_rounding_amount(&rounding_rows("1300"), true, &dec("100")).is_zero());
        assert!(compute_rounding_amount(&[], true, &dec("100")).is_zero());
        assert!(compute_rounding_amount(&rounding_rows("0"), true, &dec("100")).is_zero());
    }

    #[test]
    fn rounding_is_zero_for_non_positive_step() {
        assert!(compute_rounding_amount(&rounding_rows("1230"), true, &dec("0")).is_zero());
        assert!(compute_rounding_amount(&rounding_rows("1230"), true, &dec("-10")).is_zero());
    }

    #[test]
    fn rounding_stays_within_step_and_reaches_a_multiple() {
        for step in [1u32, 7, 10, 50, 100, 500] {
            let step = BigDecimal::from(step);
            for subtotal in (0u32..1_050).step_by(13) {
                let items = rounding_rows(&subtotal.to_string());
                let amount = compute_rounding_amount(&items, true, &step);
                assert!(amount >= BigDecimal::zero());
                assert!(amount < step);
                let rounded = BigDecimal::from(subtotal) + &amount;
                assert!((rounded % step.clone()).is_zero());
            }
        }
    }

    #[test]
    fn rounding_handles_kopecks() {
        let amount = compute_rounding_amount(&rounding_rows("1234.56"), true, &dec("10"));
        assert_eq!(amount, dec("5.44"));
    }

    #[test]
    fn rounding_skips_items_explicitly_excluded() {
        let mut excluded = InsuranceItem::new("kasko", dec("45"));
        excluded.is_roundable = Some(false);
        let mut included = InsuranceItem::new("osago", dec("1230"));
        included.is_roundable = Some(true);
        let items = vec![
            SaleItem::Insurance(included),
            SaleItem::Insurance(excluded),
            SaleItem::Rounding(dec("30")),
        ];

        assert_eq!(roundable_subtotal(&items), dec("1230"));
        assert_eq!(compute_rounding_amount(&items, true, &dec("100")), dec("70"));
    }

    #[test]
    fn total_adds_rounding_and_debt_but_ignores_rounding_rows() {
        let items = vec![
            SaleItem::Insurance(InsuranceItem::new("osago", dec("1180"))),
            SaleItem::Rounding(dec("999")),
        ];
        let total = compute_total(&items, &dec("20"), &dec("500"));
        assert_eq!(total, dec("1700"));
    }

    // ── summary ───────────────────────────────────────────────────────────────

    #[test]
    fn summary_combines_items_rounding_debt_and_commission() {
        let mut policy = osago();
        policy.commission_percent = dec("12.5");
        let services = reconcile_auto_services(&[policy.clone()], &[stamp_link()], &catalog(), &[]);
        let rounding = RoundingSettings {
            enabled: true,
            step: dec("100"),
        };

        let summary = summarize_sale(&[policy], &services, &rounding, &dec("300"));

        assert_eq!(summary.subtotal, dec("1230"));
        assert_eq!(summary.roundable_subtotal, dec("1230"));
        assert_eq!(summary.rounding_amount, dec("70"));
        assert_eq!(summary.debt_total, dec("300"));
        assert_eq!(summary.total, dec("1600"));
        assert_eq!(summary.commission_total, dec("147.50"));
    }

    #[test]
    fn commission_rounds_half_up_to_kopecks() {
        let mut item = InsuranceItem::new("osago", dec("1000.01"));
        item.commission_percent = dec("15");
        assert_eq!(item.commission_amount(), dec("150.00"));

        item.premium = dec("0.10");
        item.commission_percent = dec("5");
        assert_eq!(item.commission_amount(), dec("0.01"));
    }

    #[test]
    fn inclusion_type_parses_case_insensitively() {
        assert_eq!(InclusionType::parse("AUTO"), Some(InclusionType::Auto));
        assert_eq!(InclusionType::parse(" manual "), Some(InclusionType::Manual));
        assert_eq!(InclusionType::parse("sometimes"), None);
        assert_eq!(InclusionType::Auto.as_str(), "auto");
    }
}
