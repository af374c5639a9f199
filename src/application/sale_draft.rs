use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::sale::{
    reconcile_auto_services, summarize_sale, CatalogService, InsuranceItem, ProductServiceLink,
    RoundingSettings, SaleSummary, ServiceItem,
};
use crate::domain::vehicle::VehicleUpdate;

/// Catalog state the draft is reconciled against.
#[derive(Debug, Clone, Default)]
pub struct CatalogContext {
    pub links: Vec<ProductServiceLink>,
    pub catalog: Vec<CatalogService>,
}

impl CatalogContext {
    fn service(&self, service_id: &str) -> Option<&CatalogService> {
        self.catalog.iter().find(|s| s.id == service_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtEntry {
    pub id: Uuid,
    pub description: String,
    pub amount: BigDecimal,
    pub selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InsuranceItemUpdate {
    pub product_id: Option<String>,
    pub series: Option<String>,
    pub number: Option<String>,
    pub insurer_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub premium: Option<BigDecimal>,
    pub commission_percent: Option<BigDecimal>,
    pub is_roundable: Option<bool>,
    pub vehicle: VehicleUpdate,
}

impl InsuranceItemUpdate {
    fn apply_to(self, item: &mut InsuranceItem) {
        if let Some(product_id) = self.product_id {
            item.product_id = product_id;
        }
        if let Some(series) = self.series {
            item.series = series;
        }
        if let Some(number) = self.number {
            item.number = number;
        }
        if let Some(insurer_id) = self.insurer_id {
            item.insurer_id = Some(insurer_id);
        }
        if let Some(start) = self.start_date {
            item.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            item.end_date = Some(end);
        }
        if let Some(premium) = self.premium {
            item.premium = premium;
        }
        if let Some(percent) = self.commission_percent {
            item.commission_percent = percent;
        }
        if let Some(roundable) = self.is_roundable {
            item.is_roundable = Some(roundable);
        }
        self.vehicle.apply_to(&mut item.vehicle);
    }
}

#[derive(Debug, Clone)]
pub enum SaleCommand {
    AddInsurance(InsuranceItem),
    UpdateInsurance { id: Uuid, update: InsuranceItemUpdate },
    RemoveInsurance(Uuid),
    AddService { service_id: String, quantity: u32 },
    SetServiceQuantity { id: Uuid, quantity: u32 },
    /// Drops the agent's override and follows the links again.
    ResetServiceQuantity(Uuid),
    RemoveService(Uuid),
    SetRounding(RoundingSettings),
    ToggleDebt(Uuid),
}

/// A sale being composed. All mutation goes through [`SaleDraft::apply`].
#[derive(Debug, Clone, Default)]
pub struct SaleDraft {
    pub client_id: Option<Uuid>,
    pub insurance_items: Vec<InsuranceItem>,
    pub service_items: Vec<ServiceItem>,
    pub rounding: RoundingSettings,
    pub debts: Vec<DebtEntry>,
}

impl SaleDraft {
    pub fn new(client_id: Option<Uuid>, rounding: RoundingSettings) -> Self {
        Self {
            client_id,
            rounding,
            ..Default::default()
        }
    }

    pub fn reconcile(&mut self, ctx: &CatalogContext) {
        self.service_items = reconcile_auto_services(
            &self.insurance_items,
            &ctx.links,
            &ctx.catalog,
            &self.service_items,
        );
    }

    pub fn apply(&mut self, command: SaleCommand, ctx: &CatalogContext) -> Result<(), DomainError> {
        match command {
            SaleCommand::AddInsurance(item) => {
                self.insurance_items.push(item);
                self.reconcile(ctx);
            }
            SaleCommand::UpdateInsurance { id, update } => {
                let item = self
                    .insurance_items
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(DomainError::NotFound)?;
                update.apply_to(item);
                self.reconcile(ctx);
            }
            SaleCommand::RemoveInsurance(id) => {
                let before = self.insurance_items.len();
                self.insurance_items.retain(|i| i.id != id);
                if self.insurance_items.len() == before {
                    return Err(DomainError::NotFound);
                }
                self.reconcile(ctx);
            }
            SaleCommand::AddService {
                service_id,
                quantity,
            } => {
                let service = ctx.service(&service_id).ok_or_else(|| {
                    DomainError::InvalidInput(format!("unknown service '{}'", service_id))
                })?;
                self.service_items
                    .push(ServiceItem::manual(service, quantity.max(1)));
            }
            SaleCommand::SetServiceQuantity { id, quantity } => {
                let item = self.service_mut(id)?;
                item.quantity = quantity;
                if item.is_auto_linked {
                    item.quantity_override = true;
                }
                item.recalculate();
            }
            SaleCommand::ResetServiceQuantity(id) => {
                let item = self.service_mut(id)?;
                item.quantity_override = false;
                if let Some(expected) = item.auto_quantity {
                    item.quantity = expected;
                }
                item.recalculate();
            }
            SaleCommand::RemoveService(id) => {
                let item = self.service_mut(id)?;
                if item.deletion_prohibited {
                    return Err(DomainError::InvalidInput(format!(
                        "service '{}' cannot be removed from this sale",
                        item.name
                    )));
                }
                self.service_items.retain(|i| i.id != id);
            }
            SaleCommand::SetRounding(settings) => {
                self.rounding = settings;
            }
            SaleCommand::ToggleDebt(id) => {
                let debt = self
                    .debts
                    .iter_mut()
                    .find(|d| d.id == id)
                    .ok_or(DomainError::NotFound)?;
                debt.selected = !debt.selected;
            }
        }
        Ok(())
    }

    fn service_mut(&mut self, id: Uuid) -> Result<&mut ServiceItem, DomainError> {
        self.service_items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(DomainError::NotFound)
    }

    pub fn selected_debt_total(&self) -> BigDecimal {
        self.debts
            .iter()
            .filter(|d| d.selected)
            .fold(BigDecimal::zero(), |acc, d| acc + &d.amount)
    }

    pub fn summary(&self) -> SaleSummary {
        summarize_sale(
            &self.insurance_items,
            &self.service_items,
            &self.rounding,
            &self.selected_debt_total(),
        )
    }
}
