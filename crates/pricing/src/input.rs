use serde::{Deserialize, Serialize};

use wrapquote_catalog::{CatalogLookup, DifficultyFactor, DifficultyId, EmployeeLevel, Material, MaterialId};
use wrapquote_core::{DomainError, DomainResult, Money, Quantity, Rate, TenantId};

/// Raw, user-entered parameters of one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub material_id: MaterialId,
    pub difficulty_id: DifficultyId,
    pub employee_level: EmployeeLevel,
    pub quantity: Quantity,
    pub estimated_days: Quantity,
    pub crew_size: u32,
}

impl LineItemInput {
    /// Rejects non-positive quantity, days or crew before anything is looked up.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity.is_zero() {
            return Err(DomainError::invalid_input("quantity", "must be greater than zero"));
        }
        if self.estimated_days.is_zero() {
            return Err(DomainError::invalid_input(
                "estimated_days",
                "must be greater than zero",
            ));
        }
        if self.crew_size == 0 {
            return Err(DomainError::invalid_input("crew_size", "must be at least 1"));
        }
        Ok(())
    }
}

/// Catalog values an item was priced with.
///
/// Catalog entries are immutable, so an item keeps these and can be repriced
/// later without another lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRates {
    pub unit_cost: Money,
    pub labor_multiplier: Rate,
    pub hourly_rate: Money,
}

impl ResolvedRates {
    pub fn from_entries(material: &Material, difficulty: &DifficultyFactor, hourly_rate: Money) -> Self {
        Self {
            unit_cost: material.unit_cost(),
            labor_multiplier: difficulty.labor_multiplier(),
            hourly_rate,
        }
    }

    pub fn resolve<C>(catalog: &C, tenant_id: TenantId, input: &LineItemInput) -> DomainResult<Self>
    where
        C: CatalogLookup + ?Sized,
    {
        let material = catalog.material(tenant_id, input.material_id)?;
        let difficulty = catalog.difficulty_factor(tenant_id, input.difficulty_id)?;
        let hourly_rate = catalog.hourly_rate(tenant_id, input.employee_level);
        Ok(Self::from_entries(&material, &difficulty, hourly_rate))
    }
}
