use serde::{Deserialize, Serialize};

use wrapquote_core::{DomainError, DomainResult, Quantity, Rate};

/// Tenant- or project-scoped pricing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Billable hours in one crew day.
    pub hours_per_day: Quantity,
    /// Applied on top of material + labor.
    pub tax_rate: Rate,
    /// Markup applied on the taxed total to get the selling price.
    pub margin_rate: Rate,
}

impl PricingConfig {
    pub const DEFAULT_HOURS_PER_DAY: Quantity = Quantity::whole(8);
    pub const DEFAULT_TAX_RATE: Rate = Rate::ZERO;
    pub const DEFAULT_MARGIN_RATE: Rate = Rate::from_percent(30);

    pub fn with_margin(self, margin_rate: Rate) -> Self {
        Self { margin_rate, ..self }
    }

    pub fn with_tax(self, tax_rate: Rate) -> Self {
        Self { tax_rate, ..self }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.hours_per_day.is_zero() {
            return Err(DomainError::invalid_input(
                "hours_per_day",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            hours_per_day: Self::DEFAULT_HOURS_PER_DAY,
            tax_rate: Self::DEFAULT_TAX_RATE,
            margin_rate: Self::DEFAULT_MARGIN_RATE,
        }
    }
}
