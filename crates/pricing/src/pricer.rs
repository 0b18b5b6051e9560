//! Cost breakdown computation.
//!
//! All intermediate values are exact `i128` numerators; each published amount
//! is rounded half-to-even to centavos exactly once:
//!
//! ```text
//! material = quantity * unit_cost
//! labor    = hourly_rate * hours_per_day * days * crew * multiplier
//! subtotal = material + labor
//! total    = subtotal * (1 + tax_rate)
//! selling  = total * (1 + margin_rate)
//! ```

use serde::{Deserialize, Serialize};

use wrapquote_catalog::CatalogLookup;
use wrapquote_core::money::{QUANTITY_SCALE, RATE_SCALE};
use wrapquote_core::{DomainError, DomainResult, Money, Rate, TenantId, ValueObject};

use crate::config::PricingConfig;
use crate::input::{LineItemInput, ResolvedRates};

/// Priced result of one line item, in centavos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub material_cost: Money,
    pub labor_cost: Money,
    /// Material + labor, before tax.
    pub subtotal: Money,
    pub total_cost: Money,
    pub selling_price: Money,
    pub tax_rate: Rate,
    pub margin_rate: Rate,
}

impl CostBreakdown {
    /// Breakdown of an item that has not been priced yet.
    pub fn unpriced() -> Self {
        Self::default()
    }
}

impl ValueObject for CostBreakdown {}

/// Resolved catalog values together with the breakdown computed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLineItem {
    pub rates: ResolvedRates,
    pub costs: CostBreakdown,
}

/// Scale of material numerators: centavos * quantity hundredths.
const MATERIAL_SCALE: i128 = QUANTITY_SCALE;
/// Scale of labor numerators: hours and days in hundredths, multiplier in ten-thousandths.
const LABOR_SCALE: i128 = QUANTITY_SCALE * QUANTITY_SCALE * RATE_SCALE;

/// Price one line item from already-resolved catalog values.
pub fn price(
    input: &LineItemInput,
    rates: &ResolvedRates,
    config: &PricingConfig,
) -> DomainResult<CostBreakdown> {
    input.validate()?;
    config.validate()?;

    let material = mul(rates.unit_cost.minor() as i128, input.quantity.hundredths() as i128)?;

    let labor = [
        input.estimated_days.hundredths() as i128,
        input.crew_size as i128,
        rates.labor_multiplier.ten_thousandths() as i128,
    ]
    .into_iter()
    .try_fold(
        mul(rates.hourly_rate.minor() as i128, config.hours_per_day.hundredths() as i128)?,
        mul,
    )?;

    let subtotal = mul(material, LABOR_SCALE / MATERIAL_SCALE)?
        .checked_add(labor)
        .ok_or_else(out_of_range)?;
    let total = mul(subtotal, RATE_SCALE + config.tax_rate.ten_thousandths() as i128)?;
    let selling = mul(total, RATE_SCALE + config.margin_rate.ten_thousandths() as i128)?;

    Ok(CostBreakdown {
        material_cost: round(material, MATERIAL_SCALE)?,
        labor_cost: round(labor, LABOR_SCALE)?,
        subtotal: round(subtotal, LABOR_SCALE)?,
        total_cost: round(total, LABOR_SCALE * RATE_SCALE)?,
        selling_price: round(selling, LABOR_SCALE * RATE_SCALE * RATE_SCALE)?,
        tax_rate: config.tax_rate,
        margin_rate: config.margin_rate,
    })
}

/// Validate, resolve against the catalog and price in one step.
///
/// Input problems surface as `InvalidInput` before any lookup; unknown
/// catalog ids surface as `NotFound`.
pub fn price_line_item<C>(
    catalog: &C,
    tenant_id: TenantId,
    input: &LineItemInput,
    config: &PricingConfig,
) -> DomainResult<PricedLineItem>
where
    C: CatalogLookup + ?Sized,
{
    input.validate()?;
    config.validate()?;
    let rates = ResolvedRates::resolve(catalog, tenant_id, input)?;
    let costs = price(input, &rates, config)?;
    Ok(PricedLineItem { rates, costs })
}

fn mul(a: i128, b: i128) -> DomainResult<i128> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

fn round(numerator: i128, scale: i128) -> DomainResult<Money> {
    Money::from_scaled(numerator, scale).ok_or_else(out_of_range)
}

fn out_of_range() -> DomainError {
    DomainError::invalid_input("amount", "result is out of range")
}
