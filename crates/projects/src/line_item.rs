use serde::{Deserialize, Serialize};

use wrapquote_core::{AggregateId, DomainResult, Entity, Money};
use wrapquote_pricing::{price, CostBreakdown, LineItemInput, PricingConfig, ResolvedRates};

use crate::project::ProjectId;

/// Line item identifier (unique within its project).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub AggregateId);

impl LineItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One priced unit of work (one material + labor combination) in a project.
///
/// Cost fields are derived from `input`, `rates` and `pricing`; they are only
/// ever written by [`LineItem::repriced`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    project_id: ProjectId,
    input: LineItemInput,
    rates: ResolvedRates,
    pricing: PricingConfig,
    notes: Option<String>,
    costs: CostBreakdown,
    priced: bool,
}

impl LineItem {
    /// A new item with zero costs; call [`LineItem::repriced`] before use.
    pub fn new(
        id: LineItemId,
        project_id: ProjectId,
        input: LineItemInput,
        rates: ResolvedRates,
        pricing: PricingConfig,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            project_id,
            input,
            rates,
            pricing,
            notes: notes.filter(|n| !n.trim().is_empty()),
            costs: CostBreakdown::unpriced(),
            priced: false,
        }
    }

    /// Recompute every cost field from the item's own inputs and pricing context.
    pub fn repriced(&self) -> DomainResult<Self> {
        let costs = price(&self.input, &self.rates, &self.pricing)?;
        Ok(Self {
            costs,
            priced: true,
            ..self.clone()
        })
    }

    pub fn id_typed(&self) -> LineItemId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn input(&self) -> &LineItemInput {
        &self.input
    }

    pub fn rates(&self) -> &ResolvedRates {
        &self.rates
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn costs(&self) -> &CostBreakdown {
        &self.costs
    }

    pub fn is_priced(&self) -> bool {
        self.priced
    }

    pub fn material_cost(&self) -> Money {
        self.costs.material_cost
    }

    pub fn labor_cost(&self) -> Money {
        self.costs.labor_cost
    }

    pub fn total_cost(&self) -> Money {
        self.costs.total_cost
    }

    pub fn selling_price(&self) -> Money {
        self.costs.selling_price
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
