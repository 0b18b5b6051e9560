use serde::{Deserialize, Serialize};

use wrapquote_core::{AggregateId, DomainError, DomainResult, Entity, Money};

/// Material identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub AggregateId);

impl MaterialId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A wrapping material sold by unit of measure (m², m, un, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    id: MaterialId,
    name: String,
    unit: String,
    unit_cost: Money,
    description: Option<String>,
}

impl Material {
    pub fn new(
        id: MaterialId,
        name: impl Into<String>,
        unit: impl Into<String>,
        unit_cost: Money,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let unit = unit.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("name", "must not be blank"));
        }
        if unit.trim().is_empty() {
            return Err(DomainError::invalid_input("unit", "must not be blank"));
        }
        if !unit_cost.is_positive() {
            return Err(DomainError::invalid_input("unit_cost", "must be greater than zero"));
        }

        Ok(Self {
            id,
            name,
            unit,
            unit_cost,
            description,
        })
    }

    pub fn id_typed(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_cost(&self) -> Money {
        self.unit_cost
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
