use serde::{Deserialize, Serialize};

use wrapquote_core::{AggregateId, DomainError, DomainResult, Entity, Rate};

/// Difficulty factor identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyId(pub AggregateId);

impl DifficultyId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DifficultyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Task complexity level and the multiplier it applies to labor cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyFactor {
    id: DifficultyId,
    level_name: String,
    labor_multiplier: Rate,
    description: Option<String>,
}

impl DifficultyFactor {
    pub fn new(
        id: DifficultyId,
        level_name: impl Into<String>,
        labor_multiplier: Rate,
        description: Option<String>,
    ) -> DomainResult<Self> {
        let level_name = level_name.into();
        if level_name.trim().is_empty() {
            return Err(DomainError::invalid_input("level_name", "must not be blank"));
        }
        if labor_multiplier.is_zero() {
            return Err(DomainError::invalid_input(
                "labor_multiplier",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            id,
            level_name,
            labor_multiplier,
            description,
        })
    }

    pub fn id_typed(&self) -> DifficultyId {
        self.id
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    pub fn labor_multiplier(&self) -> Rate {
        self.labor_multiplier
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Entity for DifficultyFactor {
    type Id = DifficultyId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
