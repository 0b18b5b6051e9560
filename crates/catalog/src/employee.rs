use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wrapquote_core::{DomainError, DomainResult, Money};

/// Skill level of the crew member doing the wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeLevel {
    AssistantWrapper,
    MidWrapper,
    SeniorWrapper,
}

impl EmployeeLevel {
    pub const ALL: [EmployeeLevel; 3] = [
        EmployeeLevel::AssistantWrapper,
        EmployeeLevel::MidWrapper,
        EmployeeLevel::SeniorWrapper,
    ];

    /// Stable key, as used in config files and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeLevel::AssistantWrapper => "assistant_wrapper",
            EmployeeLevel::MidWrapper => "mid_wrapper",
            EmployeeLevel::SeniorWrapper => "senior_wrapper",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            EmployeeLevel::AssistantWrapper => "Assistant Wrapper",
            EmployeeLevel::MidWrapper => "Mid-level Wrapper",
            EmployeeLevel::SeniorWrapper => "Senior Wrapper",
        }
    }
}

impl core::fmt::Display for EmployeeLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s.trim())
            .ok_or_else(|| DomainError::not_found("employee level", s))
    }
}

/// Hourly rate for each employee level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HourlyRates {
    pub assistant_wrapper: Money,
    pub mid_wrapper: Money,
    pub senior_wrapper: Money,
}

impl HourlyRates {
    pub fn rate(&self, level: EmployeeLevel) -> Money {
        match level {
            EmployeeLevel::AssistantWrapper => self.assistant_wrapper,
            EmployeeLevel::MidWrapper => self.mid_wrapper,
            EmployeeLevel::SeniorWrapper => self.senior_wrapper,
        }
    }

    /// Every level must pay something.
    pub fn validate(&self) -> DomainResult<()> {
        for level in EmployeeLevel::ALL {
            if !self.rate(level).is_positive() {
                return Err(DomainError::invalid_input(
                    format!("hourly_rates.{level}"),
                    "must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

impl Default for HourlyRates {
    fn default() -> Self {
        Self {
            assistant_wrapper: Money::from_major(20),
            mid_wrapper: Money::from_major(30),
            senior_wrapper: Money::from_major(45),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_case_keys() {
        assert_eq!("mid_wrapper".parse::<EmployeeLevel>().unwrap(), EmployeeLevel::MidWrapper);
        let err = "apprentice".parse::<EmployeeLevel>().unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "employee level", .. }));
    }

    #[test]
    fn serde_uses_the_same_keys() {
        let json = serde_json::to_string(&EmployeeLevel::SeniorWrapper).unwrap();
        assert_eq!(json, "\"senior_wrapper\"");
    }

    #[test]
    fn zero_rate_fails_validation() {
        let rates = HourlyRates {
            mid_wrapper: Money::ZERO,
            ..HourlyRates::default()
        };
        let err = rates.validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { field, .. } if field == "hourly_rates.mid_wrapper"));
    }
}
