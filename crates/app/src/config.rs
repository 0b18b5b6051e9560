//! Application configuration.
//!
//! ```toml
//! [pricing]
//! hours_per_day = "8"
//! tax_rate = "0.0"
//! margin_rate = "0.30"
//!
//! # centavos
//! [hourly_rates]
//! assistant_wrapper = 2000
//! mid_wrapper = 3000
//! senior_wrapper = 4500
//!
//! [tenants."0190f2a4-6a0b-7c3e-9d51-3b7e2f0c1a11"]
//! margin_rate = "0.35"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wrapquote_catalog::HourlyRates;
use wrapquote_core::{Quantity, Rate, TenantId};
use wrapquote_pricing::PricingConfig;

/// Environment variable naming the TOML file to load.
pub const CONFIG_ENV: &str = "WRAPQUOTE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Pricing every tenant starts from.
    pub pricing: PricingConfig,
    pub hourly_rates: HourlyRates,
    /// Per-tenant overrides keyed by tenant UUID.
    pub tenants: BTreeMap<String, TenantPricing>,
}

/// Fields a tenant may override; anything left out falls back to `[pricing]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantPricing {
    pub hours_per_day: Option<Quantity>,
    pub tax_rate: Option<Rate>,
    pub margin_rate: Option<Rate>,
}

impl TenantPricing {
    fn apply(&self, base: PricingConfig) -> PricingConfig {
        PricingConfig {
            hours_per_day: self.hours_per_day.unwrap_or(base.hours_per_day),
            tax_rate: self.tax_rate.unwrap_or(base.tax_rate),
            margin_rate: self.margin_rate.unwrap_or(base.margin_rate),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("invalid configuration TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in config file {}", path.display()))
    }

    /// Load from `WRAPQUOTE_CONFIG` if set, otherwise use the defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                tracing::info!(path = ?path, "loading configuration");
                Self::load(Path::new(&path))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.pricing.validate().context("[pricing]")?;
        self.hourly_rates.validate().context("[hourly_rates]")?;

        for (key, overrides) in &self.tenants {
            key.parse::<TenantId>()
                .with_context(|| format!("[tenants] key `{key}` is not a tenant id"))?;
            overrides
                .apply(self.pricing)
                .validate()
                .with_context(|| format!("[tenants.\"{key}\"]"))?;
        }
        Ok(())
    }

    /// Effective pricing for `tenant_id`.
    pub fn pricing_for(&self, tenant_id: TenantId) -> PricingConfig {
        match self.tenants.get(&tenant_id.to_string()) {
            Some(overrides) => overrides.apply(self.pricing),
            None => self.pricing,
        }
    }
}
