//! Read-only catalog lookup contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use wrapquote_core::{DomainError, DomainResult, Entity, Money, TenantId};

use crate::difficulty::{DifficultyFactor, DifficultyId};
use crate::employee::{EmployeeLevel, HourlyRates};
use crate::material::{Material, MaterialId};

/// Synchronous, tenant-scoped catalog resolution.
///
/// Unknown ids fail with `DomainError::NotFound`. Employee levels are a closed
/// set, so their hourly rate always resolves.
pub trait CatalogLookup: Send + Sync {
    fn material(&self, tenant_id: TenantId, id: MaterialId) -> DomainResult<Material>;
    fn difficulty_factor(&self, tenant_id: TenantId, id: DifficultyId) -> DomainResult<DifficultyFactor>;
    fn hourly_rate(&self, tenant_id: TenantId, level: EmployeeLevel) -> Money;
    fn list_materials(&self, tenant_id: TenantId) -> Vec<Material>;
    fn list_difficulty_factors(&self, tenant_id: TenantId) -> Vec<DifficultyFactor>;
}

impl<C> CatalogLookup for Arc<C>
where
    C: CatalogLookup + ?Sized,
{
    fn material(&self, tenant_id: TenantId, id: MaterialId) -> DomainResult<Material> {
        (**self).material(tenant_id, id)
    }

    fn difficulty_factor(&self, tenant_id: TenantId, id: DifficultyId) -> DomainResult<DifficultyFactor> {
        (**self).difficulty_factor(tenant_id, id)
    }

    fn hourly_rate(&self, tenant_id: TenantId, level: EmployeeLevel) -> Money {
        (**self).hourly_rate(tenant_id, level)
    }

    fn list_materials(&self, tenant_id: TenantId) -> Vec<Material> {
        (**self).list_materials(tenant_id)
    }

    fn list_difficulty_factors(&self, tenant_id: TenantId) -> Vec<DifficultyFactor> {
        (**self).list_difficulty_factors(tenant_id)
    }
}

/// In-memory catalog shared by every tenant of the franchise network.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    materials: BTreeMap<MaterialId, Material>,
    difficulties: BTreeMap<DifficultyId, DifficultyFactor>,
    rates: HourlyRates,
}

impl InMemoryCatalog {
    pub fn new(rates: HourlyRates) -> Self {
        Self {
            materials: BTreeMap::new(),
            difficulties: BTreeMap::new(),
            rates,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.insert(material.id(), material);
        self
    }

    pub fn with_difficulty(mut self, factor: DifficultyFactor) -> Self {
        self.difficulties.insert(factor.id(), factor);
        self
    }

    pub fn with_rates(mut self, rates: HourlyRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn rates(&self) -> &HourlyRates {
        &self.rates
    }

    pub fn material_by_name(&self, name: &str) -> Option<&Material> {
        self.materials.values().find(|m| m.name() == name)
    }

    pub fn difficulty_by_level(&self, level_name: &str) -> Option<&DifficultyFactor> {
        self.difficulties.values().find(|d| d.level_name() == level_name)
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn material(&self, _tenant_id: TenantId, id: MaterialId) -> DomainResult<Material> {
        self.materials
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("material", id))
    }

    fn difficulty_factor(&self, _tenant_id: TenantId, id: DifficultyId) -> DomainResult<DifficultyFactor> {
        self.difficulties
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("difficulty factor", id))
    }

    fn hourly_rate(&self, _tenant_id: TenantId, level: EmployeeLevel) -> Money {
        self.rates.rate(level)
    }

    fn list_materials(&self, _tenant_id: TenantId) -> Vec<Material> {
        self.materials.values().cloned().collect()
    }

    fn list_difficulty_factors(&self, _tenant_id: TenantId) -> Vec<DifficultyFactor> {
        self.difficulties.values().cloned().collect()
    }
}
