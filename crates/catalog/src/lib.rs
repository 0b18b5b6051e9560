//! Catalog reference data: materials, difficulty factors and employee levels.
//!
//! Everything here is read-only to pricing. Catalog administration (creating
//! or editing entries) happens elsewhere; this crate only defines the records,
//! the lookup contract and an in-memory implementation with the default seed.

pub mod difficulty;
pub mod employee;
pub mod lookup;
pub mod material;
pub mod seed;

pub use difficulty::{DifficultyFactor, DifficultyId};
pub use employee::{EmployeeLevel, HourlyRates};
pub use lookup::{CatalogLookup, InMemoryCatalog};
pub use material::{Material, MaterialId};
pub use seed::default_catalog;
