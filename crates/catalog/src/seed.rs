//! Default franchise catalog.

use wrapquote_core::{AggregateId, DomainResult, Money, Rate};

use crate::difficulty::{DifficultyFactor, DifficultyId};
use crate::employee::HourlyRates;
use crate::lookup::InMemoryCatalog;
use crate::material::{Material, MaterialId};

/// (name, unit, unit cost in centavos)
const MATERIALS: [(&str, &str, i64); 8] = [
    ("Alltak Premium", "m²", 2_500),
    ("Alltak Decor", "m²", 6_500),
    ("Alltak Tunning", "m²", 6_000),
    ("Imprimax Linha Gold", "m²", 6_500),
    ("Imprimax Linha Jateado", "m²", 5_500),
    ("SH Decor", "m²", 9_800),
    ("SH Decor Piso", "m²", 17_000),
    ("PPF SH", "m²", 18_000),
];

/// (level, description, multiplier in ten-thousandths)
const DIFFICULTIES: [(&str, &str, u64); 3] = [
    ("1", "Low complexity", 10_000),
    ("2", "Medium complexity", 12_000),
    ("3", "High complexity", 15_000),
];

/// Catalog every new franchise starts with.
///
/// Ids are freshly generated; look entries up by name or level. Fails if
/// `rates` or any seed entry does not validate.
pub fn default_catalog(rates: HourlyRates) -> DomainResult<InMemoryCatalog> {
    rates.validate()?;
    let mut catalog = InMemoryCatalog::new(rates);

    for (name, unit, cost) in MATERIALS {
        catalog = catalog.with_material(Material::new(
            MaterialId::new(AggregateId::new()),
            name,
            unit,
            Money::from_minor(cost),
            None,
        )?);
    }

    for (level, description, multiplier) in DIFFICULTIES {
        catalog = catalog.with_difficulty(DifficultyFactor::new(
            DifficultyId::new(AggregateId::new()),
            level,
            Rate::from_ten_thousandths(multiplier),
            Some(description.to_string()),
        )?);
    }

    Ok(catalog)
}
