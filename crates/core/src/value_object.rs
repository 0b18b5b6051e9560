//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one. `Money`, `Rate` and `Quantity` are value
/// objects; so is a priced cost breakdown.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
