//! Records with a stable identity.

/// A record that is looked up and replaced by id.
///
/// Catalog entries, clients and line items are entities: two values with the
/// same id describe the same record even when a field differs.
pub trait Entity {
    type Id: Copy + Eq + Ord + core::fmt::Display;

    fn id(&self) -> Self::Id;

    /// True when both values describe the same record.
    fn same_record(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
