//! Entity trait: identity that survives state changes.

/// Implemented by catalog records that are referenced by id from line items
/// (product personalizations, option-value links).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Whether `other` is the same record, regardless of its current state.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
