//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Two value objects holding the same attributes are the same value. The
/// personalization comparison key is the canonical example: two line-item
/// personalizations are interchangeable exactly when their keys are equal,
/// whatever record they were loaded from.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Engraving { text: String }
///
/// impl ValueObject for Engraving {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {
    /// Value equality, spelled out for call sites that read better as a predicate.
    fn same_value_as(&self, other: &Self) -> bool {
        self == other
    }
}
