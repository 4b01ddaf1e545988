//! Equivalence of personalizations, used to decide whether cart additions merge.

use rust_decimal::Decimal;

use monogram_core::ValueObject;

use crate::value::PersonalizationValue;

/// The attributes two personalizations must share to count as the same one.
///
/// Price and currency take part: a value captured at a different price is a
/// different personalization even when name and text agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonKey {
    pub name: String,
    pub value: Option<String>,
    pub price: Option<Decimal>,
    pub currency: String,
}

impl ValueObject for ComparisonKey {}

impl PersonalizationValue {
    /// Comparison key with the value trimmed.
    pub fn comparison_key(&self) -> ComparisonKey {
        ComparisonKey {
            name: self.name.clone(),
            value: self.value.as_deref().map(|v| v.trim().to_string()),
            price: self.price,
            currency: self.currency.clone(),
        }
    }

    /// Pairwise match against a candidate. An absent candidate never matches.
    pub fn matches(&self, other: Option<&PersonalizationValue>) -> bool {
        match other {
            Some(other) => self.comparison_key().same_value_as(&other.comparison_key()),
            None => false,
        }
    }
}

/// Compares the personalizations already on a line item with a requested set.
#[derive(Debug, Clone, Copy)]
pub struct PersonalizationSetMatcher<'a> {
    existing: &'a [PersonalizationValue],
}

impl<'a> PersonalizationSetMatcher<'a> {
    pub fn new(existing: &'a [PersonalizationValue]) -> Self {
        Self { existing }
    }

    /// True when both sets have the same size and every requested value pairs
    /// off with its own distinct existing value. Order is irrelevant and two
    /// empty sets match.
    pub fn matches(&self, requested: &[PersonalizationValue]) -> bool {
        if self.existing.len() != requested.len() {
            return false;
        }

        let mut unpaired: Vec<Option<&PersonalizationValue>> =
            self.existing.iter().map(Some).collect();

        requested.iter().all(|candidate| {
            let partner = unpaired
                .iter()
                .position(|slot| matches!(slot, Some(existing) if existing.matches(Some(candidate))));
            match partner {
                Some(index) => {
                    unpaired[index] = None;
                    true
                }
                None => false,
            }
        })
    }
}

/// Shorthand for [`PersonalizationSetMatcher::matches`].
pub fn personalizations_match(
    existing: &[PersonalizationValue],
    requested: &[PersonalizationValue],
) -> bool {
    PersonalizationSetMatcher::new(existing).matches(requested)
}
