//! Price-increase calculators for personalizations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Computes the price increase a personalization adds to a line item.
///
/// Callers treat this as opaque: `None` means "no increase defined", never an error.
pub trait PriceCalculator {
    fn compute(&self) -> Option<Decimal>;
}

/// Calculators that can be stored on catalog records and replayed from events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Calculator {
    /// The same amount regardless of the value entered.
    FlatRate { amount: Decimal },
}

impl Calculator {
    pub fn flat_rate(amount: Decimal) -> Self {
        Self::FlatRate { amount }
    }
}

impl PriceCalculator for Calculator {
    fn compute(&self) -> Option<Decimal> {
        match self {
            Calculator::FlatRate { amount } => Some(*amount),
        }
    }
}
