//! Personalizations a product accepts, and their pricing rules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use monogram_core::{
    Entity, OptionValueId, OptionValuePersonalizationId, ProductPersonalizationId,
};

use crate::calculator::{Calculator, PriceCalculator};

/// Maximum value length when none is configured.
pub const DEFAULT_LIMIT: usize = 255;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// How shoppers provide a personalization value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalizationKind {
    /// Free text (engraving, monogram initials, ...).
    #[default]
    Text,
    /// Picked from a list of option values.
    Options,
}

/// A personalization a product accepts, e.g. `Engrave` with a 20 character limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPersonalization {
    pub id: ProductPersonalizationId,
    /// Unique per product.
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub kind: PersonalizationKind,
    #[serde(default)]
    pub calculator: Option<Calculator>,
    #[serde(default)]
    pub option_value_personalizations: Vec<OptionValuePersonalization>,
}

impl ProductPersonalization {
    /// Free-text personalization with default limit and no price increase.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            id: ProductPersonalizationId::new(),
            name: name.into(),
            required: false,
            limit: DEFAULT_LIMIT,
            kind: PersonalizationKind::Text,
            calculator: None,
            option_value_personalizations: Vec::new(),
        }
    }

    /// Option-list personalization; add choices with [`Self::with_option_value`].
    pub fn options(name: impl Into<String>) -> Self {
        Self {
            kind: PersonalizationKind::Options,
            ..Self::text(name)
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_calculator(mut self, calculator: Calculator) -> Self {
        self.calculator = Some(calculator);
        self
    }

    pub fn with_option_value(mut self, link: OptionValuePersonalization) -> Self {
        self.option_value_personalizations.push(link);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_options(&self) -> bool {
        self.kind == PersonalizationKind::Options
    }

    /// Current price increase from this personalization's own calculator.
    pub fn increase_price(&self) -> Option<Decimal> {
        self.calculator.as_ref().and_then(PriceCalculator::compute)
    }

    /// The link priced for `option_value_id`, if this personalization offers it.
    pub fn option_value_personalization_for(
        &self,
        option_value_id: OptionValueId,
    ) -> Option<&OptionValuePersonalization> {
        self.option_value_personalizations
            .iter()
            .find(|link| link.option_value_id == option_value_id)
    }
}

impl Entity for ProductPersonalization {
    type Id = ProductPersonalizationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Prices one selectable option of an options-kind personalization independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValuePersonalization {
    pub id: OptionValuePersonalizationId,
    pub option_value_id: OptionValueId,
    #[serde(default)]
    pub calculator: Option<Calculator>,
}

impl OptionValuePersonalization {
    pub fn new(option_value_id: OptionValueId) -> Self {
        Self {
            id: OptionValuePersonalizationId::new(),
            option_value_id,
            calculator: None,
        }
    }

    pub fn with_calculator(mut self, calculator: Calculator) -> Self {
        self.calculator = Some(calculator);
        self
    }

    pub fn increase_price(&self) -> Option<Decimal> {
        self.calculator.as_ref().and_then(PriceCalculator::compute)
    }
}

impl Entity for OptionValuePersonalization {
    type Id = OptionValuePersonalizationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Live lookup of personalization pricing rules by identity.
///
/// Line items keep ids, not copies, so repricing checks always see the rules as
/// they are now.
pub trait PersonalizationCatalog {
    fn product_personalization(
        &self,
        id: ProductPersonalizationId,
    ) -> Option<&ProductPersonalization>;

    fn option_value_personalization(
        &self,
        id: OptionValuePersonalizationId,
    ) -> Option<&OptionValuePersonalization>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_personalization_defaults() {
        let engrave = ProductPersonalization::text("Engrave");
        assert_eq!(engrave.limit, 255);
        assert_eq!(engrave.kind, PersonalizationKind::Text);
        assert!(!engrave.required);
        assert_eq!(engrave.increase_price(), None);
    }

    #[test]
    fn increase_price_delegates_to_calculator() {
        let engrave = ProductPersonalization::text("Engrave")
            .with_calculator(Calculator::flat_rate(Decimal::new(1000, 2)));
        assert_eq!(engrave.increase_price(), Some(Decimal::new(10, 0)));
    }

    #[test]
    fn option_links_are_found_by_option_value() {
        let red = OptionValueId::new();
        let blue = OptionValueId::new();
        let color = ProductPersonalization::options("Color")
            .with_option_value(
                OptionValuePersonalization::new(red)
                    .with_calculator(Calculator::flat_rate(Decimal::new(9239, 2))),
            )
            .with_option_value(OptionValuePersonalization::new(blue));

        let link = color.option_value_personalization_for(red).unwrap();
        assert_eq!(link.increase_price(), Some(Decimal::new(9239, 2)));
        assert_eq!(
            color
                .option_value_personalization_for(blue)
                .and_then(OptionValuePersonalization::increase_price),
            None
        );
        assert!(color.option_value_personalization_for(OptionValueId::new()).is_none());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let id = ProductPersonalizationId::new();
        let json = serde_json::json!({ "id": id, "name": "Engrave" });
        let parsed: ProductPersonalization = serde_json::from_value(json).unwrap();

        assert_eq!(parsed.limit, DEFAULT_LIMIT);
        assert_eq!(parsed.kind, PersonalizationKind::Text);
        assert!(parsed.option_value_personalizations.is_empty());
    }
}
