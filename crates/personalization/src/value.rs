use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use monogram_core::{OptionValueId, OptionValuePersonalizationId, ProductPersonalizationId};
use monogram_products::{
    DEFAULT_LIMIT, OptionValueLookup, OptionValuePersonalization, PersonalizationCatalog,
    ProductPersonalization,
};

use crate::error::PersonalizationError;

const PERMITTED_ATTRIBUTES: [&str; 3] = ["name", "value", "option_value_id"];

/// Input fields accepted from untrusted request parameters.
pub fn permitted_attributes() -> &'static [&'static str] {
    &PERMITTED_ATTRIBUTES
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Which catalog rule prices a personalization value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingSource {
    Unlinked,
    ProductSpec(ProductPersonalizationId),
    OptionValueSpec(OptionValuePersonalizationId),
}

/// A personalization attached to a line item, e.g. `Engrave = "Happy Birthday"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationValue {
    pub name: String,
    pub value: Option<String>,
    /// Price increase captured when the value was attached.
    pub price: Option<Decimal>,
    pub currency: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub product_personalization_id: Option<ProductPersonalizationId>,
    /// Set only when the value was picked from an option list.
    pub option_value_personalization_id: Option<OptionValuePersonalizationId>,
    #[serde(skip)]
    option_value_id: Option<OptionValueId>,
}

impl PersonalizationValue {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            price: None,
            currency: String::new(),
            limit: DEFAULT_LIMIT,
            product_personalization_id: None,
            option_value_personalization_id: None,
            option_value_id: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Take the value from a selectable option instead of free text.
    ///
    /// The option's name becomes the value; an unknown option leaves the value
    /// empty so validation reports it as required. The id is remembered for the
    /// rest of this request only and is never persisted.
    pub fn set_option_value_id<L>(&mut self, option_value_id: OptionValueId, option_values: &L)
    where
        L: OptionValueLookup + ?Sized,
    {
        self.value = option_values
            .option_value_name(option_value_id)
            .map(str::to_string);
        if self.value.is_none() {
            warn!(
                personalization = %self.name,
                option_value_id = %option_value_id,
                "option value not found"
            );
        }
        self.option_value_id = Some(option_value_id);
    }

    /// Last option value id set on this instance.
    pub fn option_value_id(&self) -> Option<OptionValueId> {
        self.option_value_id
    }

    pub fn link_product_personalization(&mut self, personalization: &ProductPersonalization) {
        self.product_personalization_id = Some(personalization.id);
    }

    pub fn link_option_value_personalization(&mut self, link: &OptionValuePersonalization) {
        self.option_value_personalization_id = Some(link.id);
    }

    pub fn unlink_product_personalization(&mut self) {
        self.product_personalization_id = None;
    }

    /// Strip surrounding whitespace from the value. An absent value stays absent.
    pub fn normalize(&mut self) {
        self.value = self.value.take().map(|v| v.trim().to_string());
    }

    /// Normalize, then check the value's length against `1..=limit`.
    pub fn validate(&mut self) -> Result<(), PersonalizationError> {
        self.normalize();

        let length = self.value.as_deref().map_or(0, |v| v.chars().count());
        if length < 1 {
            Err(PersonalizationError::Required {
                name: self.name.clone(),
            })
        } else if length > self.limit {
            Err(PersonalizationError::TooLong {
                name: self.name.clone(),
                limit: self.limit,
            })
        } else {
            Ok(())
        }
    }

    pub fn is_valid(&mut self) -> bool {
        self.validate().is_ok()
    }

    pub fn has_option_value_personalizations(&self) -> bool {
        self.option_value_personalization_id.is_some()
    }

    /// The rule that prices this value. An option link wins over the plain spec.
    pub fn pricing_source(&self) -> PricingSource {
        match (
            self.option_value_personalization_id,
            self.product_personalization_id,
        ) {
            (Some(link), _) => PricingSource::OptionValueSpec(link),
            (None, Some(spec)) => PricingSource::ProductSpec(spec),
            (None, None) => PricingSource::Unlinked,
        }
    }

    /// Price increase according to the catalog as it is now, not the stored `price`.
    ///
    /// `None` when nothing is linked, when the linked rule has been removed from
    /// the catalog, or when it has no calculator.
    pub fn product_personalization_amount<C>(&self, catalog: &C) -> Option<Decimal>
    where
        C: PersonalizationCatalog + ?Sized,
    {
        match self.pricing_source() {
            PricingSource::OptionValueSpec(id) => catalog
                .option_value_personalization(id)
                .and_then(OptionValuePersonalization::increase_price),
            PricingSource::ProductSpec(id) => catalog
                .product_personalization(id)
                .and_then(ProductPersonalization::increase_price),
            PricingSource::Unlinked => None,
        }
    }

    /// Whether the captured price no longer matches the live pricing rule.
    pub fn price_has_changed<C>(&self, catalog: &C) -> bool
    where
        C: PersonalizationCatalog + ?Sized,
    {
        match (self.price, self.product_personalization_amount(catalog)) {
            (Some(price), Some(current)) => price != current,
            _ => false,
        }
    }
}
