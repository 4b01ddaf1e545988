//! Builds priced, validated personalization values from requests for one product.

use tracing::{debug, warn};

use monogram_core::OptionValueId;
use monogram_products::{OptionValueLookup, Product, ProductPersonalization};

use crate::config::PersonalizationConfig;
use crate::error::PersonalizationError;
use crate::request::PersonalizationRequest;
use crate::value::PersonalizationValue;

/// Turns requests into normalized, priced and validated personalization values
/// for one product.
pub struct PersonalizationBuilder<'a, L: ?Sized> {
    option_values: &'a L,
    config: &'a PersonalizationConfig,
    currency: Option<&'a str>,
}

impl<'a, L> PersonalizationBuilder<'a, L>
where
    L: OptionValueLookup + ?Sized,
{
    pub fn new(option_values: &'a L, config: &'a PersonalizationConfig) -> Self {
        Self {
            option_values,
            config,
            currency: None,
        }
    }

    /// Currency of the order the values are for. Defaults to the configured one.
    pub fn currency(mut self, currency: &'a str) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Build one value per request the product offers.
    ///
    /// Requests for personalizations the product does not have are dropped (or
    /// rejected in strict mode). Fails on the first invalid value, or when a
    /// required personalization was not requested.
    pub fn build(
        &self,
        product: &Product,
        requests: &[PersonalizationRequest],
    ) -> Result<Vec<PersonalizationValue>, PersonalizationError> {
        let mut values = Vec::with_capacity(requests.len());

        for request in requests {
            let name = request.name.trim();
            let Some(spec) = product.personalization_named(name) else {
                if self.config.strict_names {
                    return Err(PersonalizationError::UnknownPersonalization {
                        name: name.to_string(),
                    });
                }
                debug!(
                    product_id = %product.id_typed(),
                    personalization = name,
                    "dropping personalization the product does not offer"
                );
                continue;
            };
            values.push(self.build_value(product, spec, request)?);
        }

        if let Some(missing) = product
            .personalizations()
            .iter()
            .filter(|spec| spec.required)
            .find(|spec| !values.iter().any(|v| v.name == spec.name))
        {
            return Err(PersonalizationError::Required {
                name: missing.name.clone(),
            });
        }

        Ok(values)
    }

    fn build_value(
        &self,
        product: &Product,
        spec: &ProductPersonalization,
        request: &PersonalizationRequest,
    ) -> Result<PersonalizationValue, PersonalizationError> {
        let currency = self.currency.unwrap_or(self.config.currency.as_str());
        let mut value = PersonalizationValue::new(spec.name.clone(), request.value.clone())
            .with_limit(spec.limit)
            .with_currency(currency);
        value.link_product_personalization(spec);

        if let Some(raw) = request.option_value_id.as_deref() {
            match raw.parse::<OptionValueId>() {
                Ok(option_value_id) => {
                    value.set_option_value_id(option_value_id, self.option_values);
                    if let Some(link) = spec.option_value_personalization_for(option_value_id) {
                        value.link_option_value_personalization(link);
                    }
                }
                Err(err) => {
                    warn!(personalization = %spec.name, error = %err, "unreadable option value id");
                    value.value = None;
                }
            }
        }

        value.price = value.product_personalization_amount(product);
        value.validate()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use monogram_core::{Aggregate, AggregateId, TenantId};
    use monogram_products::{
        AddPersonalization, Calculator, CreateProduct, InMemoryOptionValues, OptionValue,
        OptionValuePersonalization, PricingMetadata, ProductCommand, ProductId,
    };
    use rust_decimal::Decimal;

    struct Fixture {
        product: Product,
        option_values: InMemoryOptionValues,
        red: OptionValue,
        config: PersonalizationConfig,
    }

    fn product_with(personalizations: Vec<ProductPersonalization>) -> Product {
        let tenant_id = TenantId::new();
        let product_id = ProductId::new(AggregateId::new());
        let mut product = Product::empty(product_id);
        product
            .execute(&ProductCommand::CreateProduct(CreateProduct {
                tenant_id,
                product_id,
                sku: "PEN-001".to_string(),
                name: "Fountain Pen".to_string(),
                pricing: Some(PricingMetadata {
                    base_price: Some(Decimal::new(15, 0)),
                    currency: Some("USD".to_string()),
                }),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for personalization in personalizations {
            product
                .execute(&ProductCommand::AddPersonalization(AddPersonalization {
                    tenant_id,
                    product_id,
                    personalization,
                    occurred_at: Utc::now(),
                }))
                .unwrap();
        }
        product
    }

    fn fixture() -> Fixture {
        let red = OptionValue::new(OptionValueId::new(), "Red");
        let option_values: InMemoryOptionValues = [red.clone()].into_iter().collect();
        let product = product_with(vec![
            ProductPersonalization::text("Engrave")
                .with_limit(20)
                .with_calculator(Calculator::flat_rate(Decimal::new(500, 2))),
            ProductPersonalization::options("Color").with_option_value(
                OptionValuePersonalization::new(red.id)
                    .with_calculator(Calculator::flat_rate(Decimal::new(250, 2))),
            ),
        ]);
        Fixture {
            product,
            option_values,
            red,
            config: PersonalizationConfig::default(),
        }
    }

    #[test]
    fn builds_priced_text_value() {
        let f = fixture();
        let builder = PersonalizationBuilder::new(&f.option_values, &f.config);

        let values = builder
            .build(&f.product, &[PersonalizationRequest::text("Engrave", "  Happy Birthday ")])
            .unwrap();

        let engrave = &values[0];
        assert_eq!(engrave.value.as_deref(), Some("Happy Birthday"));
        assert_eq!(engrave.price, Some(Decimal::new(500, 2)));
        assert_eq!(engrave.currency, "USD");
        assert_eq!(engrave.limit, 20);
        assert_eq!(
            engrave.product_personalization_id,
            Some(f.product.personalization_named("Engrave").unwrap().id)
        );
        assert!(!engrave.has_option_value_personalizations());
    }

    #[test]
    fn builds_option_value_priced_by_its_link() {
        let f = fixture();
        let builder = PersonalizationBuilder::new(&f.option_values, &f.config).currency("EUR");

        let mut request = PersonalizationRequest::option("Color", f.red.id);
        request.value = Some("hi".to_string());
        let values = builder.build(&f.product, &[request]).unwrap();

        let color = &values[0];
        assert_eq!(color.value.as_deref(), Some("Red"));
        assert_eq!(color.option_value_id(), Some(f.red.id));
        assert!(color.has_option_value_personalizations());
        assert_eq!(color.price, Some(Decimal::new(250, 2)));
        assert_eq!(color.currency, "EUR");
    }

    #[test]
    fn unknown_option_value_is_reported_as_required() {
        let f = fixture();
        let builder = PersonalizationBuilder::new(&f.option_values, &f.config);

        for raw in [OptionValueId::new().to_string(), "garbage".to_string()] {
            let request = PersonalizationRequest {
                name: "Color".to_string(),
                value: Some("Red".to_string()),
                option_value_id: Some(raw),
            };
            let err = builder.build(&f.product, &[request]).unwrap_err();
            assert_eq!(
                err,
                PersonalizationError::Required {
                    name: "Color".to_string()
                }
            );
        }
    }

    #[test]
    fn too_long_value_fails_the_build() {
        let f = fixture();
        let builder = PersonalizationBuilder::new(&f.option_values, &f.config);

        let err = builder
            .build(
                &f.product,
                &[PersonalizationRequest::text("Engrave", "x".repeat(21))],
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Engrave is too long (maximum is 20 characters)"
        );
    }

    #[test]
    fn personalizations_the_product_lacks_are_dropped() {
        let f = fixture();
        let builder = PersonalizationBuilder::new(&f.option_values, &f.config);

        let values = builder
            .build(&f.product, &[PersonalizationRequest::text("Gift Wrap", "yes")])
            .unwrap();
        assert!(values.is_empty());

        let plain = product_with(vec![]);
        let values = builder
            .build(&plain, &[PersonalizationRequest::text("Engrave", "Hi")])
            .unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn strict_names_rejects_unknown_personalizations() {
        let f = fixture();
        let config = PersonalizationConfig {
            strict_names: true,
            ..PersonalizationConfig::default()
        };
        let builder = PersonalizationBuilder::new(&f.option_values, &config);

        let err = builder
            .build(&f.product, &[PersonalizationRequest::text("Gift Wrap", "yes")])
            .unwrap_err();
        assert_eq!(
            err,
            PersonalizationError::UnknownPersonalization {
                name: "Gift Wrap".to_string()
            }
        );
    }

    #[test]
    fn required_personalization_must_be_requested() {
        let option_values = InMemoryOptionValues::new();
        let config = PersonalizationConfig::default();
        let product = product_with(vec![
            ProductPersonalization::text("Initials").required(),
            ProductPersonalization::text("Engrave"),
        ]);
        let builder = PersonalizationBuilder::new(&option_values, &config);

        let err = builder
            .build(&product, &[PersonalizationRequest::text("Engrave", "Hi")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Initials is required");

        let values = builder
            .build(
                &product,
                &[
                    PersonalizationRequest::text("Engrave", "Hi"),
                    PersonalizationRequest::text("Initials", "AB"),
                ],
            )
            .unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn unpriced_personalization_has_no_price() {
        let option_values = InMemoryOptionValues::new();
        let config = PersonalizationConfig::default();
        let product = product_with(vec![ProductPersonalization::text("Engrave")]);
        let builder = PersonalizationBuilder::new(&option_values, &config);

        let values = builder
            .build(&product, &[PersonalizationRequest::text("Engrave", "Hi")])
            .unwrap();
        assert_eq!(values[0].price, None);
    }
}
