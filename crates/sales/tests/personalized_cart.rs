use chrono::Utc;
use monogram_core::{Aggregate, AggregateId, AggregateRoot, OptionValueId, TenantId};
use monogram_personalization::PersonalizationConfig;
use monogram_products::{
    AddPersonalization, Calculator, ChangePersonalizationCalculator, CreateProduct,
    InMemoryOptionValues, OptionValue, OptionValuePersonalization, PricingMetadata, Product,
    ProductCommand, ProductId, ProductPersonalization,
};
use monogram_sales::{CreateSalesOrder, OrderContents, SalesOrder, SalesOrderCommand, SalesOrderId};
use rust_decimal::Decimal;
use serde_json::json;

struct Shop {
    tenant_id: TenantId,
    red: OptionValue,
    option_values: InMemoryOptionValues,
    config: PersonalizationConfig,
}

impl Shop {
    fn new() -> Self {
        monogram_observability::init();

        let red = OptionValue::new(OptionValueId::new(), "Red");
        let option_values: InMemoryOptionValues = [red.clone()].into_iter().collect();
        Self {
            tenant_id: TenantId::new(),
            red,
            option_values,
            config: PersonalizationConfig::default(),
        }
    }

    fn order(&self) -> SalesOrder {
        let order_id = SalesOrderId::new(AggregateId::new());
        let mut order = SalesOrder::empty(order_id);
        order
            .execute(&SalesOrderCommand::CreateSalesOrder(CreateSalesOrder {
                tenant_id: self.tenant_id,
                order_id,
                currency: "USD".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        order
    }

    fn product(&self, personalizations: Vec<ProductPersonalization>) -> Product {
        let product_id = ProductId::new(AggregateId::new());
        let mut product = Product::empty(product_id);
        product
            .execute(&ProductCommand::CreateProduct(CreateProduct {
                tenant_id: self.tenant_id,
                product_id,
                sku: "MUG-001".to_string(),
                name: "Mug".to_string(),
                pricing: Some(PricingMetadata {
                    base_price: Some(Decimal::new(1999, 2)),
                    currency: Some("USD".to_string()),
                }),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for personalization in personalizations {
            product
                .execute(&ProductCommand::AddPersonalization(AddPersonalization {
                    tenant_id: self.tenant_id,
                    product_id,
                    personalization,
                    occurred_at: Utc::now(),
                }))
                .unwrap();
        }
        product
    }

    fn personalized_product(&self) -> Product {
        self.product(vec![
            ProductPersonalization::text("Engrave")
                .with_calculator(Calculator::flat_rate(Decimal::new(500, 2))),
            ProductPersonalization::text("Initials").with_limit(3),
            ProductPersonalization::options("Color").with_option_value(
                OptionValuePersonalization::new(self.red.id)
                    .with_calculator(Calculator::flat_rate(Decimal::new(250, 2))),
            ),
        ])
    }
}

#[test]
fn same_personalizations_merge_into_one_line() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let params = json!([{ "name": "Engrave", "value": "Happy Birthday" }]);
    contents.add(&product, 2, Some(&params)).unwrap();
    let line = contents.add(&product, 2, Some(&params)).unwrap();

    assert_eq!(contents.order().lines().len(), 1);
    assert_eq!(line.quantity, 4);
    assert_eq!(line.personalizations[0].price, Some(Decimal::new(500, 2)));
    assert_eq!(line.amount(), Some(Decimal::new(9996, 2)));
}

#[test]
fn different_value_starts_a_new_line() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    contents
        .add(&product, 2, Some(&json!([{ "name": "Engrave", "value": "Hi" }])))
        .unwrap();
    contents
        .add(&product, 2, Some(&json!([{ "name": "Engrave", "value": "Hello" }])))
        .unwrap();

    let lines = contents.order().lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.quantity == 2));
}

#[test]
fn subset_and_superset_do_not_match() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let both = json!([
        { "name": "Engrave", "value": "Hi" },
        { "name": "Initials", "value": "AB" }
    ]);
    let one = json!([{ "name": "Engrave", "value": "Hi" }]);

    let line = contents.add(&product, 1, Some(&both)).unwrap();
    assert!(!contents.personalizations_match(&product, &line, Some(&one)));

    let line = contents.add(&product, 1, Some(&one)).unwrap();
    assert!(!contents.personalizations_match(&product, &line, Some(&both)));
    assert_eq!(contents.order().lines().len(), 2);
}

#[test]
fn plain_and_personalized_lines_never_match() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let engraved = json!([{ "name": "Engrave", "value": "Hi" }]);

    let plain = contents.add(&product, 1, None).unwrap();
    assert!(plain.personalizations.is_empty());
    assert!(!contents.personalizations_match(&product, &plain, Some(&engraved)));

    let personalized = contents.add(&product, 1, Some(&engraved)).unwrap();
    assert!(!contents.personalizations_match(&product, &personalized, None));
    assert_eq!(contents.order().lines().len(), 2);
}

#[test]
fn empty_sets_match() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let line = contents.add(&product, 1, None).unwrap();
    assert!(contents.personalizations_match(&product, &line, None));
    assert!(contents.personalizations_match(&product, &line, Some(&json!([]))));

    let line = contents.add(&product, 1, Some(&json!([]))).unwrap();
    assert_eq!(line.quantity, 2);
}

#[test]
fn malformed_params_never_match() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let line = contents
        .add(&product, 1, Some(&json!([{ "name": "Engrave", "value": "Hi" }])))
        .unwrap();

    assert!(!contents.personalizations_match(&product, &line, Some(&json!(1))));
    assert!(!contents.personalizations_match(
        &product,
        &line,
        Some(&json!({ "name": "Engrave" }))
    ));
}

#[test]
fn product_without_personalizations_ignores_requests() {
    let shop = Shop::new();
    let product = shop.product(vec![]);
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let line = contents
        .add(&product, 1, Some(&json!([{ "name": "Engrave", "value": "Hi" }])))
        .unwrap();

    assert!(line.personalizations.is_empty());
    assert!(contents.personalizations_match(&product, &line, None));
}

#[test]
fn option_and_text_sets_match_in_any_order() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let red = shop.red.id.to_string();
    let forward = json!([
        { "name": "Color", "option_value_id": red },
        { "name": "Engrave", "value": "Hi" }
    ]);
    let backward = json!({
        "personalizations_attributes": [
            { "name": "Engrave", "value": " Hi " },
            { "name": "Color", "option_value_id": red }
        ]
    });

    let line = contents.add(&product, 1, Some(&forward)).unwrap();
    let color = line
        .personalizations
        .iter()
        .find(|p| p.name == "Color")
        .unwrap();
    assert_eq!(color.value.as_deref(), Some("Red"));
    assert_eq!(color.price, Some(Decimal::new(250, 2)));

    assert!(contents.personalizations_match(&product, &line, Some(&backward)));
    let merged = contents.add(&product, 1, Some(&backward)).unwrap();
    assert_eq!(merged.line_no, line.line_no);
    assert_eq!(merged.quantity, 2);
}

#[test]
fn repricing_marks_lines_stale_and_stops_merging() {
    let shop = Shop::new();
    let mut product = shop.personalized_product();
    let mut order = shop.order();
    let params = json!([{ "name": "Engrave", "value": "Hi" }]);

    let line = OrderContents::new(&mut order, &shop.option_values, &shop.config)
        .add(&product, 1, Some(&params))
        .unwrap();
    assert!(!line.has_stale_personalization_pricing(&product));

    let engrave_id = product.personalization_named("Engrave").unwrap().id;
    product
        .execute(&ProductCommand::ChangePersonalizationCalculator(
            ChangePersonalizationCalculator {
                tenant_id: shop.tenant_id,
                product_id: product.id_typed(),
                personalization_id: engrave_id,
                calculator: Some(Calculator::flat_rate(Decimal::new(700, 2))),
                occurred_at: Utc::now(),
            },
        ))
        .unwrap();

    assert!(line.has_stale_personalization_pricing(&product));

    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);
    assert!(!contents.personalizations_match(&product, &line, Some(&params)));
    let repriced = contents.add(&product, 1, Some(&params)).unwrap();
    assert_ne!(repriced.line_no, line.line_no);
    assert_eq!(repriced.personalizations[0].price, Some(Decimal::new(700, 2)));
}

#[test]
fn too_long_value_is_rejected_without_touching_the_order() {
    let shop = Shop::new();
    let product = shop.personalized_product();
    let mut order = shop.order();
    let mut contents = OrderContents::new(&mut order, &shop.option_values, &shop.config);

    let err = contents
        .add(&product, 1, Some(&json!([{ "name": "Initials", "value": "ABCD" }])))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "validation failed: Initials is too long (maximum is 3 characters)"
    );
    assert!(contents.order().lines().is_empty());
    assert_eq!(contents.order().version(), 1);
}
