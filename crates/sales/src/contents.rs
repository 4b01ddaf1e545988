//! Adding personalized products to an order.
//!
//! Parses request parameters, builds the personalization values for the product
//! and merges the addition into an equivalent line when one exists.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use monogram_core::{Aggregate, DomainError, DomainResult};
use monogram_personalization::{
    PersonalizationBuilder, PersonalizationConfig, PersonalizationRequest, PersonalizationValue,
    personalizations_match,
};
use monogram_products::{OptionValueLookup, Product};

use crate::order::{AddLine, OrderLine, SalesOrder, SalesOrderCommand, SalesOrderEvent};

pub struct OrderContents<'a, L: ?Sized> {
    order: &'a mut SalesOrder,
    option_values: &'a L,
    config: &'a PersonalizationConfig,
}

impl<'a, L> OrderContents<'a, L>
where
    L: OptionValueLookup + ?Sized,
{
    pub fn new(
        order: &'a mut SalesOrder,
        option_values: &'a L,
        config: &'a PersonalizationConfig,
    ) -> Self {
        Self {
            order,
            option_values,
            config,
        }
    }

    pub fn order(&self) -> &SalesOrder {
        self.order
    }

    /// Add `quantity` of `product` personalized as described by `params`.
    ///
    /// Returns the line the addition ended up on, either freshly added or an
    /// existing one whose quantity was increased.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: i64,
        params: Option<&Value>,
    ) -> DomainResult<OrderLine> {
        let tenant_id = self
            .order
            .tenant_id()
            .ok_or_else(DomainError::not_found)?;
        if product.tenant_id() != Some(tenant_id) {
            return Err(DomainError::invariant("product belongs to another tenant"));
        }

        let unit_price = product
            .pricing()
            .base_price
            .filter(|price| *price > Decimal::ZERO)
            .ok_or_else(|| DomainError::validation("product has no base price"))?;

        let requests = parse_requests(params)
            .ok_or_else(|| DomainError::validation("malformed personalization parameters"))?;
        let personalizations = self.build(product, &requests)?;

        let order_id = self.order.id_typed();
        let events = self.order.execute(&SalesOrderCommand::AddLine(AddLine {
            tenant_id,
            order_id,
            product_id: product.id_typed(),
            quantity,
            unit_price,
            personalizations,
            occurred_at: Utc::now(),
        }))?;

        let line_no = events
            .iter()
            .find_map(SalesOrderEvent::line_no)
            .ok_or_else(|| DomainError::invariant("line addition produced no line"))?;

        if let Some(SalesOrderEvent::LineQuantityIncreased(_)) = events.first() {
            debug!(%order_id, line_no, quantity, "merged into existing line");
        } else {
            debug!(%order_id, line_no, quantity, "added new line");
        }

        self.order
            .line(line_no)
            .cloned()
            .ok_or_else(DomainError::not_found)
    }

    /// Whether adding `product` with `params` would merge into `line`.
    ///
    /// Never fails: malformed or invalid parameters simply do not match.
    pub fn personalizations_match(
        &self,
        product: &Product,
        line: &OrderLine,
        params: Option<&Value>,
    ) -> bool {
        if line.product_id != product.id_typed() {
            return false;
        }
        let Some(requests) = parse_requests(params) else {
            return false;
        };
        match self.build(product, &requests) {
            Ok(requested) => personalizations_match(&line.personalizations, &requested),
            Err(_) => false,
        }
    }

    fn build(
        &self,
        product: &Product,
        requests: &[PersonalizationRequest],
    ) -> DomainResult<Vec<PersonalizationValue>> {
        let mut builder = PersonalizationBuilder::new(self.option_values, self.config);
        // An order without a currency falls back to the configured one.
        if !self.order.currency().is_empty() {
            builder = builder.currency(self.order.currency());
        }
        Ok(builder.build(product, requests)?)
    }
}

/// Absent parameters mean no personalizations.
fn parse_requests(params: Option<&Value>) -> Option<Vec<PersonalizationRequest>> {
    match params {
        None => Some(Vec::new()),
        Some(params) => PersonalizationRequest::list_from_json(params),
    }
}
