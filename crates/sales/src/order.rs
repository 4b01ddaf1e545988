use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use monogram_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Event, TenantId};
use monogram_personalization::{PersonalizationValue, personalizations_match};
use monogram_products::{PersonalizationCatalog, ProductId};

/// Sales order identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesOrderId(pub AggregateId);

impl SalesOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SalesOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order line: product, quantity, unit price and the personalizations it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub personalizations: Vec<PersonalizationValue>,
}

impl OrderLine {
    /// Sum of the personalization prices captured on this line, per unit.
    ///
    /// `None` when the sum does not fit in a `Decimal`.
    pub fn personalization_total(&self) -> Option<Decimal> {
        self.personalizations
            .iter()
            .filter_map(|p| p.price)
            .try_fold(Decimal::ZERO, |total, price| total.checked_add(price))
    }

    /// (unit price + personalization prices) x quantity, `None` on overflow.
    pub fn amount(&self) -> Option<Decimal> {
        self.unit_price
            .checked_add(self.personalization_total()?)?
            .checked_mul(Decimal::from(self.quantity))
    }

    /// Whether an admin repriced any of this line's personalizations since it was added.
    pub fn has_stale_personalization_pricing<C>(&self, catalog: &C) -> bool
    where
        C: PersonalizationCatalog + ?Sized,
    {
        self.personalizations
            .iter()
            .any(|p| p.price_has_changed(catalog))
    }

    /// Same product and an equivalent personalization set.
    pub fn accepts(&self, product_id: ProductId, personalizations: &[PersonalizationValue]) -> bool {
        self.product_id == product_id
            && personalizations_match(&self.personalizations, personalizations)
    }
}

/// Aggregate root: SalesOrder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesOrder {
    id: SalesOrderId,
    tenant_id: Option<TenantId>,
    currency: String,
    lines: Vec<OrderLine>,
    version: u64,
    created: bool,
}

impl SalesOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: SalesOrderId) -> Self {
        Self {
            id,
            tenant_id: None,
            currency: String::new(),
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SalesOrderId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, line_no: u32) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.line_no == line_no)
    }

    /// The line an addition of `product_id` with `personalizations` would merge into.
    pub fn find_line(
        &self,
        product_id: ProductId,
        personalizations: &[PersonalizationValue],
    ) -> Option<&OrderLine> {
        self.lines
            .iter()
            .find(|l| l.accepts(product_id, personalizations))
    }

    /// Sum of the line amounts, `None` when any line or the sum overflows.
    pub fn total(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.amount()?))
    }
}

impl AggregateRoot for SalesOrder {
    type Id = SalesOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateSalesOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSalesOrder {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLine. Personalizations arrive already normalized and priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLine {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub personalizations: Vec<PersonalizationValue>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesOrderCommand {
    CreateSalesOrder(CreateSalesOrder),
    AddLine(AddLine),
}

/// Event: SalesOrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderCreated {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub personalizations: Vec<PersonalizationValue>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineQuantityIncreased (an equivalent addition was merged).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineQuantityIncreased {
    pub tenant_id: TenantId,
    pub order_id: SalesOrderId,
    pub line_no: u32,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesOrderEvent {
    SalesOrderCreated(SalesOrderCreated),
    LineAdded(LineAdded),
    LineQuantityIncreased(LineQuantityIncreased),
}

impl SalesOrderEvent {
    /// Line touched by the event, if any.
    pub fn line_no(&self) -> Option<u32> {
        match self {
            SalesOrderEvent::SalesOrderCreated(_) => None,
            SalesOrderEvent::LineAdded(e) => Some(e.line_no),
            SalesOrderEvent::LineQuantityIncreased(e) => Some(e.line_no),
        }
    }
}

impl Event for SalesOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SalesOrderEvent::SalesOrderCreated(_) => "sales.order.created",
            SalesOrderEvent::LineAdded(_) => "sales.order.line_added",
            SalesOrderEvent::LineQuantityIncreased(_) => "sales.order.line_quantity_increased",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SalesOrderEvent::SalesOrderCreated(e) => e.occurred_at,
            SalesOrderEvent::LineAdded(e) => e.occurred_at,
            SalesOrderEvent::LineQuantityIncreased(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SalesOrder {
    type Command = SalesOrderCommand;
    type Event = SalesOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SalesOrderEvent::SalesOrderCreated(e) => {
                self.id = e.order_id;
                self.tenant_id = Some(e.tenant_id);
                self.currency = e.currency.clone();
                self.lines.clear();
                self.created = true;
            }
            SalesOrderEvent::LineAdded(e) => {
                self.lines.push(OrderLine {
                    line_no: e.line_no,
                    product_id: e.product_id,
                    quantity: e.quantity,
                    unit_price: e.unit_price,
                    personalizations: e.personalizations.clone(),
                });
            }
            SalesOrderEvent::LineQuantityIncreased(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.line_no == e.line_no) {
                    // Overflow is rejected in `handle_add_line`.
                    line.quantity = line.quantity.saturating_add(e.quantity);
                }
            }
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SalesOrderCommand::CreateSalesOrder(cmd) => self.handle_create(cmd),
            SalesOrderCommand::AddLine(cmd) => self.handle_add_line(cmd),
        }
    }
}

impl SalesOrder {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_order_id(&self, order_id: SalesOrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateSalesOrder) -> Result<Vec<SalesOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("sales order already exists"));
        }

        let currency = cmd.currency.trim();
        if currency.is_empty() {
            return Err(DomainError::validation("currency cannot be empty"));
        }

        Ok(vec![SalesOrderEvent::SalesOrderCreated(SalesOrderCreated {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            currency: currency.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> Result<Vec<SalesOrderEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_order_id(cmd.order_id)?;

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        if cmd.unit_price <= Decimal::ZERO {
            return Err(DomainError::validation("unit_price must be positive"));
        }

        if cmd
            .personalizations
            .iter()
            .any(|p| p.currency != self.currency)
        {
            return Err(DomainError::invariant(
                "personalization currency does not match order currency",
            ));
        }

        if let Some(line) = self.find_line(cmd.product_id, &cmd.personalizations) {
            if line.quantity.checked_add(cmd.quantity).is_none() {
                return Err(DomainError::validation("quantity overflow"));
            }
            return Ok(vec![SalesOrderEvent::LineQuantityIncreased(
                LineQuantityIncreased {
                    tenant_id: cmd.tenant_id,
                    order_id: cmd.order_id,
                    line_no: line.line_no,
                    quantity: cmd.quantity,
                    occurred_at: cmd.occurred_at,
                },
            )]);
        }

        let next_line_no = self.lines.iter().map(|l| l.line_no).max().unwrap_or(0) + 1;

        Ok(vec![SalesOrderEvent::LineAdded(LineAdded {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            line_no: next_line_no,
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            unit_price: cmd.unit_price,
            personalizations: cmd.personalizations.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
