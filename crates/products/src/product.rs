use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use monogram_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, Entity, Event, OptionValuePersonalizationId,
    ProductPersonalizationId, TenantId,
};

use crate::calculator::Calculator;
use crate::personalization::{
    OptionValuePersonalization, PersonalizationCatalog, ProductPersonalization,
};

/// Product identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Base pricing of the product itself, before personalization increases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingMetadata {
    pub base_price: Option<Decimal>,
    /// ISO currency code (e.g. "USD").
    pub currency: Option<String>,
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    tenant_id: Option<TenantId>,
    sku: String,
    name: String,
    pricing: PricingMetadata,
    personalizations: Vec<ProductPersonalization>,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            tenant_id: None,
            sku: String::new(),
            name: String::new(),
            pricing: PricingMetadata::default(),
            personalizations: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pricing(&self) -> &PricingMetadata {
        &self.pricing
    }

    pub fn personalizations(&self) -> &[ProductPersonalization] {
        &self.personalizations
    }

    pub fn has_personalizations(&self) -> bool {
        !self.personalizations.is_empty()
    }

    /// Personalization names are unique per product, so this is exact.
    pub fn personalization_named(&self, name: &str) -> Option<&ProductPersonalization> {
        self.personalizations.iter().find(|p| p.name == name)
    }
}

impl PersonalizationCatalog for Product {
    fn product_personalization(
        &self,
        id: ProductPersonalizationId,
    ) -> Option<&ProductPersonalization> {
        self.personalizations.iter().find(|p| p.id == id)
    }

    fn option_value_personalization(
        &self,
        id: OptionValuePersonalizationId,
    ) -> Option<&OptionValuePersonalization> {
        self.personalizations
            .iter()
            .flat_map(|p| p.option_value_personalizations.iter())
            .find(|link| link.id == id)
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub pricing: Option<PricingMetadata>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddPersonalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPersonalization {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub personalization: ProductPersonalization,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangePersonalizationCalculator (admin repricing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePersonalizationCalculator {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub personalization_id: ProductPersonalizationId,
    pub calculator: Option<Calculator>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeOptionValueCalculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOptionValueCalculator {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub option_value_personalization_id: OptionValuePersonalizationId,
    pub calculator: Option<Calculator>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemovePersonalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovePersonalization {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub personalization_id: ProductPersonalizationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    AddPersonalization(AddPersonalization),
    ChangePersonalizationCalculator(ChangePersonalizationCalculator),
    ChangeOptionValueCalculator(ChangeOptionValueCalculator),
    RemovePersonalization(RemovePersonalization),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub pricing: PricingMetadata,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PersonalizationAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationAdded {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub personalization: ProductPersonalization,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PersonalizationCalculatorChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationCalculatorChanged {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub personalization_id: ProductPersonalizationId,
    pub calculator: Option<Calculator>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OptionValueCalculatorChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValueCalculatorChanged {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub option_value_personalization_id: OptionValuePersonalizationId,
    pub calculator: Option<Calculator>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PersonalizationRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationRemoved {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub personalization_id: ProductPersonalizationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    PersonalizationAdded(PersonalizationAdded),
    PersonalizationCalculatorChanged(PersonalizationCalculatorChanged),
    OptionValueCalculatorChanged(OptionValueCalculatorChanged),
    PersonalizationRemoved(PersonalizationRemoved),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
            ProductEvent::PersonalizationAdded(_) => "products.personalization.added",
            ProductEvent::PersonalizationCalculatorChanged(_) => {
                "products.personalization.calculator_changed"
            }
            ProductEvent::OptionValueCalculatorChanged(_) => {
                "products.personalization.option_value_calculator_changed"
            }
            ProductEvent::PersonalizationRemoved(_) => "products.personalization.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::PersonalizationAdded(e) => e.occurred_at,
            ProductEvent::PersonalizationCalculatorChanged(e) => e.occurred_at,
            ProductEvent::OptionValueCalculatorChanged(e) => e.occurred_at,
            ProductEvent::PersonalizationRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.tenant_id = Some(e.tenant_id);
                self.sku = e.sku.clone();
                self.name = e.name.clone();
                self.pricing = e.pricing.clone();
                self.personalizations.clear();
                self.created = true;
            }
            ProductEvent::PersonalizationAdded(e) => {
                self.personalizations.push(e.personalization.clone());
            }
            ProductEvent::PersonalizationCalculatorChanged(e) => {
                if let Some(p) = self
                    .personalizations
                    .iter_mut()
                    .find(|p| p.id == e.personalization_id)
                {
                    p.calculator = e.calculator.clone();
                }
            }
            ProductEvent::OptionValueCalculatorChanged(e) => {
                if let Some(link) = self
                    .personalizations
                    .iter_mut()
                    .flat_map(|p| p.option_value_personalizations.iter_mut())
                    .find(|link| link.id == e.option_value_personalization_id)
                {
                    link.calculator = e.calculator.clone();
                }
            }
            ProductEvent::PersonalizationRemoved(e) => {
                self.personalizations.retain(|p| p.id != e.personalization_id);
            }
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::AddPersonalization(cmd) => self.handle_add_personalization(cmd),
            ProductCommand::ChangePersonalizationCalculator(cmd) => {
                self.handle_change_calculator(cmd)
            }
            ProductCommand::ChangeOptionValueCalculator(cmd) => {
                self.handle_change_option_value_calculator(cmd)
            }
            ProductCommand::RemovePersonalization(cmd) => self.handle_remove_personalization(cmd),
        }
    }
}

impl Product {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn ensure_existing(&self, tenant_id: TenantId, product_id: ProductId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_tenant(tenant_id)?;
        self.ensure_product_id(product_id)
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if cmd.sku.trim().is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            sku: cmd.sku.clone(),
            name: cmd.name.clone(),
            pricing: cmd.pricing.clone().unwrap_or_default(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_personalization(
        &self,
        cmd: &AddPersonalization,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        let personalization = &cmd.personalization;
        let name = personalization.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("personalization name cannot be empty"));
        }

        if self.personalization_named(name).is_some() {
            return Err(DomainError::conflict(format!(
                "personalization '{name}' already exists on this product"
            )));
        }

        if self
            .personalizations
            .iter()
            .any(|existing| existing.same_identity_as(personalization))
        {
            return Err(DomainError::conflict("personalization id already in use"));
        }

        if personalization.limit == 0 {
            return Err(DomainError::validation(
                "personalization limit must be at least 1",
            ));
        }

        let links = &personalization.option_value_personalizations;
        if !links.is_empty() && !personalization.is_options() {
            return Err(DomainError::invariant(
                "option values can only be linked to options personalizations",
            ));
        }

        let mut seen = HashSet::new();
        if !links.iter().all(|link| seen.insert(link.option_value_id)) {
            return Err(DomainError::validation(
                "an option value can only be linked once per personalization",
            ));
        }

        if links
            .iter()
            .any(|link| self.option_value_personalization(link.id).is_some())
        {
            return Err(DomainError::conflict(
                "option value personalization id already in use",
            ));
        }

        let mut personalization = personalization.clone();
        personalization.name = name.to_string();

        Ok(vec![ProductEvent::PersonalizationAdded(PersonalizationAdded {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            personalization,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_calculator(
        &self,
        cmd: &ChangePersonalizationCalculator,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        if self.product_personalization(cmd.personalization_id).is_none() {
            return Err(DomainError::not_found());
        }

        Ok(vec![ProductEvent::PersonalizationCalculatorChanged(
            PersonalizationCalculatorChanged {
                tenant_id: cmd.tenant_id,
                product_id: cmd.product_id,
                personalization_id: cmd.personalization_id,
                calculator: cmd.calculator.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_change_option_value_calculator(
        &self,
        cmd: &ChangeOptionValueCalculator,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        if self
            .option_value_personalization(cmd.option_value_personalization_id)
            .is_none()
        {
            return Err(DomainError::not_found());
        }

        Ok(vec![ProductEvent::OptionValueCalculatorChanged(
            OptionValueCalculatorChanged {
                tenant_id: cmd.tenant_id,
                product_id: cmd.product_id,
                option_value_personalization_id: cmd.option_value_personalization_id,
                calculator: cmd.calculator.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_remove_personalization(
        &self,
        cmd: &RemovePersonalization,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.product_id)?;

        if self.product_personalization(cmd.personalization_id).is_none() {
            return Err(DomainError::not_found());
        }

        Ok(vec![ProductEvent::PersonalizationRemoved(PersonalizationRemoved {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            personalization_id: cmd.personalization_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
