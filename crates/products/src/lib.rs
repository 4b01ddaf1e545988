//! Products domain module (event-sourced).
//!
//! Catalog side of personalization: which personalizations a product accepts,
//! how each one is priced, and the selectable option values they can link to.
//! Deterministic domain logic only (no IO, no HTTP, no storage).

pub mod calculator;
pub mod option_value;
pub mod personalization;
pub mod product;

pub use calculator::{Calculator, PriceCalculator};
pub use option_value::{InMemoryOptionValues, OptionValue, OptionValueLookup};
pub use personalization::{
    DEFAULT_LIMIT, OptionValuePersonalization, PersonalizationCatalog, PersonalizationKind,
    ProductPersonalization,
};
pub use product::{
    AddPersonalization, ChangeOptionValueCalculator, ChangePersonalizationCalculator,
    CreateProduct, OptionValueCalculatorChanged, PersonalizationAdded,
    PersonalizationCalculatorChanged, PersonalizationRemoved, PricingMetadata, Product,
    ProductCommand, ProductCreated, ProductEvent, ProductId, RemovePersonalization,
};
