//! Line-item personalization.
//!
//! Turns raw personalization requests into validated, priced
//! [`PersonalizationValue`]s and decides whether two sets of them are the same
//! personalization, which is what lets identical cart additions merge into one
//! line item.

pub mod builder;
pub mod config;
pub mod error;
pub mod matcher;
pub mod request;
pub mod value;

pub use builder::PersonalizationBuilder;
pub use config::PersonalizationConfig;
pub use error::PersonalizationError;
pub use matcher::{ComparisonKey, PersonalizationSetMatcher, personalizations_match};
pub use request::PersonalizationRequest;
pub use value::{PersonalizationValue, PricingSource, permitted_attributes};
