//! `monogram-core`: shared domain building blocks.
//!
//! Pure domain primitives only: identifiers, the error model and the traits the
//! catalog, personalization and sales crates are written against.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::{
    AggregateId, OptionValueId, OptionValuePersonalizationId, ProductPersonalizationId, TenantId,
};
pub use value_object::ValueObject;
