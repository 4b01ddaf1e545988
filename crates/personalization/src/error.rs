//! Personalization validation errors.

use thiserror::Error;

use monogram_core::DomainError;

/// Why a personalization value was rejected.
///
/// Every variant is keyed by the personalization name so callers can attach the
/// message to the right field. The `Display` output is the English rendering;
/// localized front ends use [`Self::message_key`] and [`Self::message_params`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersonalizationError {
    #[error("{name} is required")]
    Required { name: String },

    #[error("{name} is too long (maximum is {limit} characters)")]
    TooLong { name: String, limit: usize },

    /// Only raised when strict name checking is configured.
    #[error("{name} is not a personalization of this product")]
    UnknownPersonalization { name: String },
}

impl PersonalizationError {
    /// The personalization name the error is keyed by.
    pub fn field(&self) -> &str {
        match self {
            Self::Required { name }
            | Self::TooLong { name, .. }
            | Self::UnknownPersonalization { name } => name,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Required { .. } => "errors.line_item_personalization_value_is_required",
            Self::TooLong { .. } => "errors.line_item_personalization_value_is_too_long",
            Self::UnknownPersonalization { .. } => "errors.line_item_personalization_is_unknown",
        }
    }

    pub fn message_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::TooLong { name, limit } => {
                vec![("name", name.clone()), ("size", limit.to_string())]
            }
            _ => vec![("name", self.field().to_string())],
        }
    }
}

impl From<PersonalizationError> for DomainError {
    fn from(err: PersonalizationError) -> Self {
        DomainError::validation(err.to_string())
    }
}
