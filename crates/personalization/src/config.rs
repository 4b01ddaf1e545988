//! Personalization settings.

use serde::Deserialize;

pub const CURRENCY_ENV: &str = "MONOGRAM_CURRENCY";
pub const STRICT_NAMES_ENV: &str = "MONOGRAM_STRICT_PERSONALIZATION_NAMES";

/// Settings for turning requests into personalization values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PersonalizationConfig {
    /// Currency stamped on values when the order does not carry one.
    pub currency: String,
    /// Reject requests naming a personalization the product does not offer
    /// instead of dropping them.
    pub strict_names: bool,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            strict_names: false,
        }
    }
}

impl PersonalizationConfig {
    /// Read settings from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup` (environment variable name -> value).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let currency = lookup(CURRENCY_ENV)
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.currency);

        let strict_names = lookup(STRICT_NAMES_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.strict_names);

        Self {
            currency,
            strict_names,
        }
    }
}
