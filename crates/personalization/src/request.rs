//! Raw personalization input as submitted with an add-to-cart request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use monogram_core::OptionValueId;

use crate::value::permitted_attributes;

/// Key used by storefront forms to nest personalization attributes.
pub const NESTED_ATTRIBUTES_KEY: &str = "personalizations_attributes";

/// One requested personalization before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationRequest {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Kept as submitted; parsed when the request is built into a value.
    #[serde(default)]
    pub option_value_id: Option<String>,
}

impl PersonalizationRequest {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            option_value_id: None,
        }
    }

    pub fn option(name: impl Into<String>, option_value_id: OptionValueId) -> Self {
        Self {
            name: name.into(),
            value: None,
            option_value_id: Some(option_value_id.to_string()),
        }
    }

    /// Parse request parameters into a list of personalization requests.
    ///
    /// Accepts a bare list or an object nesting the list under
    /// [`NESTED_ATTRIBUTES_KEY`]. Attributes outside [`permitted_attributes`] are
    /// dropped. Anything that is not a list of personalization-shaped objects
    /// returns `None`.
    pub fn list_from_json(params: &Value) -> Option<Vec<Self>> {
        let items = match params {
            Value::Array(items) => items,
            Value::Object(map) => match map.get(NESTED_ATTRIBUTES_KEY) {
                Some(Value::Array(items)) => items,
                _ => return None,
            },
            _ => return None,
        };

        items
            .iter()
            .map(|item| match item {
                Value::Object(attributes) => Self::from_attributes(attributes),
                _ => None,
            })
            .collect()
    }

    fn from_attributes(attributes: &Map<String, Value>) -> Option<Self> {
        let mut request = Self::default();
        let mut has_name = false;

        for key in permitted_attributes() {
            let Some(raw) = attributes.get(*key) else {
                continue;
            };
            let scalar = scalar_to_string(raw)?;
            match *key {
                "name" => {
                    request.name = scalar?;
                    has_name = true;
                }
                "value" => request.value = scalar,
                "option_value_id" => request.option_value_id = scalar,
                _ => {}
            }
        }

        has_name.then_some(request)
    }
}

/// `Some(None)` for null, `Some(Some(_))` for strings and numbers, `None` otherwise.
fn scalar_to_string(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Number(n) => Some(Some(n.to_string())),
        _ => None,
    }
}
