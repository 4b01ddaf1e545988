//! Selectable option values and the lookup used to resolve them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use monogram_core::{Entity, OptionValueId};

/// A selectable option value, e.g. `Red` under a `Color` option type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    pub id: OptionValueId,
    /// Name copied onto a personalization when the option is picked.
    pub name: String,
    /// Label shown to shoppers; falls back to `name` when absent.
    pub presentation: Option<String>,
}

impl OptionValue {
    pub fn new(id: OptionValueId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            presentation: None,
        }
    }

    pub fn presentation(&self) -> &str {
        self.presentation.as_deref().unwrap_or(&self.name)
    }
}

impl Entity for OptionValue {
    type Id = OptionValueId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Resolves option value identifiers.
///
/// A miss is not an error: the personalization simply ends up without a value
/// and fails validation as required.
pub trait OptionValueLookup {
    fn find_option_value(&self, id: OptionValueId) -> Option<&OptionValue>;

    fn option_value_name(&self, id: OptionValueId) -> Option<&str> {
        self.find_option_value(id).map(|v| v.name.as_str())
    }
}

/// Option values held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOptionValues {
    values: HashMap<OptionValueId, OptionValue>,
}

impl InMemoryOptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: OptionValue) -> Option<OptionValue> {
        self.values.insert(value.id, value)
    }

    pub fn remove(&mut self, id: OptionValueId) -> Option<OptionValue> {
        self.values.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<OptionValue> for InMemoryOptionValues {
    fn from_iter<I: IntoIterator<Item = OptionValue>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|v| (v.id, v)).collect(),
        }
    }
}

impl OptionValueLookup for InMemoryOptionValues {
    fn find_option_value(&self, id: OptionValueId) -> Option<&OptionValue> {
        self.values.get(&id)
    }
}
