// Quote record and field-name normalization

use serde_json::{Map, Value};

/// Normalize a provider column name for the JSON response.
///
/// Lower-cases the name and replaces every space with an underscore, so
/// `"Adj Close"` becomes `"adj_close"`.
pub fn normalize_field_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// One row of market data as returned by a [`QuoteProvider`](crate::QuoteProvider).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteRecord {
    fields: Map<String, Value>,
}

impl QuoteRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping the provider's original name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Flatten into the response shape: the record's fields plus `symbol`,
    /// every key normalized with [`normalize_field_name`].
    pub fn into_normalized(self, symbol: &str) -> Map<String, Value> {
        let mut fields = self.fields;
        fields.insert("symbol".to_string(), Value::String(symbol.to_string()));

        fields
            .into_iter()
            .map(|(name, value)| (normalize_field_name(&name), value))
            .collect()
    }
}
