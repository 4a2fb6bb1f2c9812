//! Mapping engine documents into caller items.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::ResultError;

/// Field holding the document id unless configured otherwise.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Turns engine documents into items of one entity type.
pub trait DocumentMapper {
    /// The item type produced per document.
    type Item;

    /// Maps one document.
    fn map(&self, doc: &JsonValue) -> Result<Self::Item, ResultError>;

    /// The document's id, used to attach highlighting.
    fn id(&self, doc: &JsonValue) -> Option<String>;

    /// The stored text values of `field`, in index order.
    ///
    /// Highlight snippets of a multi-valued field are distributed over these values.
    fn stored_values(&self, doc: &JsonValue, field: &str) -> Vec<String>;
}

/// Reads the id from a JSON field holding a string or a number.
fn json_id(doc: &JsonValue, id_field: &str) -> Option<String> {
    match doc.get(id_field)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a string or string-array field.
fn json_texts(doc: &JsonValue, field: &str) -> Vec<String> {
    match doc.get(field) {
        Some(JsonValue::String(s)) => vec![s.clone()],
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Keeps every document as raw JSON.
#[derive(Debug, Clone)]
pub struct JsonDocumentMapper {
    /// Field holding the document id.
    id_field: String,
}

impl Default for JsonDocumentMapper {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD)
    }
}

impl JsonDocumentMapper {
    /// Creates a mapper reading ids from `id_field`.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }
}

impl DocumentMapper for JsonDocumentMapper {
    type Item = JsonValue;

    fn map(&self, doc: &JsonValue) -> Result<JsonValue, ResultError> {
        Ok(doc.clone())
    }

    fn id(&self, doc: &JsonValue) -> Option<String> {
        json_id(doc, &self.id_field)
    }

    fn stored_values(&self, doc: &JsonValue, field: &str) -> Vec<String> {
        json_texts(doc, field)
    }
}

/// Deserializes every document into `T`.
#[derive(Debug, Clone)]
pub struct SerdeDocumentMapper<T> {
    /// Field holding the document id.
    id_field: String,
    /// Produced item type.
    item: PhantomData<fn() -> T>,
}

impl<T> Default for SerdeDocumentMapper<T> {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD)
    }
}

impl<T> SerdeDocumentMapper<T> {
    /// Creates a mapper reading ids from `id_field`.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> DocumentMapper for SerdeDocumentMapper<T> {
    type Item = T;

    fn map(&self, doc: &JsonValue) -> Result<T, ResultError> {
        T::deserialize(doc).map_err(|e| ResultError::Mapping {
            id: json_id(doc, &self.id_field).unwrap_or_else(|| "?".into()),
            message: e.to_string(),
        })
    }

    fn id(&self, doc: &JsonValue) -> Option<String> {
        json_id(doc, &self.id_field)
    }

    fn stored_values(&self, doc: &JsonValue, field: &str) -> Vec<String> {
        json_texts(doc, field)
    }
}
