//! Value types of filters and facets, and decoding of raw facet values.

use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::DecodeError;

/// The type a filter compares against or a facet decodes into.
///
/// Facets are grouped by value type, so two facets with equal types can be requested
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// Plain strings, decoded as-is.
    #[default]
    Text,
    /// Signed integers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// `true` / `false`.
    Boolean,
    /// A closed set of named literals.
    Enum {
        /// Name of the enumeration.
        name: String,
        /// Accepted literals.
        variants: Vec<String>,
    },
    /// References to another entity, decoded by a [`RelationResolver`].
    Relation {
        /// Target entity type.
        target: String,
    },
}

impl ValueType {
    /// Decodes one raw facet value.
    pub fn decode(
        &self,
        raw: &str,
        relations: &dyn RelationResolver,
    ) -> Result<FacetValue, DecodeError> {
        match self {
            Self::Text => Ok(FacetValue::Text(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse()
                .map(FacetValue::Integer)
                .map_err(|_| DecodeError::Integer { raw: raw.into() }),
            Self::Float => raw
                .trim()
                .parse()
                .map(FacetValue::Float)
                .map_err(|_| DecodeError::Float { raw: raw.into() }),
            Self::Boolean => match raw.trim() {
                "true" | "T" => Ok(FacetValue::Boolean(true)),
                "false" | "F" => Ok(FacetValue::Boolean(false)),
                _ => Err(DecodeError::Boolean { raw: raw.into() }),
            },
            Self::Enum { name, variants } => variants
                .iter()
                .find(|v| v.as_str() == raw)
                .map(|v| FacetValue::Enum(v.clone()))
                .ok_or_else(|| DecodeError::UnknownVariant {
                    name: name.clone(),
                    raw: raw.into(),
                }),
            Self::Relation { target } => relations
                .resolve(target, raw)
                .map(FacetValue::Relation)
                .ok_or_else(|| DecodeError::Relation {
                    target: target.clone(),
                    raw: raw.into(),
                }),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Enum { name, .. } => write!(f, "enum {name}"),
            Self::Relation { target } => write!(f, "relation {target}"),
        }
    }
}

/// A decoded facet value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FacetValue {
    /// A string.
    Text(String),
    /// An integer.
    Integer(i64),
    /// A number.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// An enumeration literal.
    Enum(String),
    /// A resolved related entity.
    Relation(JsonValue),
}

impl FacetValue {
    /// Returns the value as text when it is a string or enumeration literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Enum(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Relation(v) => write!(f, "{v}"),
        }
    }
}

/// Resolves relation facet values into related entities.
///
/// Supplied by the caller, keyed by target entity type.
pub trait RelationResolver {
    /// Resolves `raw` as a reference to an entity of type `target`.
    fn resolve(&self, target: &str, raw: &str) -> Option<JsonValue>;
}

/// A resolver that knows no relations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelations;

impl RelationResolver for NoRelations {
    fn resolve(&self, _target: &str, _raw: &str) -> Option<JsonValue> {
        None
    }
}
