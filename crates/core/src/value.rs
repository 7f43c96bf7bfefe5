//! Attribute values and their declared types.

use serde_json::Value as JsonValue;

use crate::error::{DomainError, DomainResult};
use crate::id::EntityId;

/// Declared type of an entity attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    /// A list of entity identifiers (many-to-many links).
    IdList,
}

impl FieldType {
    /// Value an attribute holds until it is assigned.
    pub fn default_value(self) -> AttrValue {
        match self {
            FieldType::Text => AttrValue::Text(String::new()),
            FieldType::Integer => AttrValue::Integer(0),
            FieldType::Float => AttrValue::Float(0.0),
            FieldType::IdList => AttrValue::IdList(Vec::new()),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    /// Convert console text into a value of this type.
    ///
    /// Id lists have no textual surface; they are only assignable from JSON.
    pub fn coerce_str(self, attribute: &str, raw: &str) -> DomainResult<AttrValue> {
        let fail = || DomainError::coercion(attribute, raw);
        match self {
            FieldType::Text => Ok(AttrValue::Text(raw.to_string())),
            FieldType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(AttrValue::Integer)
                .map_err(|_| fail()),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(AttrValue::Float)
                .ok_or_else(fail),
            FieldType::IdList => Err(fail()),
        }
    }

    /// Convert a JSON value into a value of this type.
    ///
    /// Strings are accepted for every scalar type and go through the same
    /// conversion as console text. Id lists drop repeated ids.
    pub fn coerce_json(self, attribute: &str, value: &JsonValue) -> DomainResult<AttrValue> {
        let fail = || DomainError::coercion(attribute, value.to_string());
        match (self, value) {
            (_, JsonValue::String(s)) if self != FieldType::IdList => self.coerce_str(attribute, s),
            (FieldType::Text, JsonValue::Number(n)) => Ok(AttrValue::Text(n.to_string())),
            (FieldType::Text, JsonValue::Bool(b)) => Ok(AttrValue::Text(b.to_string())),
            (FieldType::Integer, JsonValue::Number(n)) => {
                n.as_i64().map(AttrValue::Integer).ok_or_else(fail)
            }
            (FieldType::Float, JsonValue::Number(n)) => {
                n.as_f64().map(AttrValue::Float).ok_or_else(fail)
            }
            (FieldType::IdList, JsonValue::Array(items)) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    let id = item
                        .as_str()
                        .ok_or_else(fail)?
                        .parse::<EntityId>()
                        .map_err(|_| fail())?;
                    ids.push(id);
                }
                Ok(AttrValue::IdList(ids).normalized())
            }
            _ => Err(fail()),
        }
    }
}

/// Value held by an entity attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Integer(i64),
    Float(f64),
    IdList(Vec<EntityId>),
}

impl AttrValue {
    /// Canonical form: id lists keep only the first occurrence of each id.
    pub(crate) fn normalized(self) -> Self {
        match self {
            AttrValue::IdList(ids) => {
                let mut unique = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                AttrValue::IdList(unique)
            }
            other => other,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            AttrValue::Text(_) => FieldType::Text,
            AttrValue::Integer(_) => FieldType::Integer,
            AttrValue::Float(_) => FieldType::Float,
            AttrValue::IdList(_) => FieldType::IdList,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[EntityId]> {
        match self {
            AttrValue::IdList(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            AttrValue::Text(s) => JsonValue::String(s.clone()),
            AttrValue::Integer(i) => JsonValue::from(*i),
            AttrValue::Float(f) => JsonValue::from(*f),
            AttrValue::IdList(ids) => {
                JsonValue::Array(ids.iter().map(|id| JsonValue::from(id.as_str())).collect())
            }
        }
    }
}

impl core::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Integer(i) => write!(f, "{i}"),
            // Debug keeps the fractional part on whole numbers (0.0, not 0).
            AttrValue::Float(x) => write!(f, "{x:?}"),
            AttrValue::IdList(ids) => {
                f.write_str("[")?;
                for (idx, id) in ids.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(id.as_str())?;
                }
                f.write_str("]")
            }
        }
    }
}
