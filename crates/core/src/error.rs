//! Domain error model.

use thiserror::Error;

use crate::schema::EntityKind;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the entity model (unknown
/// types, undeclared attributes, values that do not fit the schema). Storage
/// and console concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The type name is not present in the entity registry.
    #[error("class doesn't exist")]
    UnknownType(String),

    /// The attribute is not declared (or not assignable) for the entity type.
    #[error("invalid attribute for {kind}: {attribute}")]
    InvalidAttribute { kind: EntityKind, attribute: String },

    /// A raw value could not be converted to the attribute's declared type.
    #[error("invalid value for {attribute}: {value}")]
    Coercion { attribute: String, value: String },

    /// An identifier was invalid (empty or containing whitespace).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A serialized record could not be turned back into an entity.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl DomainError {
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::UnknownType(name.into())
    }

    pub fn invalid_attribute(kind: EntityKind, attribute: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            kind,
            attribute: attribute.into(),
        }
    }

    pub fn coercion(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Coercion {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }
}
