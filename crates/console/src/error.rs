//! Console error model.
//!
//! Every variant is recoverable: the REPL renders it as `** <message> **` and
//! keeps reading.

use thiserror::Error;

use hbnb_core::{DomainError, EntityKind};
use hbnb_infra::StorageError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("class name missing")]
    MissingType,

    #[error("class doesn't exist")]
    UnknownType(String),

    #[error("instance id missing")]
    MissingId,

    #[error("no instance found")]
    EntityNotFound,

    /// Method-call syntax naming a verb that does not exist.
    #[error("invalid method: {0}")]
    InvalidVerb(String),

    /// A line that matches no accepted syntax.
    #[error("unknown syntax: {0}")]
    UnknownSyntax(String),

    #[error("attribute name missing")]
    MissingAttributeName,

    #[error("value missing")]
    MissingAttributeValue,

    #[error("invalid value for {attribute}: {value}")]
    AttributeCoercionFailure { attribute: String, value: String },

    #[error("invalid attribute for {kind}: {attribute}")]
    InvalidAttributeForType { kind: EntityKind, attribute: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnknownType(name) => Self::UnknownType(name),
            DomainError::InvalidAttribute { kind, attribute } => {
                Self::InvalidAttributeForType { kind, attribute }
            }
            DomainError::Coercion { attribute, value } => {
                Self::AttributeCoercionFailure { attribute, value }
            }
            // Ids are single non-empty tokens by construction; anything else
            // cannot name a stored entity.
            DomainError::InvalidId(_) => Self::EntityNotFound,
            other @ DomainError::MalformedRecord(_) => Self::Storage(other.into()),
        }
    }
}
