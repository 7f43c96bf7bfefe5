//! `hbnb-core`: entity model and registry.
//!
//! This crate contains the **pure domain** layer: the declared schema of every
//! entity type, typed attribute values, identifiers, and the serialized record
//! form shared by every storage backend. It performs no IO.

pub mod entity;
pub mod error;
pub mod id;
pub mod schema;
pub mod value;

pub use entity::{CLASS_TAG, Entity, composite_key, format_timestamp, parse_timestamp};
pub use error::{DomainError, DomainResult};
pub use id::EntityId;
pub use schema::{AUDIT_FIELDS, EntityKind, FieldSpec, Schema};
pub use value::{AttrValue, FieldType};
