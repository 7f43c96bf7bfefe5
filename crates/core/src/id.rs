//! Entity identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an entity.
///
/// Freshly created entities get a random UUIDv4 rendered as 36 characters.
/// Identifiers restored from durable storage are kept verbatim: the store
/// treats them as opaque text and only requires them to be non-empty and free
/// of whitespace (they appear as a single token on the console).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DomainError::invalid_id("EntityId: empty"));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_id(format!(
                "EntityId: contains whitespace: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_36_chars_and_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_eq!(a.as_str().len(), 36);
        assert_ne!(a, b);
    }

    #[test]
    fn opaque_ids_parse_verbatim() {
        let id: EntityId = "S1".parse().unwrap();
        assert_eq!(id.as_str(), "S1");
    }

    #[test]
    fn empty_and_spaced_ids_are_rejected() {
        assert!(matches!("".parse::<EntityId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("a b".parse::<EntityId>(), Err(DomainError::InvalidId(_))));
    }
}
