//! Entity model: identity, audit timestamps and declared attributes.

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::error::{DomainError, DomainResult};
use crate::id::EntityId;
use crate::schema::{EntityKind, FieldSpec};
use crate::value::AttrValue;

/// Reserved key naming the entity type in a serialized record.
pub const CLASS_TAG: &str = "__class__";

/// Current time at the resolution every backend can store (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// ISO-8601 rendering used in records and string forms.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an ISO-8601 timestamp.
///
/// Offset-less timestamps are read as UTC.
pub fn parse_timestamp(raw: &str) -> DomainResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| DomainError::malformed(format!("invalid timestamp {raw:?}: {e}")))
}

/// Composite storage key (`Type.id`).
pub fn composite_key(kind: EntityKind, id: &EntityId) -> String {
    format!("{}.{}", kind.name(), id)
}

/// One instance of a registered entity type.
///
/// Attribute values are held in schema order, so every declared attribute is
/// always present (unset attributes hold their type's default).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    id: EntityId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    values: Vec<AttrValue>,
}

impl Entity {
    /// Construct a fresh entity: new id, `updated_at == created_at`, defaults.
    pub fn new(kind: EntityKind) -> Self {
        let ts = now();
        Self::restore(kind, EntityId::new(), ts, ts)
    }

    /// Rebuild an entity with known identity and timestamps, attributes defaulted.
    pub fn restore(
        kind: EntityKind,
        id: EntityId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let values = kind
            .schema()
            .fields
            .iter()
            .map(|f| f.ty.default_value())
            .collect();
        Self {
            kind,
            id,
            created_at,
            updated_at,
            values,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn key(&self) -> String {
        composite_key(self.kind, &self.id)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        let idx = self.kind.schema().position(name)?;
        self.values.get(idx)
    }

    /// Text attribute value, `None` if undeclared or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_text)
    }

    /// Declared attributes with their current values, in schema order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static FieldSpec, &AttrValue)> {
        self.kind.schema().fields.iter().zip(self.values.iter())
    }

    fn slot(&mut self, name: &str) -> DomainResult<(&'static FieldSpec, &mut AttrValue)> {
        let schema = self.kind.schema();
        let idx = schema
            .position(name)
            .ok_or_else(|| DomainError::invalid_attribute(self.kind, name))?;
        Ok((&schema.fields[idx], &mut self.values[idx]))
    }

    /// Assign an already typed value. The value must match the declared type.
    ///
    /// Repeated ids in an id list are dropped.
    pub fn set(&mut self, name: &str, value: AttrValue) -> DomainResult<()> {
        let (spec, slot) = self.slot(name)?;
        if spec.ty != value.field_type() {
            return Err(DomainError::coercion(name, value.to_string()));
        }
        *slot = value.normalized();
        Ok(())
    }

    /// Assign console text, coercing it through the registry.
    pub fn assign_str(&mut self, name: &str, raw: &str) -> DomainResult<()> {
        let (spec, slot) = self.slot(name)?;
        *slot = spec.ty.coerce_str(name, raw)?;
        Ok(())
    }

    /// Assign a JSON value, coercing it through the registry.
    pub fn assign_json(&mut self, name: &str, value: &JsonValue) -> DomainResult<()> {
        let (spec, slot) = self.slot(name)?;
        *slot = spec.ty.coerce_json(name, value)?;
        Ok(())
    }

    /// Stamp `updated_at` for a persisted mutation.
    ///
    /// The new value is always strictly later than the previous one, even when
    /// two mutations land in the same microsecond.
    pub fn touch(&mut self) {
        let ts = now();
        self.updated_at = if ts > self.updated_at {
            ts
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// Dictionary form used by the file backend.
    pub fn to_record(&self) -> Map<String, JsonValue> {
        let mut record = Map::new();
        record.insert("id".into(), JsonValue::from(self.id.as_str()));
        record.insert(
            "created_at".into(),
            JsonValue::from(format_timestamp(&self.created_at)),
        );
        record.insert(
            "updated_at".into(),
            JsonValue::from(format_timestamp(&self.updated_at)),
        );
        for (spec, value) in self.attributes() {
            record.insert(spec.name.into(), value.to_json());
        }
        record.insert(CLASS_TAG.into(), JsonValue::from(self.kind.name()));
        record
    }

    /// Rebuild an entity from its dictionary form.
    ///
    /// Keys the registry does not declare are dropped with a warning; missing
    /// attributes take their defaults.
    pub fn from_record(record: &Map<String, JsonValue>) -> DomainResult<Self> {
        let class = required_str(record, CLASS_TAG)?;
        let kind: EntityKind = class.parse()?;
        let id: EntityId = required_str(record, "id")?.parse()?;
        let created_at = parse_timestamp(required_str(record, "created_at")?)?;
        let updated_at = parse_timestamp(required_str(record, "updated_at")?)?;

        let mut entity = Self::restore(kind, id, created_at, updated_at);
        for (name, value) in record {
            if name == CLASS_TAG || name == "id" || name == "created_at" || name == "updated_at" {
                continue;
            }
            match entity.assign_json(name, value) {
                Ok(()) => {}
                Err(DomainError::InvalidAttribute { .. }) => {
                    tracing::warn!(
                        entity = %entity.key(),
                        attribute = %name,
                        "dropping undeclared attribute from record"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(entity)
    }
}

fn required_str<'a>(record: &'a Map<String, JsonValue>, key: &str) -> DomainResult<&'a str> {
    record
        .get(key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| DomainError::malformed(format!("missing or non-text {key:?}")))
}

impl core::fmt::Display for Entity {
    /// `[Type] (id) {id: .., created_at: .., updated_at: .., attr: value, ..}`
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{}] ({}) {{id: {}, created_at: {}, updated_at: {}",
            self.kind,
            self.id,
            self.id,
            format_timestamp(&self.created_at),
            format_timestamp(&self.updated_at),
        )?;
        for (spec, value) in self.attributes() {
            write!(f, ", {}: {}", spec.name, value)?;
        }
        f.write_str("}")
    }
}
