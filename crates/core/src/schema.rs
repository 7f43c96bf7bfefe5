//! Entity registry: the declared schema of every entity type.
//!
//! The registry is the single source of truth for which attributes a type
//! carries and how console text is coerced into them (the numeric coercion
//! table is simply the set of `Integer`/`Float` fields below). Both the
//! storage backends and the console consult it; nothing else declares fields.

use core::str::FromStr;

use crate::error::DomainError;
use crate::value::FieldType;

/// Registered entity types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

/// One declared attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

/// Declared schema of one entity type.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: EntityKind,
    /// Relational table name.
    pub table: &'static str,
    /// Attributes in natural (display/serialization) order.
    pub fields: &'static [FieldSpec],
}

/// Attributes every entity carries that the registry does not declare.
pub const AUDIT_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Text,
    }
}

const fn integer(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Integer,
    }
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Float,
    }
}

static USER: Schema = Schema {
    kind: EntityKind::User,
    table: "users",
    fields: &[
        text("email"),
        text("password"),
        text("first_name"),
        text("last_name"),
    ],
};

static STATE: Schema = Schema {
    kind: EntityKind::State,
    table: "states",
    fields: &[text("name")],
};

static CITY: Schema = Schema {
    kind: EntityKind::City,
    table: "cities",
    fields: &[text("state_id"), text("name")],
};

static AMENITY: Schema = Schema {
    kind: EntityKind::Amenity,
    table: "amenities",
    fields: &[text("name")],
};

static PLACE: Schema = Schema {
    kind: EntityKind::Place,
    table: "places",
    fields: &[
        text("city_id"),
        text("user_id"),
        text("name"),
        text("description"),
        integer("number_rooms"),
        integer("number_bathrooms"),
        integer("max_guest"),
        integer("price_by_night"),
        float("latitude"),
        float("longitude"),
        FieldSpec {
            name: "amenity_ids",
            ty: FieldType::IdList,
        },
    ],
};

static REVIEW: Schema = Schema {
    kind: EntityKind::Review,
    table: "reviews",
    fields: &[text("place_id"), text("user_id"), text("text")],
};

impl EntityKind {
    /// Every registered type, in registry order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::User,
        EntityKind::State,
        EntityKind::City,
        EntityKind::Amenity,
        EntityKind::Place,
        EntityKind::Review,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::State => "State",
            EntityKind::City => "City",
            EntityKind::Amenity => "Amenity",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
        }
    }

    /// Look a type up by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            EntityKind::User => &USER,
            EntityKind::State => &STATE,
            EntityKind::City => &CITY,
            EntityKind::Amenity => &AMENITY,
            EntityKind::Place => &PLACE,
            EntityKind::Review => &REVIEW,
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| DomainError::unknown_type(s))
    }
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Attributes whose console text must be parsed as a number.
    pub fn numeric_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.ty.is_numeric())
    }

    /// Attributes stored as plain table columns (id lists live in join tables).
    pub fn column_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.ty != FieldType::IdList)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_the_registry() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.name().parse::<EntityKind>().unwrap(), kind);
            assert_eq!(kind.schema().kind, kind);
        }
    }

    #[test]
    fn unknown_and_miscased_names_are_rejected() {
        assert_eq!(
            "BaseModel".parse::<EntityKind>(),
            Err(DomainError::unknown_type("BaseModel"))
        );
        assert!(EntityKind::from_name("user").is_none());
    }

    #[test]
    fn place_coercion_table() {
        let numeric: Vec<_> = EntityKind::Place
            .schema()
            .numeric_fields()
            .map(|f| (f.name, f.ty))
            .collect();
        assert_eq!(
            numeric,
            vec![
                ("number_rooms", FieldType::Integer),
                ("number_bathrooms", FieldType::Integer),
                ("max_guest", FieldType::Integer),
                ("price_by_night", FieldType::Integer),
                ("latitude", FieldType::Float),
                ("longitude", FieldType::Float),
            ]
        );
        assert!(EntityKind::Place.schema().column_fields().all(|f| f.name != "amenity_ids"));
    }

    #[test]
    fn only_place_has_numeric_fields() {
        for kind in EntityKind::ALL {
            let has_numeric = kind.schema().numeric_fields().next().is_some();
            assert_eq!(has_numeric, kind == EntityKind::Place);
        }
    }

    #[test]
    fn audit_fields_are_never_declared() {
        for kind in EntityKind::ALL {
            for name in AUDIT_FIELDS {
                assert!(kind.schema().field(name).is_none());
            }
        }
    }
}
