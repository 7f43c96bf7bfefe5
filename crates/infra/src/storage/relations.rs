//! Relationship views.
//!
//! Relationships are never stored on entities: each view scans the live set
//! through the storage contract, so both backends answer identically.

use hbnb_core::{AttrValue, Entity, EntityKind};

use super::r#trait::{Storage, StorageError};

/// Cities whose `state_id` points at `state`.
pub fn cities_of_state<S>(storage: &S, state: &Entity) -> Result<Vec<Entity>, StorageError>
where
    S: Storage + ?Sized,
{
    storage.find_by_foreign_key(EntityKind::City, "state_id", state.id().as_str())
}

/// Places located in `city`.
pub fn places_of_city<S>(storage: &S, city: &Entity) -> Result<Vec<Entity>, StorageError>
where
    S: Storage + ?Sized,
{
    storage.find_by_foreign_key(EntityKind::Place, "city_id", city.id().as_str())
}

/// Places owned by `user`.
pub fn places_of_user<S>(storage: &S, user: &Entity) -> Result<Vec<Entity>, StorageError>
where
    S: Storage + ?Sized,
{
    storage.find_by_foreign_key(EntityKind::Place, "user_id", user.id().as_str())
}

/// Reviews written about `place`.
pub fn reviews_of_place<S>(storage: &S, place: &Entity) -> Result<Vec<Entity>, StorageError>
where
    S: Storage + ?Sized,
{
    storage.find_by_foreign_key(EntityKind::Review, "place_id", place.id().as_str())
}

/// Reviews written by `user`.
pub fn reviews_of_user<S>(storage: &S, user: &Entity) -> Result<Vec<Entity>, StorageError>
where
    S: Storage + ?Sized,
{
    storage.find_by_foreign_key(EntityKind::Review, "user_id", user.id().as_str())
}

/// Amenities linked to `place`, in link order.
///
/// Links to amenities that no longer exist are skipped.
pub fn amenities_of_place<S>(storage: &S, place: &Entity) -> Result<Vec<Entity>, StorageError>
where
    S: Storage + ?Sized,
{
    let Some(ids) = place.get("amenity_ids").and_then(AttrValue::as_ids) else {
        return Ok(Vec::new());
    };
    let mut amenities = storage.all(Some(EntityKind::Amenity))?;
    Ok(ids
        .iter()
        .filter_map(|id| amenities.remove(&hbnb_core::composite_key(EntityKind::Amenity, id)))
        .collect())
}
