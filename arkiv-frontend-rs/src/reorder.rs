//! Drag-end handling: moves one place to a new position in the canonical
//! sequence and adopts the drop target's day.
//!
//! Day columns are a display filter over the one flat sequence, so dragging a
//! card into another day's column is a plain single-element move plus an
//! explicit rewrite of the moved card's `day`. Without that rewrite the card
//! would snap back to its old column on the next render.

use im::Vector;
use trip_utils::Place;

/// Computes the sequence after dragging `active_id` onto `over_id`.
///
/// Returns `None` when nothing changes: the card was dropped onto itself, or
/// the dragged id no longer resolves to a place. A stale *target* id (removed
/// concurrently by a sibling view) still moves the card, clamped to the end of
/// the sequence, and leaves its day untouched.
///
/// The resulting `day` is not validated against the trip duration here; drop
/// targets are always real placed cards, so the value adopted is one that some
/// existing card already carried.
pub fn move_place(
    places: &Vector<Place>,
    active_id: &str,
    over_id: &str,
) -> Option<Vector<Place>> {
    if active_id == over_id {
        return None;
    }
    let old_index = places.iter().position(|p| p.id == active_id)?;
    let target = places
        .iter()
        .enumerate()
        .find(|(_, place)| place.id == over_id);

    let mut updated = places.clone();
    let mut moved = updated.remove(old_index);

    let (insert_at, adopted_day) = match target {
        Some((index, place)) => (index.min(updated.len()), Some(place.day)),
        None => (updated.len(), None),
    };
    if let Some(day) = adopted_day {
        moved.day = day;
    }
    updated.insert(insert_at, moved);
    Some(updated)
}
