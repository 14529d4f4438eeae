//! URL-fragment navigation surface and id tokens.
//!
//! Trip selection is driven purely by the location hash: a fragment containing
//! `trip/<id>` opens that trip, anything else is the landing view. The hash is
//! passed in from the host page; this module never touches `window` itself.

use std::cell::Cell;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Extracts the trip id from a location hash like `"#/trip/trip_1712345-0"`.
/// The id is the maximal run of `[a-zA-Z0-9_-]` after the first `trip/`.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn parse_trip_route(hash: &str) -> Option<String> {
    let (_, rest) = hash.split_once("trip/")?;
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if id.is_empty() { None } else { Some(id) }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn fresh_trip_id() -> String {
    format!("trip_{}-{}", now_millis(), session_token())
}

pub fn fresh_place_id() -> String {
    format!("pl-{}-{}", now_millis(), session_token())
}

pub fn fresh_suggestion_id() -> String {
    format!("ai-{}-{}", now_millis(), session_token())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

thread_local! {
    static SESSION_TOKEN: Cell<u64> = const { Cell::new(0) };
}

// Several ids can be minted within one millisecond, so the timestamp alone is
// not enough to keep them unique.
fn session_token() -> u64 {
    SESSION_TOKEN.with(|token| {
        let next = token.get();
        token.set(next + 1);
        next
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hash_with_leading_slash() {
        assert_eq!(
            parse_trip_route("#/trip/trip_17-0"),
            Some("trip_17-0".to_string())
        );
    }

    #[test]
    fn test_parse_stops_at_invalid_characters() {
        assert_eq!(
            parse_trip_route("#/trip/abc_DEF-9?tab=2"),
            Some("abc_DEF-9".to_string())
        );
    }

    #[test]
    fn test_parse_landing_hash() {
        assert_eq!(parse_trip_route(""), None);
        assert_eq!(parse_trip_route("#/about"), None);
    }

    #[test]
    fn test_parse_trip_prefix_without_id() {
        assert_eq!(parse_trip_route("#/trip/"), None);
    }

    #[test]
    fn test_fresh_ids_are_unique_within_a_burst() {
        let a = fresh_place_id();
        let b = fresh_place_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fresh_trip_id_round_trips_through_route() {
        let id = fresh_trip_id();
        let hash = format!("#/trip/{id}");
        assert_eq!(parse_trip_route(&hash), Some(id));
    }
}
