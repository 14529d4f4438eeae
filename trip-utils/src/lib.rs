pub mod cost;
pub mod text_cleanup;

use std::collections::BTreeMap;

/// Destination shown when a trip is opened before its metadata was ever saved.
pub const DEFAULT_DESTINATION: &str = "LUCKY ARCHIVE";

/// Number of day slots a freshly created trip starts with.
pub const DEFAULT_DURATION: u32 = 3;

/// One itinerary entry belonging to a specific day within a trip.
///
/// Free-text fields use the empty string for "absent". `photos` holds embedded
/// data-URL blobs and is append/remove only. The order of places in a trip's
/// sequence is the canonical display/drag order; day grouping is a filter over
/// that sequence, not a separate structure.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub day: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub music_link: String,
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Place {
    /// Builds a full place from a draft, defaulting every omitted field to the
    /// empty string. `visited` starts false and the photo gallery starts empty.
    pub fn from_draft(id: String, day: u32, draft: PlaceDraft) -> Place {
        Place {
            id,
            day,
            name: draft.name.unwrap_or_default(),
            category: draft.category.unwrap_or_default(),
            transport: draft.transport.unwrap_or_default(),
            cost: draft.cost.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            music_link: String::new(),
            visited: false,
            photos: Vec::new(),
        }
    }
}

/// Trip-level metadata persisted separately from the place sequence.
///
/// `duration` only ever grows, so existing `Place::day` values stay valid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct TripMetadata {
    pub destination: String,
    pub duration: u32,
    #[serde(default)]
    pub day_titles: BTreeMap<u32, String>,
}

impl TripMetadata {
    pub fn new(destination: impl Into<String>) -> TripMetadata {
        TripMetadata {
            destination: destination.into(),
            duration: DEFAULT_DURATION,
            day_titles: BTreeMap::new(),
        }
    }
}

impl Default for TripMetadata {
    fn default() -> Self {
        TripMetadata::new(DEFAULT_DESTINATION)
    }
}

/// A typed partial place, as produced by the AI collaborator or the add-place
/// form. Unknown fields fail deserialization instead of being splatted into
/// state; missing fields are treated as absent.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PlaceDraft {
    pub fn named(name: impl Into<String>) -> PlaceDraft {
        PlaceDraft {
            name: Some(name.into()),
            ..PlaceDraft::default()
        }
    }

    /// Drops placeholder text the model sometimes echoes instead of leaving a
    /// field empty ("estimated cost", "no description provided", ...).
    pub fn scrubbed(self) -> PlaceDraft {
        PlaceDraft {
            transport: self
                .transport
                .map(|t| text_cleanup::scrub_placeholder(&t, "estimated")),
            cost: self
                .cost
                .map(|c| text_cleanup::scrub_placeholder(&c, "estimated")),
            description: self
                .description
                .map(|d| text_cleanup::scrub_placeholder(&d, "no description")),
            ..self
        }
    }
}

/// A single-field update request for one place. Replaces exactly one field;
/// the store treats an unknown place id as a no-op.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum PlaceUpdate {
    Name(String),
    Category(String),
    Transport(String),
    Cost(String),
    Description(String),
    MusicLink(String),
    Photos(Vec<String>),
}

impl PlaceUpdate {
    pub fn apply(self, place: &mut Place) {
        match self {
            PlaceUpdate::Name(v) => place.name = v,
            PlaceUpdate::Category(v) => place.category = v,
            PlaceUpdate::Transport(v) => place.transport = v,
            PlaceUpdate::Cost(v) => place.cost = v,
            PlaceUpdate::Description(v) => place.description = v,
            PlaceUpdate::MusicLink(v) => place.music_link = v,
            PlaceUpdate::Photos(v) => place.photos = v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_json_uses_camel_case_field_names() {
        let place = Place::from_draft("pl-1".to_string(), 1, PlaceDraft::named("Gate"));
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["musicLink"], "");
        assert_eq!(json["name"], "Gate");
        assert_eq!(json["visited"], false);
    }

    #[test]
    fn place_json_round_trips() {
        let mut place = Place::from_draft("pl-1".to_string(), 2, PlaceDraft::named("Gate"));
        place.photos.push("data:image/png;base64,AAAA".to_string());
        let json = serde_json::to_string(&place).unwrap();
        let restored: Place = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, place);
        // Serializing again is byte-for-byte stable.
        assert_eq!(serde_json::to_string(&restored).unwrap(), json);
    }

    #[test]
    fn metadata_day_titles_serialize_as_object_keyed_by_day() {
        let mut meta = TripMetadata::new("Kyoto");
        meta.day_titles.insert(2, "Temples".to_string());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["dayTitles"]["2"], "Temples");
        assert_eq!(json["duration"], 3);
    }

    #[test]
    fn default_metadata_matches_unsaved_trip_shape() {
        let meta = TripMetadata::default();
        assert_eq!(meta.destination, DEFAULT_DESTINATION);
        assert_eq!(meta.duration, 3);
        assert!(meta.day_titles.is_empty());
    }

    #[test]
    fn draft_rejects_unknown_fields() {
        let result: Result<PlaceDraft, _> =
            serde_json::from_str(r#"{"name":"Gate","rating":5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn draft_missing_fields_default_to_empty_on_place() {
        let place = Place::from_draft("pl-2".to_string(), 1, PlaceDraft::default());
        assert_eq!(place.name, "");
        assert_eq!(place.category, "");
        assert!(!place.visited);
        assert!(place.photos.is_empty());
    }

    #[test]
    fn scrubbed_draft_drops_placeholder_text() {
        let draft = PlaceDraft {
            name: Some("Gate".to_string()),
            transport: Some("Estimated 20 min by bus".to_string()),
            cost: Some("1000 yen".to_string()),
            description: Some("No description available".to_string()),
            ..PlaceDraft::default()
        }
        .scrubbed();
        assert_eq!(draft.transport.as_deref(), Some(""));
        assert_eq!(draft.cost.as_deref(), Some("1000 yen"));
        assert_eq!(draft.description.as_deref(), Some(""));
    }

    #[test]
    fn update_replaces_exactly_one_field() {
        let mut place = Place::from_draft("pl-3".to_string(), 1, PlaceDraft::named("Gate"));
        PlaceUpdate::Cost("12 usd".to_string()).apply(&mut place);
        assert_eq!(place.cost, "12 usd");
        assert_eq!(place.name, "Gate");
    }
}
