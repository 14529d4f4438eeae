//! The per-trip state owner.
//!
//! One `TripStore` holds the authoritative in-memory `{places, meta}` snapshot
//! for a single trip id and mediates every read and write for the view layer.
//! Each mutating call, on completion, durably saves the full snapshot and then
//! broadcasts it to sibling views of the same trip, in that order; one persist
//! and one broadcast per user action, no batching. A broadcast received from a
//! sibling replaces the local snapshot unconditionally: last write wins, with
//! no version reconciliation. Concurrent edits in two open views can clobber
//! each other; that is a known limitation of the snapshot design.
//!
//! btw, we should never hold a borrow across an .await. by avoiding this, we
//! guarantee the absence of "borrow while locked" panics

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use im::Vector;
use reel::channel::SyncChannel;
use reel::storage::KeyValueStorage;
use trip_utils::{Place, PlaceDraft, PlaceUpdate, TripMetadata};
use wasm_bindgen::prelude::*;

use crate::{ai, receipt, reorder, route};

/// Storage namespace shared by every trip on this origin.
const STORAGE_PREFIX: &str = "lucky_arkiv_v11_";

/// The one message shape on a trip's sync channel: the full snapshot.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
enum SyncMessage {
    #[serde(rename = "SYNC_DATA")]
    SyncData {
        places: Vec<Place>,
        meta: TripMetadata,
    },
}

struct TripState {
    places: Vector<Place>,
    meta: TripMetadata,
}

type Listener = Rc<dyn Fn()>;

/// State reachable from both the store and the sync-channel callback.
struct SharedState {
    state: RefCell<TripState>,
    listeners: RefCell<BTreeMap<u32, Listener>>,
}

impl SharedState {
    fn notify(&self) {
        // Clone the callbacks out first; a listener may call back into the
        // store, which needs the borrow released.
        let callbacks: Vec<Listener> = self.listeners.borrow().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub struct TripStore {
    trip_id: String,
    shared: Rc<SharedState>,
    storage: KeyValueStorage,
    channel: RefCell<Option<SyncChannel<SyncMessage>>>,
    next_listener: Cell<u32>,
    suggest_generation: Cell<u64>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl TripStore {
    /// Opens the store for one trip id. Absent or corrupt persisted documents
    /// read as defaults (empty places, placeholder metadata), never as errors.
    /// Joins the trip's sync channel; if the channel can't be opened the store
    /// still works, just unsynced.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(trip_id: String) -> TripStore {
        crate::init_logging();

        let storage = KeyValueStorage::new(STORAGE_PREFIX);
        let meta: TripMetadata = storage
            .load(&format!("{trip_id}_meta"))
            .unwrap_or_default();
        let places: Vec<Place> = storage
            .load(&format!("{trip_id}_places"))
            .unwrap_or_default();

        let shared = Rc::new(SharedState {
            state: RefCell::new(TripState {
                places: Vector::from(places),
                meta,
            }),
            listeners: RefCell::new(BTreeMap::new()),
        });

        let channel = match SyncChannel::open(&format!("sync_{trip_id}")) {
            Ok(mut channel) => {
                let shared = Rc::clone(&shared);
                channel.subscribe(move |message: SyncMessage| {
                    let SyncMessage::SyncData { places, meta } = message;
                    {
                        let mut state = shared.state.borrow_mut();
                        state.places = Vector::from(places);
                        state.meta = meta;
                    }
                    shared.notify();
                });
                Some(channel)
            }
            Err(e) => {
                log::error!("Trip {trip_id} will run unsynced: {e}");
                None
            }
        };

        TripStore {
            trip_id,
            shared,
            storage,
            channel: RefCell::new(channel),
            next_listener: Cell::new(0),
            suggest_generation: Cell::new(0),
        }
    }

    /// Releases the trip: closes the sync channel, drops listeners, and marks
    /// any in-flight suggestion request stale. Persisted state is untouched.
    pub fn dispose(&self) {
        self.suggest_generation
            .set(self.suggest_generation.get() + 1);
        if let Some(mut channel) = self.channel.borrow_mut().take() {
            channel.close();
        }
        self.shared.listeners.borrow_mut().clear();
    }

    // =======
    // reads
    // =======

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn trip_id(&self) -> String {
        self.trip_id.clone()
    }

    pub fn places(&self) -> Vec<Place> {
        self.shared.state.borrow().places.iter().cloned().collect()
    }

    pub fn metadata(&self) -> TripMetadata {
        self.shared.state.borrow().meta.clone()
    }

    /// Day columns are a filter over the canonical sequence, nothing more.
    pub fn places_for_day(&self, day: u32) -> Vec<Place> {
        self.shared
            .state
            .borrow()
            .places
            .iter()
            .filter(|place| place.day == day)
            .cloned()
            .collect()
    }

    /// Share of places marked visited, for the footer progress bar.
    pub fn visited_fraction(&self) -> f64 {
        let state = self.shared.state.borrow();
        if state.places.is_empty() {
            return 0.0;
        }
        let visited = state.places.iter().filter(|place| place.visited).count();
        visited as f64 / state.places.len() as f64
    }

    pub fn share_url(&self, origin: &str) -> String {
        format!("{origin}#/trip/{}", self.trip_id)
    }

    // =======
    // writes (each one persists, broadcasts, then notifies)
    // =======

    /// Full-sequence replacement.
    pub fn set_places(&self, places: Vec<Place>) {
        self.shared.state.borrow_mut().places = Vector::from(places);
        self.after_mutation();
    }

    /// Full-metadata replacement.
    pub fn set_metadata(&self, meta: TripMetadata) {
        self.shared.state.borrow_mut().meta = meta;
        self.after_mutation();
    }

    /// Appends a new place built from the draft, with a fresh id and every
    /// omitted field defaulted. Returns the new id.
    pub fn add_place(&self, day: u32, draft: PlaceDraft) -> String {
        let id = route::fresh_place_id();
        let place = Place::from_draft(id.clone(), day, draft);
        self.shared.state.borrow_mut().places.push_back(place);
        self.after_mutation();
        id
    }

    /// Replaces exactly one field on exactly one place. Unknown ids are a
    /// silent no-op.
    pub fn update_place(&self, place_id: String, update: PlaceUpdate) {
        self.with_place(&place_id, |place| update.apply(place));
    }

    pub fn toggle_visited(&self, place_id: String) {
        self.with_place(&place_id, |place| place.visited = !place.visited);
    }

    pub fn remove_place(&self, place_id: String) {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            match state.places.iter().position(|place| place.id == place_id) {
                Some(index) => {
                    state.places.remove(index);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.after_mutation();
        }
    }

    pub fn add_photo(&self, place_id: String, photo: String) {
        self.with_place(&place_id, |place| place.photos.push(photo));
    }

    pub fn remove_photo(&self, place_id: String, index: u32) {
        self.with_place(&place_id, |place| {
            let index = index as usize;
            if index < place.photos.len() {
                place.photos.remove(index);
            }
        });
    }

    pub fn set_day_title(&self, day: u32, title: String) {
        self.shared
            .state
            .borrow_mut()
            .meta
            .day_titles
            .insert(day, title);
        self.after_mutation();
    }

    /// Adds one more day slot. Duration never shrinks, so existing `day`
    /// values stay valid forever.
    pub fn grow_duration(&self) {
        self.shared.state.borrow_mut().meta.duration += 1;
        self.after_mutation();
    }

    /// Drag-end: moves the dragged place to the drop target's position and
    /// adopts its day. Dropping a card onto itself (or a stale drag) changes
    /// nothing and skips the persist/broadcast cycle.
    pub fn reorder(&self, active_id: String, over_id: String) {
        let reordered = {
            let state = self.shared.state.borrow();
            reorder::move_place(&state.places, &active_id, &over_id)
        };
        if let Some(places) = reordered {
            self.shared.state.borrow_mut().places = places;
            self.after_mutation();
        }
    }

    // =======
    // change listeners
    // =======

    pub fn subscribe(&self, callback: js_sys::Function) -> u32 {
        self.subscribe_rust(move || {
            #[cfg(target_arch = "wasm32")]
            {
                let this = JsValue::null();
                let _ = callback.call0(&this);
            }
            #[cfg(not(target_arch = "wasm32"))]
            let _ = &callback;
        })
    }

    pub fn unsubscribe(&self, key: u32) {
        self.shared.listeners.borrow_mut().remove(&key);
    }

    // =======
    // AI collaborator actions
    // =======

    /// Fills one day with suggested places. No fallback: a failed generation
    /// propagates, and retrying is the caller's decision. A result that
    /// arrives after `dispose` (or after a newer request superseded it) is
    /// discarded.
    pub async fn generate_suggestions(&self, day: u32) -> Result<u32, JsValue> {
        let generation = self.begin_suggestion_request();
        let destination = self.shared.state.borrow().meta.destination.clone();
        let drafts = ai::suggest_itinerary(&destination, day)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(self.append_suggestions(day, drafts, generation) as u32)
    }

    /// Adds a place extracted from pasted free text (a name, a note, a map
    /// link). Extraction failures degrade to a draft named from the text
    /// itself, so this always appends something. Returns the new id.
    pub async fn add_place_from_text(&self, day: u32, input: String) -> String {
        let draft = ai::extract_place_info(&input).await;
        self.add_place(day, draft)
    }

    /// Fetches a one-line tip and appends it to the place's description. A
    /// stale place id is a no-op; a failed fetch leaves the field unchanged.
    pub async fn fetch_tip(&self, place_id: String) -> Result<(), JsValue> {
        let Some(name) = self.place_field(&place_id, |place| place.name.clone()) else {
            return Ok(());
        };
        let tip = ai::quick_tip(&name)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.with_place(&place_id, |place| {
            place.description = ai::with_tip(&place.description, &tip);
        });
        Ok(())
    }

    /// Replaces the place's description with its translation. A stale id or
    /// empty description is a no-op; a failed call leaves the field unchanged.
    pub async fn translate_description(&self, place_id: String) -> Result<(), JsValue> {
        let Some(description) = self.place_field(&place_id, |place| place.description.clone())
        else {
            return Ok(());
        };
        if description.is_empty() {
            return Ok(());
        }
        let translation = ai::translate(&description)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.with_place(&place_id, |place| place.description = translation);
        Ok(())
    }

    /// Builds the settlement receipt, fetching one live rate per foreign
    /// currency present (failed lookups settle at rate 1).
    pub async fn settle(&self) -> Result<JsValue, JsValue> {
        let places = self.places();
        let rates = receipt::collect_rates(&places).await;
        let receipt = receipt::build_receipt(&places, &rates);
        serde_wasm_bindgen::to_value(&receipt)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
    }
}

impl TripStore {
    fn subscribe_rust(&self, callback: impl Fn() + 'static) -> u32 {
        let key = self.next_listener.get();
        self.next_listener.set(key + 1);
        self.shared
            .listeners
            .borrow_mut()
            .insert(key, Rc::new(callback));
        key
    }

    /// Applies `mutate` to the place with this id; unknown ids are a silent
    /// no-op and skip the persist/broadcast cycle.
    fn with_place(&self, place_id: &str, mutate: impl FnOnce(&mut Place)) {
        let changed = {
            let mut state = self.shared.state.borrow_mut();
            match state.places.iter().position(|place| place.id == place_id) {
                Some(index) => {
                    let mut place = state.places[index].clone();
                    mutate(&mut place);
                    state.places.set(index, place);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.after_mutation();
        }
    }

    fn place_field<T>(&self, place_id: &str, read: impl Fn(&Place) -> T) -> Option<T> {
        self.shared
            .state
            .borrow()
            .places
            .iter()
            .find(|place| place.id == place_id)
            .map(read)
    }

    /// Marks the start of a suggestion request. Each new request (and
    /// `dispose`) advances the counter, so only the newest request's result
    /// still matches when it lands.
    fn begin_suggestion_request(&self) -> u64 {
        let generation = self.suggest_generation.get() + 1;
        self.suggest_generation.set(generation);
        generation
    }

    /// Appends suggested places unless the store moved on (disposed, or a
    /// newer generation started) while the request was in flight.
    fn append_suggestions(&self, day: u32, drafts: Vec<PlaceDraft>, generation: u64) -> usize {
        if generation != self.suggest_generation.get() {
            log::info!("Discarding {} stale suggestions for day {day}", drafts.len());
            return 0;
        }
        let count = drafts.len();
        if count == 0 {
            return 0;
        }
        {
            let mut state = self.shared.state.borrow_mut();
            for draft in drafts {
                let place = Place::from_draft(route::fresh_suggestion_id(), day, draft);
                state.places.push_back(place);
            }
        }
        self.after_mutation();
        count
    }

    /// The side-effect contract of every mutating operation: durably save the
    /// full snapshot, then broadcast it, then tell local listeners.
    fn after_mutation(&self) {
        let (places, meta) = {
            let state = self.shared.state.borrow();
            let places: Vec<Place> = state.places.iter().cloned().collect();
            (places, state.meta.clone())
        };
        self.storage.save(&format!("{}_places", self.trip_id), &places);
        self.storage.save(&format!("{}_meta", self.trip_id), &meta);
        if let Some(channel) = self.channel.borrow().as_ref() {
            channel.publish(&SyncMessage::SyncData { places, meta });
        }
        self.shared.notify();
    }
}
