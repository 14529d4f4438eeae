//! Browser-side smoke test over the real localStorage/BroadcastChannel
//! backends. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use arkiv_frontend_rs::{PlaceDraft, TripStore};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn store_persists_through_real_local_storage() {
    let store = TripStore::new("wasm-smoke".to_string());
    // Earlier runs on the same browser profile may have left state behind.
    store.set_places(Vec::new());
    let id = store.add_place(1, PlaceDraft::named("Gate"));
    store.dispose();

    let reopened = TripStore::new("wasm-smoke".to_string());
    let places = reopened.places();
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].id, id);
    assert_eq!(places[0].name, "Gate");
    reopened.dispose();
}
