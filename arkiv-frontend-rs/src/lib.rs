#![deny(clippy::string_slice)]

pub mod ai;
pub mod receipt;
pub mod reorder;
pub mod route;
pub mod store;
mod utils;

pub use store::TripStore;
pub use trip_utils::{Place, PlaceDraft, PlaceUpdate, TripMetadata};

use std::sync::LazyLock;

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    // wasm-logger writes through the browser console, which only exists on
    // wasm32; elsewhere the `log` facade stays un-backed and records nothing.
    #[cfg(target_arch = "wasm32")]
    {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Logging initialized");
    }
});

pub(crate) fn init_logging() {
    // used to only initialize the logger once
    #[allow(clippy::borrow_interior_mutable_const)]
    *LOGGER;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_logging_is_repeatable_off_wasm() {
        super::init_logging();
        super::init_logging();
    }
}
