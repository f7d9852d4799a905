pub mod config;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
pub mod util;

pub use config::AppConfig;
pub use models::{EnrichedNote, Note, NoteData, Tag};
pub use state::{NoteFilter, NoteStore, NoteStoreContext, StateError};
pub use storage::{KeyValueStore, MemoryStorage, StorageError};

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

/// Open the note store over browser local storage.
///
/// Falls back to an in-memory store (with a warning) when local storage
/// is unavailable.
pub fn open_note_store(config: &AppConfig) -> NoteStore {
    NoteStore::open(storage::open_local_storage(), config)
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::new();
    if let Err(e) = logging::init_logging(&config.log_level) {
        let _ = logging::init_logging("info");
        log::warn!("{e}; using `info`");
    }
    log::info!(
        "tagnotes core ready (storage prefix: {:?})",
        config.storage_prefix
    );
}
