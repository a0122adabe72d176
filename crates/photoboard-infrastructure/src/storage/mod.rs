//! Local storage tiers.

mod atomic_json;
mod document_store;
mod key_value_store;
mod tier;

pub use atomic_json::AtomicJsonFile;
pub use document_store::JsonDocumentStore;
pub use key_value_store::{KeyValueStore, STATE_KEY};
pub use tier::StorageTier;
