//! Namespaced key-value preference storage.
//!
//! Each namespace is a flat map of string keys to string values. Callers
//! encode their own values; geofences are stored as JSON strings keyed by id.

mod error;
mod file;
mod memory;
mod store;

pub use error::PreferenceError;
pub use file::FilePreferences;
pub use memory::MemoryPreferences;
pub use store::{Edit, PreferenceStore};
