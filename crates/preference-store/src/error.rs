//! Preference storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),
}
