//! Geofencing service client.

mod client;
mod error;
mod service;
mod types;

pub use client::HttpGeofencingClient;
pub use error::GeofencingError;
pub use service::GeofencingService;
pub use types::*;
