//! Geofence Registry - named geofences kept in step with an external
//! geofencing service.
//!
//! The registry:
//! - Registers and removes fences through a [`GeofencingService`] session
//! - Mirrors every confirmed fence into a [`PreferenceStore`] namespace
//! - Reports each operation's outcome to a [`GeofenceListener`]
//!
//! [`GeofencingService`]: geofencing_client::GeofencingService
//! [`PreferenceStore`]: preference_store::PreferenceStore

pub mod config;
pub mod controller;
pub mod error;
pub mod geofence;
pub mod listener;

pub use config::Config;
pub use controller::{ControllerSettings, GeofenceController};
pub use error::RegistryError;
pub use geofence::NamedGeofence;
pub use listener::{GeofenceListener, NoopListener};
