//! Operation outcome callbacks.

use crate::error::RegistryError;

/// Receives the outcome of one add or remove operation.
///
/// Exactly one method is called per completed operation, except for an
/// empty removal batch, which calls neither.
pub trait GeofenceListener: Send + Sync {
    /// The operation succeeded; the list and the store agree.
    fn on_geofences_updated(&self);

    /// The operation did not complete.
    fn on_error(&self, error: &RegistryError);
}

/// Listener that ignores every outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl GeofenceListener for NoopListener {
    fn on_geofences_updated(&self) {}

    fn on_error(&self, _error: &RegistryError) {}
}
