//! The geofencing service seam.

use crate::error::GeofencingError;
use crate::types::*;
use async_trait::async_trait;

/// An external service that monitors geofences.
///
/// Every add or remove happens inside a session opened by [`connect`] and
/// closed by [`disconnect`]. A non-success [`Status`] is returned as `Ok`;
/// `Err` means the call itself did not reach a verdict.
///
/// [`connect`]: GeofencingService::connect
/// [`disconnect`]: GeofencingService::disconnect
#[async_trait]
pub trait GeofencingService: Send + Sync {
    /// Open a session.
    async fn connect(&self) -> Result<SessionId, GeofencingError>;

    /// Register the geofences in `request`. Transitions are delivered to `target`.
    async fn add_geofences(
        &self,
        session: &SessionId,
        request: &GeofencingRequest,
        target: &TransitionTarget,
    ) -> Result<Status, GeofencingError>;

    /// Unregister geofences by request id.
    async fn remove_geofences(
        &self,
        session: &SessionId,
        ids: &[String],
    ) -> Result<Status, GeofencingError>;

    /// Close a session.
    async fn disconnect(&self, session: &SessionId) -> Result<(), GeofencingError>;
}
