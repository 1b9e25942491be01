//! Geofencing service types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code the service uses for a successful call.
pub const STATUS_SUCCESS: i32 = 0;

/// A geofence transition the service can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Enter,
    Exit,
    Dwell,
}

/// Which transition fires immediately if the device is already inside a
/// fence when it is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialTrigger {
    #[default]
    Enter,
    Exit,
    Dwell,
}

/// A circular region as the geofencing service understands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub request_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters
    pub radius: f32,
    pub transition_types: Vec<Transition>,
    /// Lifetime in milliseconds; `None` never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loitering_delay_ms: Option<u64>,
}

/// A batch of geofences submitted in a single add call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofencingRequest {
    pub initial_trigger: InitialTrigger,
    pub geofences: Vec<Geofence>,
}

impl GeofencingRequest {
    /// Create a request for a single geofence.
    pub fn single(initial_trigger: InitialTrigger, geofence: Geofence) -> Self {
        Self {
            initial_trigger,
            geofences: vec![geofence],
        }
    }

    /// Request ids of every geofence in the batch.
    pub fn request_ids(&self) -> Vec<&str> {
        self.geofences.iter().map(|g| g.request_id.as_str()).collect()
    }
}

/// Route the service calls when a registered fence sees a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTarget {
    pub route: String,
}

impl TransitionTarget {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

/// Handle for an open service connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result status of an add or remove call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Status {
    /// Create a success status.
    pub fn success() -> Self {
        Self {
            code: STATUS_SUCCESS,
            message: None,
        }
    }

    /// Create a failure status.
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == STATUS_SUCCESS
    }

    /// Status message, or an empty string when the service sent none.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Response to opening a session.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionResponse {
    pub session_id: SessionId,
}

/// Add geofences request body.
#[derive(Debug, Serialize)]
pub(crate) struct AddGeofencesBody<'a> {
    pub request: &'a GeofencingRequest,
    pub target: &'a TransitionTarget,
}

/// Remove geofences request body.
#[derive(Debug, Serialize)]
pub(crate) struct RemoveGeofencesBody<'a> {
    pub ids: &'a [String],
}
