//! Named geofence records.

use crate::error::RegistryError;
use geofencing_client::{Geofence, Transition};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;

/// A geofence with a caller-assigned id and display name.
///
/// Persisted as JSON under its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedGeofence {
    /// Unique identifier, also the geofencing service request id
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Center latitude in degrees
    pub latitude: f64,

    /// Center longitude in degrees
    pub longitude: f64,

    /// Radius in meters
    pub radius: f32,

    /// Transitions the service should report
    #[serde(default = "default_transition_types")]
    pub transition_types: Vec<Transition>,

    /// Lifetime of the fence in milliseconds; absent means it never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_ms: Option<u64>,
}

fn default_transition_types() -> Vec<Transition> {
    vec![Transition::Enter]
}

impl NamedGeofence {
    /// Create an enter-triggered fence that never expires.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        radius: f32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            radius,
            transition_types: default_transition_types(),
            expiration_ms: None,
        }
    }

    /// Expire the fence after `expiration`.
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration_ms = Some(u64::try_from(expiration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Check that the fence can be registered.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.id.trim().is_empty() {
            return Err(RegistryError::InvalidGeofence("id must not be empty".into()));
        }

        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidGeofence(format!(
                "{}: name must not be empty",
                self.id
            )));
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(RegistryError::InvalidGeofence(format!(
                "{}: latitude {} out of range",
                self.id, self.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(RegistryError::InvalidGeofence(format!(
                "{}: longitude {} out of range",
                self.id, self.longitude
            )));
        }

        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(RegistryError::InvalidGeofence(format!(
                "{}: radius must be a positive number of meters",
                self.id
            )));
        }

        if self.transition_types.is_empty() {
            return Err(RegistryError::InvalidGeofence(format!(
                "{}: at least one transition type is required",
                self.id
            )));
        }

        Ok(())
    }

    /// The fence as submitted to the geofencing service.
    pub fn geofence(&self) -> Geofence {
        Geofence {
            request_id: self.id.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            radius: self.radius,
            transition_types: self.transition_types.clone(),
            expiration_ms: self.expiration_ms,
            loitering_delay_ms: None,
        }
    }

    /// Display order: case-insensitive name, then id.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.id.cmp(&other.id))
    }

    pub fn to_json(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }
}
