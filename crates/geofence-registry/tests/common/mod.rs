//! Common test utilities for integration tests.

#![allow(dead_code)]

use geofence_registry::{GeofenceListener, NamedGeofence, RegistryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Counts listener notifications.
#[derive(Default)]
pub struct RecordingListener {
    updated: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updated_count(&self) -> usize {
        self.updated.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl GeofenceListener for RecordingListener {
    fn on_geofences_updated(&self) {
        self.updated.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, error: &RegistryError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// A valid fence with the given id and name.
pub fn fence(id: &str, name: &str) -> NamedGeofence {
    NamedGeofence::new(id, name, 48.8584, 2.2945, 120.0)
}

/// Ids of fences in order.
pub fn ids(fences: &[NamedGeofence]) -> Vec<String> {
    fences.iter().map(|f| f.id.clone()).collect()
}
