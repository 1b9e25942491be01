//! Coordinates geofence registration with the geofencing service and the
//! local preference mirror.

use crate::error::RegistryError;
use crate::geofence::NamedGeofence;
use crate::listener::GeofenceListener;
use geofencing_client::{
    GeofencingRequest, GeofencingService, InitialTrigger, SessionId, TransitionTarget,
};
use preference_store::{Edit, PreferenceStore};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

/// Settings applied to every registration.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Route the service calls on geofence transitions
    pub transition_target: TransitionTarget,
    /// Trigger fired if the device is already inside a new fence
    pub initial_trigger: InitialTrigger,
}

impl ControllerSettings {
    pub fn new(transition_target: TransitionTarget) -> Self {
        Self {
            transition_target,
            initial_trigger: InitialTrigger::Enter,
        }
    }
}

/// A single call made inside a service session.
enum ServiceCall<'a> {
    Add(&'a GeofencingRequest),
    Remove(&'a [String]),
}

/// Registry of named geofences.
///
/// Construct one with [`initialize`](Self::initialize) and share it behind an
/// `Arc`. Add and remove operations run one at a time; each holds its own
/// payload and listener, so a queued caller never sees another caller's
/// outcome.
pub struct GeofenceController {
    service: Arc<dyn GeofencingService>,
    store: Arc<dyn PreferenceStore>,
    settings: ControllerSettings,
    /// Sorted by display order, unique by id
    geofences: RwLock<Vec<NamedGeofence>>,
    /// Held for a whole connect, call, update sequence
    operation_lock: Mutex<()>,
}

impl GeofenceController {
    /// Bind the store and service and load every persisted geofence.
    #[instrument(skip_all, fields(namespace = store.namespace()))]
    pub async fn initialize(
        store: Arc<dyn PreferenceStore>,
        service: Arc<dyn GeofencingService>,
        settings: ControllerSettings,
    ) -> Result<Self, RegistryError> {
        let geofences = load_geofences(store.as_ref()).await?;
        info!("Loaded {} geofences", geofences.len());

        Ok(Self {
            service,
            store,
            settings,
            geofences: RwLock::new(geofences),
            operation_lock: Mutex::new(()),
        })
    }

    /// Copy of the current geofences in display order.
    pub async fn named_geofences(&self) -> Vec<NamedGeofence> {
        self.geofences.read().await.clone()
    }

    /// Get a geofence by id.
    pub async fn get(&self, id: &str) -> Option<NamedGeofence> {
        self.geofences
            .read()
            .await
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.geofences.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.geofences.read().await.is_empty()
    }

    /// Register `fence` with the geofencing service and persist it.
    ///
    /// A fence whose id is already registered is replaced.
    #[instrument(skip(self, fence, listener), fields(id = %fence.id))]
    pub async fn add_geofence(
        &self,
        fence: NamedGeofence,
        listener: &dyn GeofenceListener,
    ) -> Result<(), RegistryError> {
        let result = self.add(fence).await;
        notify(listener, result)
    }

    /// Unregister a batch of geofences by id.
    ///
    /// An empty batch does nothing and notifies no one.
    #[instrument(skip(self, fences, listener), fields(count = fences.len()))]
    pub async fn remove_geofences(
        &self,
        fences: &[NamedGeofence],
        listener: &dyn GeofenceListener,
    ) -> Result<(), RegistryError> {
        let ids = unique_ids(fences);
        if ids.is_empty() {
            debug!("No geofences to remove");
            return Ok(());
        }

        let _operation = self.operation_lock.lock().await;
        let result = self.remove_locked(ids).await;
        notify(listener, result)
    }

    /// Unregister every geofence currently in the registry.
    #[instrument(skip(self, listener))]
    pub async fn remove_all_geofences(
        &self,
        listener: &dyn GeofenceListener,
    ) -> Result<(), RegistryError> {
        let _operation = self.operation_lock.lock().await;

        // Snapshot after queueing so fences added by earlier operations are included.
        let ids = unique_ids(&self.geofences.read().await);
        if ids.is_empty() {
            debug!("No geofences to remove");
            return Ok(());
        }

        let result = self.remove_locked(ids).await;
        notify(listener, result)
    }

    async fn add(&self, fence: NamedGeofence) -> Result<(), RegistryError> {
        fence.validate()?;
        let json = fence.to_json()?;
        let request = GeofencingRequest::single(self.settings.initial_trigger, fence.geofence());

        let _operation = self.operation_lock.lock().await;
        debug!(ids = ?request.request_ids(), "Submitting geofence request");
        self.submit(ServiceCall::Add(&request)).await?;

        let mut geofences = self.geofences.write().await;
        self.store.put(&fence.id, &json).await?;

        geofences.retain(|f| f.id != fence.id);
        let position = geofences
            .binary_search_by(|f| f.display_cmp(&fence))
            .unwrap_or_else(|p| p);
        info!(name = %fence.name, "Registered geofence");
        geofences.insert(position, fence);

        Ok(())
    }

    /// Caller must hold `operation_lock`.
    async fn remove_locked(&self, ids: Vec<String>) -> Result<(), RegistryError> {
        self.submit(ServiceCall::Remove(&ids)).await?;

        let mut geofences = self.geofences.write().await;
        self.store
            .apply(ids.iter().map(|id| Edit::remove(id.as_str())).collect())
            .await?;

        let before = geofences.len();
        geofences.retain(|f| !ids.contains(&f.id));
        info!(
            "Removed {} geofences ({} requested)",
            before - geofences.len(),
            ids.len()
        );

        Ok(())
    }

    /// Run one call inside a fresh session, closing the session on every path.
    async fn submit(&self, call: ServiceCall<'_>) -> Result<(), RegistryError> {
        let session = self.service.connect().await.map_err(|e| {
            error!("Connecting to geofencing service failed: {}", e);
            RegistryError::from(e)
        })?;
        debug!("Connected to geofencing service (session {})", session);

        let (action, outcome) = match call {
            ServiceCall::Add(request) => (
                "Registering geofence",
                self.service
                    .add_geofences(&session, request, &self.settings.transition_target)
                    .await,
            ),
            ServiceCall::Remove(ids) => (
                "Removing geofence",
                self.service.remove_geofences(&session, ids).await,
            ),
        };

        self.release(&session).await;

        let status = outcome.map_err(|e| {
            error!("{} failed: {}", action, e);
            RegistryError::from(e)
        })?;

        if !status.is_success() {
            error!("{} failed: {}: {}", action, status.code, status.message());
            return Err(RegistryError::ServiceRejected {
                code: status.code,
                message: status.message().to_string(),
            });
        }

        Ok(())
    }

    async fn release(&self, session: &SessionId) {
        if let Err(e) = self.service.disconnect(session).await {
            warn!("Failed to close geofencing session {}: {}", session, e);
        }
    }
}

/// Read every persisted geofence, skipping records that cannot be used.
async fn load_geofences(store: &dyn PreferenceStore) -> Result<Vec<NamedGeofence>, RegistryError> {
    let entries = store.get_all().await?;
    let mut geofences = Vec::with_capacity(entries.len());

    for (key, json) in entries {
        match NamedGeofence::from_json(&json) {
            Ok(fence) if fence.id == key => geofences.push(fence),
            Ok(fence) => {
                warn!(
                    "Skipping geofence stored under {} with mismatched id {}",
                    key, fence.id
                );
            }
            Err(e) => {
                warn!("Skipping corrupt geofence record {}: {}", key, e);
            }
        }
    }

    geofences.sort_by(NamedGeofence::display_cmp);
    Ok(geofences)
}

/// Ids in first-seen order without duplicates.
fn unique_ids(fences: &[NamedGeofence]) -> Vec<String> {
    let mut seen = HashSet::new();
    fences
        .iter()
        .filter(|f| seen.insert(f.id.as_str()))
        .map(|f| f.id.clone())
        .collect()
}

fn notify(
    listener: &dyn GeofenceListener,
    result: Result<(), RegistryError>,
) -> Result<(), RegistryError> {
    match &result {
        Ok(()) => listener.on_geofences_updated(),
        Err(e) => listener.on_error(e),
    }
    result
}
