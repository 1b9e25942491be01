//! Geofencing HTTP client.

use crate::error::GeofencingError;
use crate::service::GeofencingService;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use urlencoding::encode;

/// REST client for a geofencing service.
///
/// The API key is stored using `SecretString` to keep it out of logs and
/// debug output.
#[derive(Clone)]
pub struct HttpGeofencingClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpGeofencingClient {
    /// Create a new geofencing client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeofencingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the geofencing service is healthy.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn session_url(&self, session: &SessionId) -> String {
        format!("{}/v1/sessions/{}", self.base_url, encode(session.as_str()))
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    /// Decode a successful response, or map the failure.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, GeofencingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(GeofencingError::ConnectionSuspended(message));
        }

        Err(GeofencingError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl GeofencingService for HttpGeofencingClient {
    #[instrument(skip(self))]
    async fn connect(&self) -> Result<SessionId, GeofencingError> {
        let response = self
            .client
            .post(format!("{}/v1/sessions", self.base_url))
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(|e| GeofencingError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            let msg = response.text().await.unwrap_or_default();
            return Err(GeofencingError::ConnectionSuspended(msg));
        }
        if !status.is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(GeofencingError::ConnectionFailed(format!(
                "{}: {}",
                status.as_u16(),
                msg
            )));
        }

        let session: SessionResponse = response.json().await?;
        debug!("Opened geofencing session {}", session.session_id);
        Ok(session.session_id)
    }

    #[instrument(skip(self, request, target), fields(count = request.geofences.len()))]
    async fn add_geofences(
        &self,
        session: &SessionId,
        request: &GeofencingRequest,
        target: &TransitionTarget,
    ) -> Result<Status, GeofencingError> {
        let body = AddGeofencesBody { request, target };

        let response = self
            .client
            .post(format!("{}/geofences", self.session_url(session)))
            .header("Authorization", self.authorization())
            .json(&body)
            .send()
            .await?;

        let status: Status = self.handle_response(response).await?;
        debug!("Add geofences returned status {}", status.code);
        Ok(status)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn remove_geofences(
        &self,
        session: &SessionId,
        ids: &[String],
    ) -> Result<Status, GeofencingError> {
        let body = RemoveGeofencesBody { ids };

        let response = self
            .client
            .post(format!("{}/geofences/remove", self.session_url(session)))
            .header("Authorization", self.authorization())
            .json(&body)
            .send()
            .await?;

        let status: Status = self.handle_response(response).await?;
        debug!("Remove geofences returned status {}", status.code);
        Ok(status)
    }

    #[instrument(skip(self))]
    async fn disconnect(&self, session: &SessionId) -> Result<(), GeofencingError> {
        let response = self
            .client
            .delete(self.session_url(session))
            .header("Authorization", self.authorization())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            debug!("Closing session {} failed: {}", session, message);
            return Err(GeofencingError::Api { status, message });
        }

        debug!("Closed geofencing session {}", session);
        Ok(())
    }
}
