//! Alert Notification Service (ANS) producer client
//!
//! An [`Ans`] client reads its credentials from a [`ServiceKey`], acquires
//! an XSUAA token with them and posts caller-supplied [`Event`]s to
//! `<url>/cf/producer/v1/resource-events`.

pub mod event;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceKitError};
use crate::http::{header_map, HttpClient, Sender};
use crate::xsuaa::Xsuaa;

pub use event::{Category, Event, Resource, Severity};

/// Producer endpoint path, appended to [`ServiceKey::url`].
pub const RESOURCE_EVENTS_PATH: &str = "/cf/producer/v1/resource-events";

/// Credentials of an ANS service instance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceKey {
    /// Base URL of the ANS API
    pub url: String,
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Base URL of the XSUAA instance issuing tokens
    pub oauth_url: String,
}

impl std::fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceKey")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("oauth_url", &self.oauth_url)
            .finish()
    }
}

/// Parses a JSON service key.
///
/// # Errors
///
/// Returns [`ServiceKitError::Config`] if the JSON is malformed or a field
/// is missing.
///
/// # Examples
///
/// ```
/// use servicekit::ans::read_service_key;
///
/// let key = read_service_key(
///     r#"{"url": "https://ans.example.com", "client_id": "id",
///         "client_secret": "secret", "oauth_url": "https://auth.example.com"}"#,
/// )
/// .unwrap();
/// assert_eq!(key.client_id, "id");
/// ```
pub fn read_service_key(service_key_json: &str) -> Result<ServiceKey> {
    let service_key: ServiceKey = serde_json::from_str(service_key_json).map_err(|e| {
        ServiceKitError::Config(format!("error unmarshalling ANS serviceKey: {}", e))
    })?;

    tracing::info!("ANS serviceKey read successfully");
    Ok(service_key)
}

/// ANS producer client.
#[derive(Debug)]
pub struct Ans<S = HttpClient> {
    service_key: ServiceKey,
    xsuaa: Xsuaa<S>,
}

impl Ans<HttpClient> {
    /// Creates a client with a default [`HttpClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_service_key(service_key: ServiceKey) -> Result<Self> {
        Ok(Self::new(service_key, HttpClient::new()?))
    }
}

impl<S: Sender> Ans<S> {
    /// Creates a client sending through `client`.
    pub fn new(service_key: ServiceKey, client: S) -> Self {
        Self {
            service_key,
            xsuaa: Xsuaa::new(client),
        }
    }

    /// The service key this client authenticates with.
    pub fn service_key(&self) -> &ServiceKey {
        &self.service_key
    }

    /// Full URL events are posted to.
    pub fn events_url(&self) -> String {
        format!(
            "{}{}",
            self.service_key.url.trim_end_matches('/'),
            RESOURCE_EVENTS_PATH
        )
    }

    /// Acquires a token and posts `event`.
    ///
    /// A fresh token is requested on every call.
    ///
    /// # Errors
    ///
    /// Token errors are propagated unchanged; a failed post is reported as
    /// [`ServiceKitError::Call`].
    pub async fn send(&mut self, event: &Event) -> Result<StatusCode> {
        let key = &self.service_key;
        self.xsuaa
            .set_bearer_token(&key.oauth_url, &key.client_id, &key.client_secret)
            .await?;

        let url = self.events_url();
        let body = serde_json::to_vec(event).map_err(ServiceKitError::Serialization)?;
        let body = Bytes::from(body);
        let headers = header_map([("Content-Type", "application/json")])?;

        let response = self
            .xsuaa
            .client()
            .send_request(Method::POST, &url, Some(body), &headers)
            .await
            .map_err(|e| ServiceKitError::Call {
                operation: "failed to send ANS event".to_string(),
                url: url.clone(),
                message: format!("{:#}", e),
            })?;

        let status = response.status();
        tracing::info!("ANS event '{}' accepted with status {}", event.subject, status);
        Ok(status)
    }
}
