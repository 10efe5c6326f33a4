//! Generic HTTP transport
//!
//! This module defines the [`Sender`] trait used by every service wrapper
//! and [`HttpClient`], the reqwest-backed implementation.
//!
//! # Design
//!
//! A [`Sender`] carries persistent [`ClientOptions`] (basic auth
//! credentials, a ready-made `Authorization` token, a request timeout).
//! Options are applied to every request issued through the sender; headers
//! passed to an individual call are applied afterwards and win on
//! conflicts, so a caller can authenticate a single request without
//! touching the persistent configuration.
//!
//! Responses with a status outside `2xx` are reported as
//! [`ServiceKitError::HttpStatus`]. Successful responses are returned
//! unread; dropping a [`reqwest::Response`] releases its connection.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};

use crate::error::{Result, ServiceKitError};

/// Persistent options applied to every request of a [`Sender`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Username for HTTP basic authentication
    pub username: Option<String>,
    /// Password for HTTP basic authentication
    pub password: Option<String>,
    /// Complete `Authorization` header value, e.g. `bearer 1234`.
    ///
    /// Takes precedence over basic authentication when both are set.
    pub token: Option<String>,
    /// Per-request timeout. `None` leaves reqwest's default in place.
    pub timeout: Option<Duration>,
}

impl ClientOptions {
    /// Options that authenticate with HTTP basic auth.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Returns a copy of these options with the given timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Abstraction over HTTP request execution.
///
/// Service wrappers are generic over this trait so that tests can swap in
/// a mock and so that authentication state lives in one owned value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sender: Send + Sync {
    /// Sends a request and returns the (unread) response.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::Http`] if the request cannot be sent and
    /// [`ServiceKitError::HttpStatus`] if the server answers with a status
    /// outside `2xx`.
    async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: &HeaderMap,
    ) -> Result<Response>;

    /// Uploads a local file as a single multipart form field.
    ///
    /// # Errors
    ///
    /// Same as [`Sender::send_request`], plus [`ServiceKitError::Io`] when
    /// the file cannot be read.
    async fn upload_request(
        &self,
        method: Method,
        url: &str,
        file_path: &Path,
        field_name: &str,
        headers: &HeaderMap,
    ) -> Result<Response>;

    /// Returns the persistent options.
    fn options(&self) -> &ClientOptions;

    /// Replaces the persistent options.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::Http`] if the underlying client has to be
    /// rebuilt for a new timeout and cannot be. The previous options stay in
    /// place in that case.
    fn set_options(&mut self, options: ClientOptions) -> Result<()>;
}

/// reqwest-backed [`Sender`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use servicekit::http::{ClientOptions, HttpClient, Sender};
///
/// # fn main() -> servicekit::Result<()> {
/// let client = HttpClient::with_options(
///     ClientOptions::basic("user", "secret").with_timeout(Duration::from_secs(10)),
/// )?;
/// assert_eq!(client.options().username.as_deref(), Some("user"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    options: ClientOptions,
}

impl HttpClient {
    /// Creates a client without authentication or timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::Http`] if the reqwest client cannot be
    /// built.
    pub fn new() -> Result<Self> {
        Self::with_options(ClientOptions::default())
    }

    /// Creates a client with the given persistent options.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceKitError::Http`] if the reqwest client cannot be
    /// built.
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self {
            client: build_client(&options)?,
            options,
        })
    }

    fn request(&self, method: Method, url: &str, headers: &HeaderMap) -> RequestBuilder {
        let mut builder = self.client.request(method, url);

        if let Some(token) = &self.options.token {
            builder = builder.header(AUTHORIZATION, token.as_str());
        } else if let Some(username) = &self.options.username {
            builder = builder.basic_auth(username, self.options.password.as_deref());
        }

        builder.headers(headers.clone())
    }

    async fn execute(&self, builder: RequestBuilder, url: &str) -> Result<Response> {
        let response = builder.send().await.map_err(ServiceKitError::Http)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Request to {} returned {}", url, status);
            return Err(ServiceKitError::HttpStatus {
                url: url.to_string(),
                status: status.to_string(),
            }
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl Sender for HttpClient {
    async fn send_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: &HeaderMap,
    ) -> Result<Response> {
        tracing::debug!("Sending HTTP {} request to {}", method, url);

        let mut builder = self.request(method, url, headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        self.execute(builder, url).await
    }

    async fn upload_request(
        &self,
        method: Method,
        url: &str,
        file_path: &Path,
        field_name: &str,
        headers: &HeaderMap,
    ) -> Result<Response> {
        tracing::debug!(
            "Uploading {} as form field '{}' via HTTP {} to {}",
            file_path.display(),
            field_name,
            method,
            url
        );

        let contents = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| field_name.to_string());

        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name);
        let form = reqwest::multipart::Form::new().part(field_name.to_string(), part);

        let builder = self.request(method, url, headers).multipart(form);
        self.execute(builder, url).await
    }

    fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn set_options(&mut self, options: ClientOptions) -> Result<()> {
        if options.timeout != self.options.timeout {
            self.client = build_client(&options)?;
        }
        self.options = options;
        Ok(())
    }
}

fn build_client(options: &ClientOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(|e| {
        tracing::warn!("Failed to create HTTP client: {}", e);
        ServiceKitError::Http(e)
    })?;
    Ok(client)
}

/// Builds a [`HeaderMap`] from name/value pairs.
///
/// Header names are normalized to lowercase.
///
/// # Errors
///
/// Returns [`ServiceKitError::Config`] if a name or value is not a valid
/// HTTP header.
pub fn header_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ServiceKitError::Config(format!("invalid header name '{}': {}", name, e))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            ServiceKitError::Config(format!("invalid value for header '{}': {}", name, e))
        })?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

/// Reads a response body to the end.
///
/// The response is consumed, which releases its connection.
///
/// # Errors
///
/// Returns [`ServiceKitError::NoResponse`] when `response` is `None` and
/// [`ServiceKitError::BodyRead`] when the body cannot be fully read.
pub async fn read_response_body(response: Option<Response>) -> Result<Bytes> {
    let response = response.ok_or(ServiceKitError::NoResponse)?;
    let body = response
        .bytes()
        .await
        .map_err(|e| ServiceKitError::BodyRead(e.to_string()))?;
    Ok(body)
}
