//! OAuth2 client-credentials token acquisition
//!
//! [`acquire_token`] exchanges a client ID/secret pair for an access token
//! at the XSUAA token endpoint. The endpoint is always
//! `<scheme>://<host>/oauth/token?grant_type=client_credentials&response_type=token`;
//! any path or query on the configured base URL is dropped.

use std::fmt;

use base64::Engine as _;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ServiceKitError};
use crate::http::{header_map, read_response_body, Sender};

/// Path and query appended to the scheme and host of the OAuth base URL.
pub const TOKEN_PATH_AND_QUERY: &str =
    "oauth/token?grant_type=client_credentials&response_type=token";

/// Token type used when the token endpoint does not report one.
pub const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// An access token issued by the token endpoint.
///
/// # Examples
///
/// ```
/// use servicekit::xsuaa::AuthToken;
///
/// let token = AuthToken {
///     token_type: "bearer".to_string(),
///     access_token: "1234".to_string(),
///     expires_in: 9876,
/// };
/// assert_eq!(token.authorization_header(), "bearer 1234");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Token type, `"bearer"` unless the server says otherwise.
    pub token_type: String,
    /// The access token itself. Never empty after a successful acquisition.
    pub access_token: String,
    /// Lifetime in seconds as reported by the server.
    ///
    /// Nothing in this crate acts on it; callers that need a refresh policy
    /// build it on top.
    pub expires_in: i64,
}

impl AuthToken {
    /// Value for the `Authorization` header: `<token_type> <access_token>`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token_type", &self.token_type)
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Client ID and secret for the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Value for an HTTP basic `Authorization` header.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Raw token endpoint response. Every field may be missing or null.
#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Builds the token endpoint URL from an OAuth base URL.
///
/// Only the scheme, host and explicit port of `oauth_url` are kept.
///
/// # Errors
///
/// Returns [`ServiceKitError::InvalidUrl`] if `oauth_url` cannot be parsed
/// or has no host.
///
/// # Examples
///
/// ```
/// use servicekit::xsuaa::token_endpoint;
///
/// let url = token_endpoint("https://auth.example.com/some/path?x=1").unwrap();
/// assert_eq!(
///     url,
///     "https://auth.example.com/oauth/token?grant_type=client_credentials&response_type=token"
/// );
/// ```
pub fn token_endpoint(oauth_url: &str) -> Result<String> {
    let base = Url::parse(oauth_url)
        .map_err(|e| ServiceKitError::InvalidUrl(format!("{}: {}", oauth_url, e)))?;

    let host = base
        .host_str()
        .ok_or_else(|| ServiceKitError::InvalidUrl(format!("{}: URL has no host", oauth_url)))?;

    let authority = match base.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    Ok(format!(
        "{}://{}/{}",
        base.scheme(),
        authority,
        TOKEN_PATH_AND_QUERY
    ))
}

/// Acquires an access token with the client-credentials grant.
///
/// Sends `GET` to the token endpoint derived from `oauth_url` with HTTP
/// basic authentication and `Accept: application/json`. The credentials are
/// sent as a per-request header; the persistent options of `sender` are
/// left untouched.
///
/// A response body that is not valid JSON fails immediately, before the
/// `access_token` check.
///
/// # Errors
///
/// - [`ServiceKitError::InvalidUrl`] if `oauth_url` is unusable
/// - [`ServiceKitError::Service`] if the transport fails
/// - [`ServiceKitError::BodyRead`] if the body cannot be read
/// - [`ServiceKitError::UnexpectedStatus`] if the status is not 200
/// - [`ServiceKitError::Parse`] if the body is not valid JSON
/// - [`ServiceKitError::MissingField`] if `access_token` is missing or empty
pub async fn acquire_token<S>(
    sender: &S,
    oauth_url: &str,
    credentials: &Credentials,
) -> Result<AuthToken>
where
    S: Sender + ?Sized,
{
    let method = Method::GET;
    let endpoint = token_endpoint(oauth_url)?;

    let authorization = credentials.basic_auth_header();
    let headers = header_map([
        ("Accept", "application/json"),
        ("Authorization", authorization.as_str()),
    ])?;

    tracing::debug!(
        "Requesting token for client '{}' from {}",
        credentials.client_id,
        endpoint
    );

    let response = sender
        .send_request(method.clone(), &endpoint, None, &headers)
        .await
        .map_err(|e| ServiceKitError::Service {
            method: method.to_string(),
            message: format!("{:#}", e),
        })?;

    let status = response.status().as_u16();
    let body = read_response_body(Some(response)).await?;
    let body_text = String::from_utf8_lossy(&body).to_string();

    if status != 200 {
        return Err(ServiceKitError::UnexpectedStatus {
            status,
            body: body_text,
        }
        .into());
    }

    let raw: RawTokenResponse =
        serde_json::from_slice(&body).map_err(|e| ServiceKitError::Parse {
            message: e.to_string(),
            body: body_text.clone(),
        })?;

    let access_token = raw.access_token.unwrap_or_default();
    if access_token.is_empty() {
        return Err(ServiceKitError::MissingField {
            field: "access_token".to_string(),
            body: body_text,
        }
        .into());
    }

    let token_type = raw
        .token_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());

    let token = AuthToken {
        token_type,
        access_token,
        expires_in: raw.expires_in.unwrap_or_default(),
    };

    tracing::info!(
        "Retrieved {} token for client '{}' (expires in {}s)",
        token.token_type,
        credentials.client_id,
        token.expires_in
    );

    Ok(token)
}
