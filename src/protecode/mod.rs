//! Protecode binary-scanning REST API
//!
//! [`Protecode`] maps each API call to one request through a
//! [`Sender`]. Calls that return data hand back the unread
//! [`reqwest::Response`]; use [`read_json`] or stream the body yourself.
//! Failures are wrapped with a fixed description of the operation and the
//! requested URL and are never retried.
//!
//! | call | request |
//! |---|---|
//! | [`Protecode::load_product`] | `GET /api/apps/{group}/` |
//! | [`Protecode::load_result`] | `GET /api/product/{id}/` |
//! | [`Protecode::load_result_as_pdf`] | `GET /api/product/{id}/pdf-report` |
//! | [`Protecode::trigger_with_file_upload`] | `PUT /api/upload/{file_name}` |
//! | [`Protecode::trigger_with_fetch_url`] | `POST /api/fetch/` |
//! | [`Protecode::delete_result`] | `DELETE /api/product/{id}/` |

pub mod types;

use std::path::Path;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;

use crate::error::{Result, ServiceKitError};
use crate::http::{header_map, read_response_body, ClientOptions, HttpClient, Sender};

pub use types::{Product, ProductList, ProductResult, ResultData, ScanStatus};

/// Multipart form field carrying uploaded binaries.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Connection settings for a Protecode server.
#[derive(Clone)]
pub struct ProtecodeOptions {
    /// Base URL, e.g. `https://protecode.example.com`
    pub server_url: String,
    /// Basic-auth username
    pub username: String,
    /// Basic-auth password
    pub password: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ProtecodeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtecodeOptions")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the Protecode REST API.
#[derive(Debug)]
pub struct Protecode<S = HttpClient> {
    server_url: String,
    client: S,
}

impl Protecode<HttpClient> {
    /// Creates a client that authenticates with basic auth.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_options(options: &ProtecodeOptions) -> Result<Self> {
        let client_options = ClientOptions::basic(&options.username, &options.password)
            .with_timeout(options.timeout);
        Ok(Self::new(
            &options.server_url,
            HttpClient::with_options(client_options)?,
        ))
    }
}

impl<S: Sender> Protecode<S> {
    /// Creates a client for `server_url` using `client` as transport.
    pub fn new(server_url: &str, client: S) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The server URL without a trailing slash.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Lists the products of `group`.
    pub async fn load_product(&self, group: &str) -> Result<Response> {
        let url = self.create_url(&format!("/api/apps/{}/", group));
        let headers = header_map([("acceptType", "application/json")])?;

        self.send(Method::GET, &url, &headers)
            .await
            .map_err(|e| call_error("failed to load product", &url, e))
    }

    /// Uploads a local binary and starts a scan.
    pub async fn trigger_with_file_upload(
        &self,
        group: &str,
        file_path: &Path,
        file_name: &str,
        delete_binary: bool,
    ) -> Result<Response> {
        let url = self.create_url(&format!("/api/upload/{}", file_name));
        let delete_binary = delete_binary.to_string();
        let headers = header_map([("Group", group), ("Delete-Binary", delete_binary.as_str())])?;

        self.client
            .upload_request(Method::PUT, &url, file_path, UPLOAD_FIELD_NAME, &headers)
            .await
            .map_err(|e| {
                ServiceKitError::Upload {
                    operation: "failed to trigger scan with file upload".to_string(),
                    url: url.clone(),
                    message: format!("{:#}", e),
                }
                .into()
            })
    }

    /// Asks the server to download `fetch_url` and scan it.
    pub async fn trigger_with_fetch_url(
        &self,
        group: &str,
        fetch_url: &str,
        delete_binary: bool,
    ) -> Result<Response> {
        let url = self.create_url("/api/fetch/");
        let delete_binary = delete_binary.to_string();
        let headers = header_map([
            ("Content-Type", "application/json"),
            ("Group", group),
            ("Delete-Binary", delete_binary.as_str()),
            ("Url", fetch_url),
        ])?;

        self.send(Method::POST, &url, &headers)
            .await
            .map_err(|e| call_error("failed to trigger scan with fetch-url", &url, e))
    }

    /// Fetches the scan result of a product.
    pub async fn load_result(&self, product_id: i64) -> Result<Response> {
        let url = self.create_url(&format!("/api/product/{}/", product_id));
        let headers = header_map([("acceptType", "application/json")])?;

        self.send(Method::GET, &url, &headers)
            .await
            .map_err(|e| call_error("failed to load results", &url, e))
    }

    /// Fetches the PDF report of a product.
    pub async fn load_result_as_pdf(
        &self,
        product_id: i64,
        report_file_name: &str,
    ) -> Result<Response> {
        let url = self.create_url(&format!("/api/product/{}/pdf-report", product_id));
        let headers = header_map([
            ("Cache-Control", "no-cache, no-store, must-revalidate"),
            ("Pragma", "no-cache"),
            ("Outputfile", report_file_name),
        ])?;

        self.send(Method::GET, &url, &headers)
            .await
            .map_err(|e| call_error("failed to load result as PDF", &url, e))
    }

    /// Deletes a product and its scan result.
    pub async fn delete_result(&self, product_id: i64) -> Result<()> {
        let url = self.create_url(&format!("/api/product/{}/", product_id));

        self.send(Method::DELETE, &url, &HeaderMap::new())
            .await
            .map_err(|e| call_error("failed to delete result", &url, e))?;
        Ok(())
    }

    fn create_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.server_url, endpoint)
    }

    async fn send(&self, method: Method, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.client.send_request(method, url, None, headers).await
    }
}

fn call_error(operation: &str, url: &str, error: anyhow::Error) -> anyhow::Error {
    ServiceKitError::Call {
        operation: operation.to_string(),
        url: url.to_string(),
        message: format!("{:#}", error),
    }
    .into()
}

/// Reads a response body and deserializes it as JSON.
///
/// # Errors
///
/// Returns [`ServiceKitError::Parse`] with the raw body if it does not
/// match `T`.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = read_response_body(Some(response)).await?;
    serde_json::from_slice(&body).map_err(|e| {
        ServiceKitError::Parse {
            message: e.to_string(),
            body: String::from_utf8_lossy(&body).to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockSender;
    use std::path::PathBuf;

    fn response(body: &'static str) -> Response {
        Response::from(http::Response::builder().status(200).body(body).unwrap())
    }

    #[test]
    fn test_server_url_trailing_slash_is_trimmed() {
        let pc = Protecode::new("https://example.org/", MockSender::new());
        assert_eq!(pc.server_url(), "https://example.org");
        assert_eq!(
            pc.create_url("/api/fetch/"),
            "https://example.org/api/fetch/"
        );
    }

    #[tokio::test]
    async fn test_trigger_with_file_upload_uses_file_field() {
        let mut sender = MockSender::new();
        sender
            .expect_upload_request()
            .withf(|method, url, file_path, field_name, headers| {
                *method == Method::PUT
                    && url == "https://example.org/api/upload/app.jar"
                    && file_path == Path::new("/tmp/build/app.jar")
                    && field_name == "file"
                    && headers.get("group").map(|v| v.as_bytes()) == Some(b"42")
                    && headers.get("delete-binary").map(|v| v.as_bytes()) == Some(b"true")
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(response(r#"{"results": {"product_id": 1, "status": "B"}}"#)));

        let pc = Protecode::new("https://example.org", sender);
        let response = pc
            .trigger_with_file_upload("42", &PathBuf::from("/tmp/build/app.jar"), "app.jar", true)
            .await
            .unwrap();

        let data: ResultData = read_json(response).await.unwrap();
        assert_eq!(data.results.status, ScanStatus::Busy);
    }

    #[tokio::test]
    async fn test_trigger_with_file_upload_wraps_error() {
        let mut sender = MockSender::new();
        sender
            .expect_upload_request()
            .times(1)
            .returning(|_, _, _, _, _| Err(anyhow::anyhow!("disk on fire")));

        let pc = Protecode::new("https://example.org", sender);
        let err = pc
            .trigger_with_file_upload("1", Path::new("app.jar"), "app.jar", false)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ServiceKitError>(),
            Some(ServiceKitError::Upload { .. })
        ));
        assert!(err
            .to_string()
            .contains("failed to trigger scan with file upload"));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_trigger_with_fetch_url_headers() {
        let mut sender = MockSender::new();
        sender
            .expect_send_request()
            .withf(|method, url, body, headers| {
                *method == Method::POST
                    && url == "https://example.org/api/fetch/"
                    && body.is_none()
                    && headers.get("content-type").map(|v| v.as_bytes())
                        == Some(b"application/json")
                    && headers.get("url").map(|v| v.as_bytes())
                        == Some(b"https://artifacts.example.org/app.jar")
                    && headers.get("delete-binary").map(|v| v.as_bytes()) == Some(b"false")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(response("{}")));

        let pc = Protecode::new("https://example.org", sender);
        pc.trigger_with_fetch_url("7", "https://artifacts.example.org/app.jar", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_read_json_reports_body_on_failure() {
        let err = read_json::<ResultData>(response("<html>")).await.unwrap_err();
        match err.downcast_ref::<ServiceKitError>() {
            Some(ServiceKitError::Parse { body, .. }) => assert_eq!(body, "<html>"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_options_debug_redacts_password() {
        let options = ProtecodeOptions {
            server_url: "https://example.org".to_string(),
            username: "scanner".to_string(),
            password: "hunter2".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(!format!("{:?}", options).contains("hunter2"));
        let pc = Protecode::from_options(&options).unwrap();
        assert_eq!(pc.client.options().username.as_deref(), Some("scanner"));
        assert_eq!(pc.client.options().timeout, Some(Duration::from_secs(5)));
    }
}
