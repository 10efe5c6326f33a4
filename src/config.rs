//! Configuration management for servicekit
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::ans::{read_service_key, ServiceKey};
use crate::error::{Result, ServiceKitError};
use crate::protecode::ProtecodeOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Protecode server settings
    #[serde(default)]
    pub protecode: ProtecodeConfig,
    /// Alert Notification Service settings
    #[serde(default)]
    pub ans: AnsConfig,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

/// Protecode server configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProtecodeConfig {
    /// Server base URL
    #[serde(default)]
    pub server_url: Option<String>,

    /// Basic-auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,

    /// Default group for uploads and product listings
    #[serde(default)]
    pub group: Option<String>,

    /// Whether uploaded binaries are deleted after scanning
    #[serde(default)]
    pub delete_binary: bool,
}

impl std::fmt::Debug for ProtecodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtecodeConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("group", &self.group)
            .field("delete_binary", &self.delete_binary)
            .finish()
    }
}

/// ANS configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AnsConfig {
    /// Path to a JSON service key file
    #[serde(default)]
    pub service_key_path: Option<String>,

    /// Raw JSON service key; takes precedence over `service_key_path`
    #[serde(default, skip_serializing)]
    pub service_key: Option<String>,
}

impl std::fmt::Debug for AnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsConfig")
            .field("service_key_path", &self.service_key_path)
            .field("service_key", &self.service_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ServiceKitError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ServiceKitError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(timeout) = std::env::var("SERVICEKIT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.http.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SERVICEKIT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(url) = std::env::var("SERVICEKIT_PROTECODE_URL") {
            self.protecode.server_url = Some(url);
        }

        if let Ok(username) = std::env::var("SERVICEKIT_PROTECODE_USERNAME") {
            self.protecode.username = Some(username);
        }

        if let Ok(password) = std::env::var("SERVICEKIT_PROTECODE_PASSWORD") {
            self.protecode.password = Some(password);
        }

        if let Ok(group) = std::env::var("SERVICEKIT_PROTECODE_GROUP") {
            self.protecode.group = Some(group);
        }

        if let Ok(key) = std::env::var("SERVICEKIT_ANS_SERVICE_KEY") {
            self.ans.service_key = Some(key);
        }

        if let Ok(key_path) = std::env::var("SERVICEKIT_ANS_SERVICE_KEY_PATH") {
            self.ans.service_key_path = Some(key_path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(timeout) = cli.timeout {
            self.http.timeout_seconds = timeout;
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            return Err(ServiceKitError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.http.timeout_seconds > 3600 {
            return Err(ServiceKitError::Config(
                "http.timeout_seconds must be less than or equal to 3600".to_string(),
            )
            .into());
        }

        if let Some(server_url) = &self.protecode.server_url {
            let parsed = url::Url::parse(server_url).map_err(|e| {
                ServiceKitError::Config(format!(
                    "protecode.server_url is not a valid URL: {}",
                    e
                ))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ServiceKitError::Config(format!(
                    "protecode.server_url must use http or https, got: {}",
                    parsed.scheme()
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Connection settings for the configured Protecode server.
    ///
    /// # Errors
    ///
    /// Returns error if the server URL or credentials are missing.
    pub fn protecode_options(&self) -> Result<ProtecodeOptions> {
        let require = |value: &Option<String>, name: &str| {
            value.clone().ok_or_else(|| {
                ServiceKitError::Config(format!("protecode.{} is not configured", name))
            })
        };

        Ok(ProtecodeOptions {
            server_url: require(&self.protecode.server_url, "server_url")?,
            username: require(&self.protecode.username, "username")?,
            password: require(&self.protecode.password, "password")?,
            timeout: self.timeout(),
        })
    }

    /// Default Protecode group, unless `group` overrides it.
    ///
    /// # Errors
    ///
    /// Returns error if neither is set.
    pub fn protecode_group(&self, group: Option<String>) -> Result<String> {
        group
            .or_else(|| self.protecode.group.clone())
            .ok_or_else(|| {
                ServiceKitError::Config(
                    "no Protecode group given and protecode.group is not configured".to_string(),
                )
                .into()
            })
    }

    /// Reads the ANS service key.
    ///
    /// `path` overrides the configured sources; otherwise a raw key wins
    /// over `service_key_path`.
    ///
    /// # Errors
    ///
    /// Returns error if no key is configured, the file cannot be read or the
    /// JSON is malformed.
    pub fn ans_service_key(&self, path: Option<&Path>) -> Result<ServiceKey> {
        if let Some(path) = path {
            let contents = std::fs::read_to_string(path)?;
            return read_service_key(&contents);
        }

        if let Some(raw) = &self.ans.service_key {
            return read_service_key(raw);
        }

        if let Some(key_path) = &self.ans.service_key_path {
            let contents = std::fs::read_to_string(key_path)?;
            return read_service_key(&contents);
        }

        Err(ServiceKitError::Config("no ANS service key configured".to_string()).into())
    }
}
