//! servicekit - clients for XSUAA, Protecode and the Alert Notification Service
//!
//! This library provides OAuth2 client-credentials token acquisition against
//! XSUAA, an HTTP client wrapper that carries the acquired token, the
//! Protecode binary-scanning REST API and an ANS event producer.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `http`: Request transport abstraction and the reqwest-backed client
//! - `xsuaa`: Token acquisition and the token-carrying client wrapper
//! - `protecode`: Protecode scan API calls and response types
//! - `ans`: Alert Notification Service events and producer client
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use servicekit::Xsuaa;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut xsuaa = Xsuaa::with_default_client()?;
//!     let token = xsuaa
//!         .get_bearer_token("https://auth.example.com", "client-id", "client-secret")
//!         .await?;
//!     println!("{} token, valid for {}s", token.token_type, token.expires_in);
//!     Ok(())
//! }
//! ```

pub mod ans;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod protecode;
pub mod xsuaa;

// Re-export commonly used types
pub use ans::{Ans, Event, ServiceKey};
pub use config::Config;
pub use error::{ErrorCategory, Result, ServiceKitError};
pub use http::{ClientOptions, HttpClient, Sender};
pub use protecode::Protecode;
pub use xsuaa::{AuthToken, Xsuaa};
