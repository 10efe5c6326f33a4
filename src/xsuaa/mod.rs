//! XSUAA OAuth2 client-credentials support
//!
//! # Module Layout
//!
//! - [`token`]  -- token endpoint construction and [`acquire_token`]
//! - [`client`] -- [`Xsuaa`], which installs an acquired token on a
//!   [`Sender`](crate::http::Sender)

pub mod client;
pub mod token;

pub use client::Xsuaa;
pub use token::{
    acquire_token, token_endpoint, AuthToken, Credentials, DEFAULT_TOKEN_TYPE,
    TOKEN_PATH_AND_QUERY,
};
