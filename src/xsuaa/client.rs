//! Token-carrying HTTP client

use crate::error::Result;
use crate::http::{HttpClient, Sender};
use crate::xsuaa::token::{acquire_token, AuthToken, Credentials};

/// Wraps a [`Sender`] and configures it with an XSUAA access token.
///
/// After [`Xsuaa::set_bearer_token`] succeeds every request issued through
/// [`Xsuaa::client`] carries `Authorization: <token_type> <access_token>`.
/// The token is fetched once; nothing refreshes it. Call
/// `set_bearer_token` again when [`AuthToken::expires_in`] says so.
///
/// Acquisition takes `&mut self`. Share an instance between tasks only
/// behind a lock, or use one instance per caller.
///
/// # Examples
///
/// ```no_run
/// use servicekit::http::HttpClient;
/// use servicekit::xsuaa::Xsuaa;
///
/// # async fn example() -> servicekit::Result<()> {
/// let mut xsuaa = Xsuaa::new(HttpClient::new()?);
/// xsuaa
///     .set_bearer_token("https://auth.example.com", "client-id", "client-secret")
///     .await?;
/// println!("expires in {}s", xsuaa.auth_token().unwrap().expires_in);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Xsuaa<S = HttpClient> {
    client: S,
    auth_token: Option<AuthToken>,
}

impl<S: Sender> Xsuaa<S> {
    /// Creates a wrapper around `client`. No token is held yet.
    pub fn new(client: S) -> Self {
        Self {
            client,
            auth_token: None,
        }
    }

    /// Acquires a token and stores it without touching the client options.
    ///
    /// A failed acquisition leaves any previously stored token in place.
    ///
    /// # Errors
    ///
    /// Propagates every error of [`acquire_token`] unchanged.
    pub async fn get_bearer_token(
        &mut self,
        oauth_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<&AuthToken> {
        let credentials = Credentials::new(client_id, client_secret);
        let token = acquire_token(&self.client, oauth_url, &credentials).await?;
        Ok(&*self.auth_token.insert(token))
    }

    /// Acquires a token and makes the client send it on every request.
    ///
    /// Basic-auth options on the client are cleared; the timeout is kept.
    ///
    /// # Errors
    ///
    /// Propagates every error of [`acquire_token`] unchanged, and any error
    /// of [`Sender::set_options`]. On an acquisition error the client
    /// options are not modified.
    pub async fn set_bearer_token(
        &mut self,
        oauth_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<()> {
        let header = self
            .get_bearer_token(oauth_url, client_id, client_secret)
            .await?
            .authorization_header();

        let mut options = self.client.options().clone();
        options.token = Some(header);
        options.username = None;
        options.password = None;
        self.client.set_options(options)?;

        Ok(())
    }

    /// The token from the last successful acquisition.
    pub fn auth_token(&self) -> Option<&AuthToken> {
        self.auth_token.as_ref()
    }

    /// The wrapped client.
    pub fn client(&self) -> &S {
        &self.client
    }

    /// Mutable access to the wrapped client.
    pub fn client_mut(&mut self) -> &mut S {
        &mut self.client
    }

    /// Consumes the wrapper and returns the client.
    pub fn into_client(self) -> S {
        self.client
    }
}

impl Xsuaa<HttpClient> {
    /// Creates a wrapper around a fresh [`HttpClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_default_client() -> Result<Self> {
        Ok(Self::new(HttpClient::new()?))
    }
}
