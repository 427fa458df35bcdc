//! Authenticated access to the Business Central API.
//!
//! A [`Client`] owns the current [`Token`] and makes sure a usable one is in
//! place before every request. What "usable" means and how a new token is
//! obtained is decided by its [`TokenFlow`]:
//!
//! - [`ClientCredentials`] acquires a token on first use and re-acquires it
//!   after expiry.
//! - [`AuthorizationCode`] requires a token to be provided up front and
//!   refreshes it after expiry.
//!
//! ```text
//! NoToken ──acquire──► Valid ──time passes──► Expired ──refresh/reacquire──► Valid
//! ```

use crate::credentials::Credentials;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::flows::{AuthorizationCode, ClientCredentials, TokenFlow};
use crate::oauth_client::OAuthClient;
use crate::token::Token;
use crate::token_store::{CallbackTokenStore, TokenStore};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use url::Url;

pub struct Client<F> {
    flow: F,
    oauth_client: OAuthClient,
    endpoints: Endpoints,
    http: reqwest::Client,
    token: Mutex<Option<Token>>,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl<F: TokenFlow> Client<F> {
    pub fn new(credentials: Credentials, flow: F) -> Result<Client<F>> {
        Self::with_endpoints(credentials, Endpoints::default(), flow)
    }

    pub fn with_endpoints(
        credentials: Credentials,
        endpoints: Endpoints,
        flow: F,
    ) -> Result<Client<F>> {
        log::debug!(
            "Creating Client for tenant {}...",
            credentials.tenant_id()
        );

        let http = reqwest::Client::builder().build()?;
        let oauth_client = OAuthClient::new(credentials, &endpoints, http.clone())?;

        Ok(Client {
            flow,
            oauth_client,
            endpoints,
            http,
            token: Mutex::new(None),
            token_store: None,
        })
    }

    /// Every token minted from now on is saved to `token_store`.
    pub fn with_token_store(mut self, token_store: Arc<dyn TokenStore>) -> Client<F> {
        self.token_store = Some(token_store);
        self
    }

    /// Replaces the token store with `callback`, invoked with every new token.
    pub fn set_update_token_callback<C>(&mut self, callback: C)
    where
        C: Fn(&Token) + Send + Sync + 'static,
    {
        self.token_store = Some(Arc::new(CallbackTokenStore::new(callback)));
    }

    pub fn credentials(&self) -> &Credentials {
        self.oauth_client.credentials()
    }

    pub async fn token(&self) -> Option<Token> {
        self.token.lock().await.clone()
    }

    pub async fn set_token(&self, token: Token) {
        *self.token.lock().await = Some(token);
    }

    /// Puts the token kept by the token store, if any, in place.
    ///
    /// Returns whether a token was found.
    pub async fn restore_token(&self) -> Result<bool> {
        let Some(token_store) = &self.token_store else {
            return Ok(false);
        };

        match token_store.load().await? {
            Some(token) => {
                log::debug!("Restored token from the token store");
                self.set_token(token).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        self.endpoints.url(self.credentials().tenant_id(), endpoint)
    }

    pub fn token_url(&self) -> String {
        self.endpoints.token_url(self.credentials().tenant_id())
    }

    /// Bearer string of a usable token, renewing it first when needed.
    pub async fn access_token(&self) -> Result<String> {
        Ok(self.valid_token().await?.access_token().to_owned())
    }

    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        self.request(Method::GET, endpoint, None, query).await
    }

    /// Sends `data`, or `{}` when there is none.
    pub async fn post(&self, endpoint: &str, data: Option<&Value>) -> Result<Option<Value>> {
        let empty = Value::Object(Default::default());

        self.request(Method::POST, endpoint, Some(data.unwrap_or(&empty)), &[])
            .await
    }

    /// Sends an authenticated request and returns the decoded JSON body.
    ///
    /// An empty body decodes to `None`. Non-2xx responses become
    /// [`Error::Status`] carrying the decoded body.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>> {
        let token = self.valid_token().await?;
        let url = self.url(endpoint);

        log::debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(data) = data {
            request = request.json(data);
        }

        let response = self
            .flow
            .authorize(request, &method, &token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        log::debug!("{} {} responded with {}", method, url, status);

        if !status.is_success() {
            return Err(Error::Status {
                url,
                status,
                body: decode(&text).ok().flatten(),
            });
        }

        decode(&text)
    }

    async fn valid_token(&self) -> Result<Token> {
        let mut current = self.token.lock().await;

        if let Some(token) = self.flow.renew(&self.oauth_client, current.as_ref()).await? {
            return self.update_token(&mut current, token).await;
        }

        current.clone().ok_or(Error::TokenMissing)
    }

    async fn update_token(
        &self,
        current: &mut MutexGuard<'_, Option<Token>>,
        token: Token,
    ) -> Result<Token> {
        **current = Some(token.clone());

        if let Some(token_store) = &self.token_store {
            log::debug!("Saving new token to the token store");
            token_store.save(&token).await?;
        }

        Ok(token)
    }
}

impl Client<ClientCredentials> {
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Result<Client<ClientCredentials>> {
        Client::new(
            Credentials::new(client_id, client_secret, tenant_id),
            ClientCredentials,
        )
    }

    /// Acquires a new token regardless of the stored one.
    pub async fn request_access_token(&self) -> Result<Token> {
        let mut current = self.token.lock().await;
        let token = self.oauth_client.exchange_client_credentials().await?;

        self.update_token(&mut current, token).await
    }
}

impl Client<AuthorizationCode> {
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Result<Client<AuthorizationCode>> {
        Client::new(
            Credentials::new(client_id, client_secret, tenant_id),
            AuthorizationCode,
        )
    }

    /// Where to send the user to sign in. Pass `state` for CSRF protection.
    pub fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<Url> {
        self.oauth_client.authorize_url(redirect_uri, state)
    }

    /// Exchanges the code delivered to `redirect_uri` for a token.
    pub async fn request_access_token(&self, code: &str, redirect_uri: &str) -> Result<Token> {
        let mut current = self.token.lock().await;
        let token = self.oauth_client.exchange_code(code, redirect_uri).await?;

        self.update_token(&mut current, token).await
    }

    pub async fn refresh_access_token(&self) -> Result<Token> {
        let mut current = self.token.lock().await;

        let refresh_token = current
            .as_ref()
            .ok_or(Error::TokenMissing)?
            .refresh_token()
            .ok_or(Error::RefreshTokenMissing)?
            .to_owned();

        let token = self.oauth_client.refresh_token(&refresh_token).await?;

        self.update_token(&mut current, token).await
    }
}

fn decode(text: &str) -> Result<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(text)?))
}
