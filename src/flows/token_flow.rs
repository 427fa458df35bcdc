use crate::error::Result;
use crate::oauth_client::OAuthClient;
use crate::token::Token;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};

/// How a [`Client`](crate::Client) obtains tokens and presents them to the API.
#[async_trait]
pub trait TokenFlow: Send + Sync {
    /// Called with the stored token before every API request.
    ///
    /// Returns a newly minted token when `current` can't be used as-is, or
    /// `None` to go ahead with `current`.
    async fn renew(
        &self,
        oauth_client: &OAuthClient,
        current: Option<&Token>,
    ) -> Result<Option<Token>>;

    /// Attaches the bearer token to an API request.
    fn authorize(&self, request: RequestBuilder, method: &Method, token: &Token) -> RequestBuilder;
}
