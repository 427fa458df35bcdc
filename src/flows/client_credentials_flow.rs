use crate::error::Result;
use crate::oauth_client::OAuthClient;
use crate::token::Token;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};

use super::token_flow::TokenFlow;

/// Client credentials grant. <https://www.rfc-editor.org/rfc/rfc6749#section-4.4>
///
/// Tokens are acquired lazily and re-acquired as soon as they expire.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientCredentials;

#[async_trait]
impl TokenFlow for ClientCredentials {
    async fn renew(
        &self,
        oauth_client: &OAuthClient,
        current: Option<&Token>,
    ) -> Result<Option<Token>> {
        match current {
            Some(token) if !token.is_expired() => return Ok(None),
            Some(_) => log::debug!("Token expired. Requesting a new one"),
            None => log::debug!("No token yet. Requesting one"),
        }

        Ok(Some(oauth_client.exchange_client_credentials().await?))
    }

    fn authorize(&self, request: RequestBuilder, _method: &Method, token: &Token) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", token.access_token()))
    }
}
