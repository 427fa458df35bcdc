use crate::error::{Error, Result};
use crate::oauth_client::OAuthClient;
use crate::token::Token;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};

use super::token_flow::TokenFlow;

const BEARER: &str = "Bearer";
const DATA_ACCESS_INTENT: &str = "Data-Access-Intent";

/// Authorization code grant. <https://www.rfc-editor.org/rfc/rfc6749#section-4.1>
///
/// A token has to be provided up front, either by exchanging a code or with
/// `set_token`. Expired tokens are refreshed with their refresh token.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizationCode;

#[async_trait]
impl TokenFlow for AuthorizationCode {
    async fn renew(
        &self,
        oauth_client: &OAuthClient,
        current: Option<&Token>,
    ) -> Result<Option<Token>> {
        let token = current.ok_or(Error::TokenMissing)?;

        if !token.is_expired() {
            return Ok(None);
        }

        log::debug!("Token expired. Refreshing");
        let refresh_token = token.refresh_token().ok_or(Error::RefreshTokenMissing)?;

        Ok(Some(oauth_client.refresh_token(refresh_token).await?))
    }

    fn authorize(&self, request: RequestBuilder, method: &Method, token: &Token) -> RequestBuilder {
        let intent = if *method == Method::GET {
            "ReadOnly"
        } else {
            "ReadWrite"
        };

        request
            .header(BEARER, token.access_token())
            .header(DATA_ACCESS_INTENT, intent)
    }
}
