use crate::credentials::Credentials;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::token::{Token, TokenResponse};
use oauth2::basic::BasicErrorResponse;
use oauth2::{AuthUrl, AuthorizationCode, RedirectUrl, RefreshToken, TokenUrl};
use reqwest::header::ACCEPT;
use url::Url;

pub const CLIENT_CREDENTIALS_SCOPE: &str = "https://api.businesscentral.dynamics.com/.default";
pub const AUTHORIZATION_CODE_SCOPE: &str =
    "https://api.businesscentral.dynamics.com/user_impersonation offline_access";

/// Talks to the tenant's Microsoft identity platform endpoints.
#[derive(Clone, Debug)]
pub struct OAuthClient {
    credentials: Credentials,
    token_url: TokenUrl,
    authorization_url: AuthUrl,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(
        credentials: Credentials,
        endpoints: &Endpoints,
        http: reqwest::Client,
    ) -> Result<OAuthClient> {
        let tenant_id = credentials.tenant_id();
        let token_url = TokenUrl::new(endpoints.token_url(tenant_id))?;
        let authorization_url = AuthUrl::new(endpoints.authorize_url(tenant_id))?;

        log::debug!(
            "Resolved token_url={} and authorization_url={}",
            token_url.as_str(),
            authorization_url.as_str()
        );

        Ok(OAuthClient {
            credentials,
            token_url,
            authorization_url,
            http,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Browser redirect target starting the authorization code grant.
    ///
    /// `state` is appended only when given.
    pub fn authorize_url(&self, redirect_uri: &str, state: Option<&str>) -> Result<Url> {
        let redirect_uri = RedirectUrl::new(redirect_uri.to_owned())?;

        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("client_id", self.credentials.client_id())
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("response_mode", "query")
            .append_pair("scope", AUTHORIZATION_CODE_SCOPE);

        if let Some(state) = state {
            query.append_pair("state", state);
        }

        let url = Url::parse(&format!(
            "{}?{}",
            self.authorization_url.as_str(),
            query.finish()
        ))?;

        Ok(url)
    }

    pub async fn exchange_client_credentials(&self) -> Result<Token> {
        log::debug!("Exchanging client credentials for a token...");

        let token = self
            .request_token(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id()),
                ("client_secret", self.credentials.client_secret()),
                ("scope", CLIENT_CREDENTIALS_SCOPE),
            ])
            .await?;

        log::debug!("Exchange done");
        Ok(token)
    }

    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Token> {
        log::debug!("Exchanging code for a token...");

        let code = AuthorizationCode::new(code.to_owned());
        let redirect_uri = RedirectUrl::new(redirect_uri.to_owned())?;

        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.credentials.client_id()),
                ("client_secret", self.credentials.client_secret()),
                ("code", code.secret()),
                ("redirect_uri", redirect_uri.as_str()),
                ("scope", AUTHORIZATION_CODE_SCOPE),
            ])
            .await?;

        log::debug!("Exchange done");
        Ok(token)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        log::debug!("Refreshing token...");

        let refresh_token = RefreshToken::new(refresh_token.to_owned());

        let token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.credentials.client_id()),
                ("client_secret", self.credentials.client_secret()),
                ("refresh_token", refresh_token.secret()),
                ("scope", AUTHORIZATION_CODE_SCOPE),
            ])
            .await?
            .or_refresh_token_of(Some(refresh_token.secret()));

        log::debug!("Refresh done");
        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<Token> {
        let url = self.token_url.as_str();

        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            log::debug!("Token endpoint responded with {}", status);

            return Err(match serde_json::from_str::<BasicErrorResponse>(&text) {
                Ok(error) => Error::TokenEndpoint(error),
                Err(_) => Error::Status {
                    url: url.to_owned(),
                    status,
                    body: serde_json::from_str(&text).ok(),
                },
            });
        }

        let response = serde_json::from_str::<TokenResponse>(&text)?;

        Ok(Token::from_token_response(response))
    }
}
