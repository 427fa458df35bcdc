use oauth2::basic::BasicErrorResponse;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "No token available. Complete the authorization code flow or call `set_token` first"
    )]
    TokenMissing,

    #[error("Token is expired and has no refresh token to exchange")]
    RefreshTokenMissing,

    #[error("HTTP request failed")]
    Transport(#[from] reqwest::Error),

    #[error("Request to `{url}` failed with status {status}")]
    Status {
        url: String,
        status: StatusCode,
        body: Option<Value>,
    },

    #[error("Token endpoint rejected the request: {0}")]
    TokenEndpoint(BasicErrorResponse),

    #[error("Response body is not valid JSON")]
    Decode(#[from] serde_json::Error),

    #[error("Not a correct absolute URL")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
