use oauth2::{AccessToken, RefreshToken};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Debug, Formatter};
use std::ops::Add;
use std::time::{Duration, SystemTime};

/// One credential grant issued by the identity provider.
///
/// A `Token` never changes after construction. Refreshing produces a new one.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,

    refresh_token: Option<String>,

    expires: SystemTime,
}

impl Token {
    pub fn new(access_token: String, refresh_token: Option<String>, expires: SystemTime) -> Token {
        Token {
            access_token,
            refresh_token,
            expires,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expires(&self) -> SystemTime {
        self.expires
    }

    /// `true` once `now` is strictly past `expires`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now > self.expires
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    pub(crate) fn from_token_response(response: TokenResponse) -> Token {
        let expires_in = match response.expires_in {
            Some(expires_in) => expires_in,
            None => {
                log::warn!("Token response has no `expires_in`. Treating the token as expiring now");
                0
            }
        };

        if expires_in > MAX_EXPIRES_IN {
            log::warn!(
                "Token response has `expires_in` of {}s. Capping it at {}s",
                expires_in,
                MAX_EXPIRES_IN
            );
        }

        Token {
            access_token: response.access_token.secret().to_owned(),
            refresh_token: response
                .refresh_token
                .map(|token| token.secret().to_owned()),
            expires: SystemTime::now().add(Duration::from_secs(expires_in.min(MAX_EXPIRES_IN))),
        }
    }

    /// Keeps `previous`'s refresh token when the provider didn't rotate it.
    pub(crate) fn or_refresh_token_of(mut self, previous: Option<&str>) -> Token {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.map(str::to_owned);
        }

        self
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[redacted]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("expires", &self.expires)
            .finish()
    }
}

/// Ten years. Longer lifetimes would overflow `SystemTime` on some platforms.
const MAX_EXPIRES_IN: u64 = 10 * 365 * 24 * 60 * 60;

/// Successful token endpoint body. <https://www.rfc-editor.org/rfc/rfc6749#section-5.1>
#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    access_token: AccessToken,

    #[serde(default)]
    refresh_token: Option<RefreshToken>,

    #[serde(default, deserialize_with = "seconds")]
    expires_in: Option<u64>,
}

/// Some Microsoft endpoints send `expires_in` as a string.
fn seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(seconds)) => Ok(Some(seconds)),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
