#![allow(dead_code)]

use business_central::{Client, Credentials, Endpoints, Token, TokenFlow};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use wiremock::MockServer;

pub const TENANT_ID: &str = "t1";
pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";

pub const TOKEN_PATH: &str = "/t1/oauth2/v2.0/token";

pub fn api_path(endpoint: &str) -> String {
    format!("/v2.0/{}/{}", TENANT_ID, endpoint)
}

/// Client whose API and identity platform are both served by `server`.
pub fn client<F: TokenFlow>(server: &MockServer, flow: F) -> Client<F> {
    let _ = env_logger::try_init();

    Client::with_endpoints(
        Credentials::new(CLIENT_ID, CLIENT_SECRET, TENANT_ID),
        Endpoints::new(server.uri(), server.uri()),
        flow,
    )
    .unwrap()
}

pub fn valid_token(access_token: &str, refresh_token: Option<&str>) -> Token {
    Token::new(
        access_token.to_owned(),
        refresh_token.map(str::to_owned),
        SystemTime::now() + Duration::from_secs(3600),
    )
}

pub fn expired_token(access_token: &str, refresh_token: Option<&str>) -> Token {
    Token::new(
        access_token.to_owned(),
        refresh_token.map(str::to_owned),
        SystemTime::now() - Duration::from_secs(60),
    )
}

/// Records tokens passed to the update callback.
pub fn record_updates<F: TokenFlow>(client: &mut Client<F>) -> Arc<Mutex<Vec<Token>>> {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let recorded = updates.clone();

    client.set_update_token_callback(move |token: &Token| {
        recorded.lock().unwrap().push(token.to_owned());
    });

    updates
}

pub async fn received_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .len()
}
