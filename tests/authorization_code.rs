use business_central::{
    AuthorizationCode, Client, ClientCredentials, Error, FileTokenStore, Grant, TokenStore,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    TOKEN_PATH, api_path, client, expired_token, received_requests, record_updates, valid_token,
};

mod common;

const REDIRECT_URI: &str = "http://localhost:3000/oauth/callback";

#[tokio::test]
async fn it_fails_without_token_and_makes_no_call() {
    let server = MockServer::start().await;
    let client = client(&server, AuthorizationCode);

    let get = client.get("items", &[]).await;
    let post = client.post("items", Some(&json!({ "a": 1 }))).await;

    assert!(matches!(get, Err(Error::TokenMissing)));
    assert!(matches!(post, Err(Error::TokenMissing)));
    assert_eq!(received_requests(&server).await, 0);
}

#[tokio::test]
async fn it_sends_non_standard_bearer_header_with_read_only_intent_on_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("items")))
        .and(header("bearer", "user-token"))
        .and(header("data-access-intent", "ReadOnly"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, AuthorizationCode);
    client.set_token(valid_token("user-token", Some("refresh"))).await;

    let body = client.get("items", &[]).await.unwrap();

    assert_eq!(body, Some(json!({ "value": [] })));
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn it_sends_read_write_intent_on_post() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("items")))
        .and(header("bearer", "user-token"))
        .and(header("data-access-intent", "ReadWrite"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, AuthorizationCode);
    client.set_token(valid_token("user-token", Some("refresh"))).await;

    let body = client.post("items", None).await.unwrap();

    assert_eq!(body, Some(json!({ "id": "1" })));
}

#[tokio::test]
async fn it_refreshes_expired_token_once_and_notifies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .and(body_string_contains("client_secret=client-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-token",
            "refresh_token": "new-refresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("items")))
        .and(header("bearer", "new-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let mut client = client(&server, AuthorizationCode);
    let updates = record_updates(&mut client);
    client
        .set_token(expired_token("old-token", Some("old-refresh")))
        .await;

    client.get("items", &[]).await.unwrap();
    client.get("items", &[]).await.unwrap();

    let updates = updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].access_token(), "new-token");
    assert_eq!(updates[0].refresh_token(), Some("new-refresh"));
}

#[tokio::test]
async fn it_keeps_refresh_token_when_provider_does_not_rotate_it() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, AuthorizationCode);
    client
        .set_token(valid_token("old-token", Some("old-refresh")))
        .await;

    let token = client.refresh_access_token().await.unwrap();

    assert_eq!(token.access_token(), "new-token");
    assert_eq!(token.refresh_token(), Some("old-refresh"));
    assert_eq!(client.token().await, Some(token));
}

#[tokio::test]
async fn it_fails_to_renew_expired_token_without_refresh_token() {
    let server = MockServer::start().await;
    let client = client(&server, AuthorizationCode);
    client.set_token(expired_token("old-token", None)).await;

    let result = client.get("items", &[]).await;

    assert!(matches!(result, Err(Error::RefreshTokenMissing)));
    assert_eq!(received_requests(&server).await, 0);
}

#[tokio::test]
async fn it_fails_to_refresh_without_token() {
    let server = MockServer::start().await;
    let client = client(&server, AuthorizationCode);

    let result = client.refresh_access_token().await;

    assert!(matches!(result, Err(Error::TokenMissing)));
}

#[tokio::test]
async fn it_exchanges_code_for_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-token",
            "refresh_token": "user-refresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("companies")))
        .and(header("bearer", "user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server, AuthorizationCode);
    let updates = record_updates(&mut client);

    let token = client
        .request_access_token("the-code", REDIRECT_URI)
        .await
        .unwrap();
    client.get("companies", &[]).await.unwrap();

    assert_eq!(token.refresh_token(), Some("user-refresh"));
    assert_eq!(updates.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn it_surfaces_rejected_code_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "AADSTS70008: The provided authorization code has expired."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, AuthorizationCode);

    let result = client.request_access_token("stale-code", REDIRECT_URI).await;

    match result {
        Err(Error::TokenEndpoint(error)) => {
            assert!(error.to_string().contains("invalid_grant"));
        }
        other => panic!("Unexpected result: {:?}", other),
    }
    assert!(client.token().await.is_none());
}

#[tokio::test]
async fn it_surfaces_api_errors_with_decoded_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("items")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "Authentication_InvalidCredentials" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, AuthorizationCode);
    client.set_token(valid_token("revoked", Some("refresh"))).await;

    let result = client.get("items", &[]).await;

    match result {
        Err(Error::Status { status, body, .. }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(
                body,
                Some(json!({ "error": { "code": "Authentication_InvalidCredentials" } }))
            );
        }
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn it_builds_authorize_url_for_tenant() {
    let server = MockServer::start().await;
    let client = client(&server, AuthorizationCode);

    let with_state = client.authorize_url("https://cb", Some("xyz")).unwrap();
    let without_state = client.authorize_url("https://cb", None).unwrap();

    assert_eq!(with_state.path(), "/t1/oauth2/v2.0/authorize");
    assert!(with_state.as_str().contains("state=xyz"));
    assert!(with_state.as_str().contains("response_type=code"));
    assert!(with_state.as_str().contains("response_mode=query"));
    assert!(!without_state.as_str().contains("state="));
}

#[tokio::test]
async fn it_persists_tokens_between_clients_through_file_store() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-token",
            "refresh_token": "user-refresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("items")))
        .and(header("bearer", "user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let tmp_dir = tempfile::tempdir().unwrap();
    let file_path = tmp_dir.path().join("tokens.json");
    let store = || -> Arc<dyn TokenStore> {
        Arc::new(FileTokenStore::from(
            file_path.to_owned(),
            "t1",
            "client-id",
            Grant::AuthorizationCode,
        ))
    };

    let first: Client<AuthorizationCode> =
        client(&server, AuthorizationCode).with_token_store(store());
    first
        .request_access_token("the-code", REDIRECT_URI)
        .await
        .unwrap();

    let second = client(&server, AuthorizationCode).with_token_store(store());
    assert!(second.restore_token().await.unwrap());
    second.get("items", &[]).await.unwrap();
}

#[tokio::test]
async fn it_does_not_restore_app_only_token_saved_to_same_file() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "app-only-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tmp_dir = tempfile::tempdir().unwrap();
    let file_path = tmp_dir.path().join("tokens.json");

    let app = client(&server, ClientCredentials).with_token_store(Arc::new(
        FileTokenStore::from(
            file_path.to_owned(),
            "t1",
            "client-id",
            Grant::ClientCredentials,
        ),
    ));
    assert_eq!(app.access_token().await.unwrap(), "app-only-token");

    let user = client(&server, AuthorizationCode).with_token_store(Arc::new(
        FileTokenStore::from(
            file_path.to_owned(),
            "t1",
            "client-id",
            Grant::AuthorizationCode,
        ),
    ));

    assert!(!user.restore_token().await.unwrap());
    assert!(user.token().await.is_none());
    assert!(matches!(
        user.access_token().await,
        Err(Error::TokenMissing)
    ));
}
