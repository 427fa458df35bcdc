#![deny(warnings)]

use crate::args::{Arguments, Command};
use crate::endpoints::{API_BASE, LOGIN_BASE};
use anyhow::{Context, bail};
use oauth2::CsrfToken;
use serde_json::Value;
use std::sync::Arc;

pub mod args;
pub mod client;
pub mod config_file;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod file_state;
pub mod flows;
pub mod grant;
pub mod oauth_client;
pub mod token;
pub mod token_store;

pub use client::Client;
pub use credentials::Credentials;
pub use endpoints::Endpoints;
pub use error::{Error, Result};
pub use file_state::FileTokenStore;
pub use flows::{AuthorizationCode, ClientCredentials, TokenFlow};
pub use grant::Grant;
pub use token::Token;
pub use token_store::{CallbackTokenStore, MemoryTokenStore, TokenStore};

/// Runs one CLI command and returns what should be printed.
pub async fn run(args: Arguments) -> anyhow::Result<String> {
    let tenant_id = args
        .tenant_id
        .to_owned()
        .context("`--tenant-id` is required")?;
    let client_id = args
        .client_id
        .to_owned()
        .context("`--client-id` is required")?;
    let client_secret = args
        .client_secret
        .to_owned()
        .context("`--client-secret` or `--client-secret-stdin` is required")?;

    let credentials = Credentials::new(client_id.to_owned(), client_secret, tenant_id.to_owned());
    let endpoints = Endpoints::new(
        args.api_url.as_deref().unwrap_or(API_BASE),
        args.login_url.as_deref().unwrap_or(LOGIN_BASE),
    );
    let grant = args.grant.unwrap_or_default();
    let token_store = Arc::new(match &args.token_file {
        Some(path) => FileTokenStore::from(path.to_owned(), &tenant_id, &client_id, grant),
        None => FileTokenStore::new(&tenant_id, &client_id, grant)?,
    });

    match grant {
        Grant::ClientCredentials => {
            let client = Client::with_endpoints(credentials, endpoints, ClientCredentials)
                .context("Failed to create a Client")?
                .with_token_store(token_store);
            client.restore_token().await?;

            execute(&client, args.command).await
        }
        Grant::AuthorizationCode => {
            let client = Client::with_endpoints(credentials, endpoints, AuthorizationCode)
                .context("Failed to create a Client")?
                .with_token_store(token_store);
            client.restore_token().await?;

            match args.command {
                Command::AuthorizeUrl {
                    redirect_uri,
                    state,
                } => {
                    let state =
                        state.unwrap_or_else(|| CsrfToken::new_random().secret().to_owned());
                    log::info!("Expect `state={}` on the redirect", state);

                    Ok(client
                        .authorize_url(&redirect_uri, Some(&state))
                        .context("Failed to build the authorize url")?
                        .to_string())
                }
                Command::Exchange { code, redirect_uri } => Ok(client
                    .request_access_token(&code, &redirect_uri)
                    .await
                    .context("Failed to exchange code for a token")?
                    .access_token()
                    .to_owned()),
                Command::Refresh => Ok(client
                    .refresh_access_token()
                    .await
                    .context("Failed to refresh the token")?
                    .access_token()
                    .to_owned()),
                command => execute(&client, command).await,
            }
        }
    }
}

async fn execute<F: TokenFlow>(client: &Client<F>, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Get { endpoint, query } => {
            let query: Vec<(String, String)> = query
                .as_deref()
                .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
                .unwrap_or_default();
            let query: Vec<(&str, &str)> = query
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();

            let body = client
                .get(&endpoint, &query)
                .await
                .with_context(|| format!("Failed to GET `{}`", endpoint))?;

            to_output(body)
        }
        Command::Post { endpoint, data } => {
            let data = data
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()
                .context("`--data` is not valid JSON")?;

            let body = client
                .post(&endpoint, data.as_ref())
                .await
                .with_context(|| format!("Failed to POST `{}`", endpoint))?;

            to_output(body)
        }
        Command::Token => client
            .access_token()
            .await
            .context("Failed to retrieve a token"),
        command => bail!(
            "`{}` requires `--grant authorization-code`",
            command.name()
        ),
    }
}

fn to_output(body: Option<Value>) -> anyhow::Result<String> {
    match body {
        Some(body) => Ok(serde_json::to_string_pretty(&body)?),
        None => Ok("null".to_owned()),
    }
}
