use crate::grant::Grant;
use crate::token::Token;
use crate::token_store::TokenStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

type TokenKey = String;

#[derive(Deserialize, Serialize)]
struct TokenState {
    version: u32,
    data: HashMap<TokenKey, Token>,
}

/// Keeps tokens of many clients in one JSON file, keyed by
/// `{tenant}/{client_id}/{grant}`.
///
/// App-only and user tokens of the same registration never share an entry.
pub struct FileTokenStore {
    file_path: PathBuf,
    key: TokenKey,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Uses `~/.business-central.json`.
    pub fn new(tenant_id: &str, client_id: &str, grant: Grant) -> Result<FileTokenStore> {
        let mut file_path = home::home_dir().context("Couldn't access $HOME_DIR")?;
        file_path.push(".business-central.json");

        Ok(FileTokenStore::from(file_path, tenant_id, client_id, grant))
    }

    pub fn from(
        file_path: PathBuf,
        tenant_id: &str,
        client_id: &str,
        grant: Grant,
    ) -> FileTokenStore {
        FileTokenStore {
            file_path,
            key: format!("{}/{}/{}", tenant_id, client_id, grant.name()),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> TokenState {
        log::debug!("Reading the state file");
        let text = fs::read_to_string(&self.file_path)
            .await
            .unwrap_or_default();

        serde_json::from_str::<TokenState>(&text).unwrap_or_else(|_| TokenState {
            version: 1,
            data: HashMap::new(),
        })
    }

    async fn write(&self, state: &TokenState) -> Result<()> {
        log::debug!("Writing the state file");
        let state_str = serde_json::to_string(state)?;

        fs::write(&self.file_path, state_str)
            .await
            .with_context(|| {
                format!(
                    "Failed to write to {} file",
                    &self.file_path.as_os_str().to_string_lossy()
                )
            })?;

        Ok(())
    }

    pub async fn read_token(&self) -> Option<Token> {
        log::debug!("Reading token for {} from the state", self.key);
        let state = self.read().await;

        state.data.get(&self.key).cloned()
    }

    pub async fn upsert_token(&self, token: Token) -> Result<()> {
        log::debug!("Saving token for {} to the state", self.key);
        let _guard = self.write_lock.lock().await;
        let mut state = self.read().await;

        state.data.insert(self.key.to_owned(), token);

        self.write(&state).await
    }

    pub async fn clear_token(&self) -> Result<()> {
        log::debug!("Clearing token for {} in the state", self.key);
        let _guard = self.write_lock.lock().await;
        let mut state = self.read().await;

        state.data.remove(&self.key);

        self.write(&state).await
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<Token>> {
        Ok(self.read_token().await)
    }

    async fn save(&self, token: &Token) -> Result<()> {
        self.upsert_token(token.to_owned()).await
    }
}
