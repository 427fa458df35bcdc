use crate::token::Token;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Persistence for tokens minted by a [`Client`](crate::Client).
///
/// `save` is called once for every new token, while the client still holds
/// its token lock.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<Token>>;

    async fn save(&self, token: &Token) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> MemoryTokenStore {
        MemoryTokenStore::default()
    }

    pub fn with_token(token: Token) -> MemoryTokenStore {
        MemoryTokenStore {
            token: RwLock::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<Token>> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &Token) -> Result<()> {
        *self.token.write().await = Some(token.to_owned());
        Ok(())
    }
}

/// Forwards every new token to a callback. Never loads anything.
pub struct CallbackTokenStore<F> {
    callback: F,
}

impl<F> CallbackTokenStore<F>
where
    F: Fn(&Token) + Send + Sync,
{
    pub fn new(callback: F) -> CallbackTokenStore<F> {
        CallbackTokenStore { callback }
    }
}

#[async_trait]
impl<F> TokenStore for CallbackTokenStore<F>
where
    F: Fn(&Token) + Send + Sync,
{
    async fn load(&self) -> Result<Option<Token>> {
        Ok(None)
    }

    async fn save(&self, token: &Token) -> Result<()> {
        (self.callback)(token);
        Ok(())
    }
}
