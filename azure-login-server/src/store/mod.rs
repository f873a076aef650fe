use crate::config::{AppConfig, StoreBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod redis;

/// Errors that can occur during account and token store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),
    #[error("Failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse value: {0}")]
    Deserialization(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A local user account federated from an external identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    /// Local account id, `<prefix>:<external id>`
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Federated emails are trusted as verified by the provider
    #[serde(default)]
    pub email_verified: bool,
}

/// Fields refreshed on an existing account at every login
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub display_name: Option<String>,
}

impl AccountUpdate {
    /// Applies the update to a record
    pub fn apply(&self, record: &mut AccountRecord) {
        if let Some(display_name) = &self.display_name {
            record.display_name = Some(display_name.clone());
        }
    }
}

/// Account store holding local user records.
///
/// Conflict semantics are the only concurrency control the login flow relies on:
/// `update_account` fails with [`StoreError::AccountNotFound`] when the account is
/// absent and `create_account` fails with [`StoreError::AccountAlreadyExists`]
/// when it is present. Implementations must make both checks atomic with the write.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Update an existing account, returning the stored record
    async fn update_account(
        &self,
        uid: &str,
        update: &AccountUpdate,
    ) -> Result<AccountRecord, StoreError>;

    /// Create a new account
    async fn create_account(&self, record: &AccountRecord) -> Result<AccountRecord, StoreError>;

    /// Look up an account by id
    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Returns Ok(()) if the backend is reachable
    async fn health_check(&self) -> Result<(), String>;
}

/// Durable key-value store for provider access tokens, keyed by account id
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Store the token, overwriting any previous value
    async fn set_access_token(&self, account_id: &str, token: &str) -> Result<(), StoreError>;

    /// Retrieve the last stored token
    async fn get_access_token(&self, account_id: &str) -> Result<Option<String>, StoreError>;

    /// Returns Ok(()) if the backend is reachable
    async fn health_check(&self) -> Result<(), String>;
}

/// The pair of stores the login flow writes to
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub tokens: Arc<dyn TokenStore>,
}

/// Creates the store implementation selected by the configuration
pub async fn create_stores(config: &AppConfig) -> Result<Stores, StoreError> {
    let backend = config.store.backend().map_err(StoreError::Config)?;
    match backend {
        StoreBackend::InMemory => {
            log::warn!("Using in-memory stores, accounts and tokens are lost on restart");
            Ok(Stores {
                accounts: Arc::new(memory::InMemoryAccountStore::new()),
                tokens: Arc::new(memory::InMemoryTokenStore::new()),
            })
        }
        StoreBackend::Redis => {
            if config.store.redis_url.is_empty() {
                return Err(StoreError::Config(
                    "Redis URL is required for the redis store".to_string(),
                ));
            }
            let store = Arc::new(
                redis::RedisStore::new(
                    &config.store.redis_url,
                    &config.store.account_key_prefix,
                    &config.store.token_key_prefix,
                )
                .await
                .map_err(StoreError::Config)?,
            );
            Ok(Stores {
                accounts: store.clone(),
                tokens: store,
            })
        }
    }
}
