use super::{AccountRecord, AccountStore, AccountUpdate, StoreError, TokenStore};
use async_trait::async_trait;
use log::error;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

/// Redis backed account and token store.
///
/// Accounts are JSON documents under `<account prefix>/<uid>`; access tokens are
/// plain strings under `<token prefix>/<uid>`.
#[derive(Clone)]
pub struct RedisStore {
    _client: Client,
    conn_manager: ConnectionManager,
    account_prefix: String,
    token_prefix: String,
}

impl RedisStore {
    /// Initialize a new Redis store instance
    pub async fn new(
        redis_url: &str,
        account_prefix: &str,
        token_prefix: &str,
    ) -> Result<Self, String> {
        let client = match Client::open(redis_url) {
            Ok(client) => client,
            Err(err) => {
                return Err(format!("Failed to connect to Redis: {}", err));
            }
        };

        let conn_manager = match ConnectionManager::new(client.clone()).await {
            Ok(manager) => manager,
            Err(err) => {
                return Err(format!(
                    "Failed to create Redis connection manager: {}",
                    err
                ));
            }
        };

        // Test the connection to ensure it's working
        let mut conn = conn_manager.clone();
        if let Err(err) = redis::cmd("PING").query_async::<String>(&mut conn).await {
            return Err(format!("Failed to ping Redis: {}", err));
        }

        Ok(Self {
            conn_manager,
            account_prefix: account_prefix.to_string(),
            token_prefix: token_prefix.to_string(),
            _client: client,
        })
    }

    fn account_key(&self, uid: &str) -> String {
        format!("{}/{}", self.account_prefix, uid)
    }

    fn token_key(&self, uid: &str) -> String {
        format!("{}/{}", self.token_prefix, uid)
    }

    async fn ping(&self) -> Result<(), String> {
        let mut conn = self.conn_manager.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(err) => Err(format!("Redis health check failed: {}", err)),
        }
    }

    /// Writes the record only if the key does (`XX`) or does not (`NX`) exist.
    /// Returns false when the condition did not hold.
    async fn set_conditional(
        &self,
        key: &str,
        record: &AccountRecord,
        condition: &str,
    ) -> Result<bool, StoreError> {
        let serialized = serde_json::to_string(record)?;
        let mut conn = self.conn_manager.clone();

        match redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg(condition)
            .query_async::<Option<String>>(&mut conn)
            .await
        {
            Ok(reply) => Ok(reply.is_some()),
            Err(err) => {
                error!("Redis error while setting key {}: {}", key, err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }
}

#[async_trait]
impl AccountStore for RedisStore {
    async fn update_account(
        &self,
        uid: &str,
        update: &AccountUpdate,
    ) -> Result<AccountRecord, StoreError> {
        let mut record = self
            .get_account(uid)
            .await?
            .ok_or_else(|| StoreError::AccountNotFound(uid.to_string()))?;
        update.apply(&mut record);

        // XX turns a concurrent delete into not-found instead of a resurrection
        if self
            .set_conditional(&self.account_key(uid), &record, "XX")
            .await?
        {
            Ok(record)
        } else {
            Err(StoreError::AccountNotFound(uid.to_string()))
        }
    }

    async fn create_account(&self, record: &AccountRecord) -> Result<AccountRecord, StoreError> {
        if self
            .set_conditional(&self.account_key(&record.uid), record, "NX")
            .await?
        {
            Ok(record.clone())
        } else {
            Err(StoreError::AccountAlreadyExists(record.uid.clone()))
        }
    }

    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StoreError> {
        let key = self.account_key(uid);
        let mut conn = self.conn_manager.clone();

        let result: Option<String> = match conn.get(&key).await {
            Ok(value) => value,
            Err(err) => {
                error!("Redis error while getting key {}: {}", key, err);
                return Err(StoreError::Redis(err.to_string()));
            }
        };

        match result {
            Some(value) => serde_json::from_str(&value)
                .map_err(|e| StoreError::Deserialization(e.to_string()))
                .map(Some),
            None => Ok(None),
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        self.ping().await
    }
}

#[async_trait]
impl TokenStore for RedisStore {
    async fn set_access_token(&self, account_id: &str, token: &str) -> Result<(), StoreError> {
        let key = self.token_key(account_id);
        let mut conn = self.conn_manager.clone();

        match conn.set::<_, _, ()>(&key, token).await {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("Redis error while setting key {}: {}", key, err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn get_access_token(&self, account_id: &str) -> Result<Option<String>, StoreError> {
        let key = self.token_key(account_id);
        let mut conn = self.conn_manager.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(value) => Ok(value),
            Err(err) => {
                error!("Redis error while getting key {}: {}", key, err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        self.ping().await
    }
}
