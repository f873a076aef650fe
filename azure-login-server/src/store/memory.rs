use super::{AccountRecord, AccountStore, AccountUpdate, StoreError, TokenStore};
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local account store
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, AccountRecord>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn update_account(
        &self,
        uid: &str,
        update: &AccountUpdate,
    ) -> Result<AccountRecord, StoreError> {
        let mut accounts = self.accounts.write().await;
        let record = accounts
            .get_mut(uid)
            .ok_or_else(|| StoreError::AccountNotFound(uid.to_string()))?;
        update.apply(record);
        Ok(record.clone())
    }

    async fn create_account(&self, record: &AccountRecord) -> Result<AccountRecord, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&record.uid) {
            return Err(StoreError::AccountAlreadyExists(record.uid.clone()));
        }
        accounts.insert(record.uid.clone(), record.clone());
        Ok(record.clone())
    }

    async fn get_account(&self, uid: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.accounts.read().await.get(uid).cloned())
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Process-local access token store backed by Moka.
///
/// Entries never expire; the token is overwritten on every login.
#[derive(Clone)]
pub struct InMemoryTokenStore {
    tokens: MokaCache<String, String>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: MokaCache::builder().build(),
        }
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn set_access_token(&self, account_id: &str, token: &str) -> Result<(), StoreError> {
        self.tokens
            .insert(account_id.to_string(), token.to_string())
            .await;
        Ok(())
    }

    async fn get_access_token(&self, account_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.tokens.get(account_id).await)
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uid: &str) -> AccountRecord {
        AccountRecord {
            uid: uid.to_string(),
            display_name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            email_verified: true,
        }
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let store = InMemoryAccountStore::new();
        let result = store
            .update_account("azure-ad:missing", &AccountUpdate::default())
            .await;
        assert!(matches!(result, Err(StoreError::AccountNotFound(uid)) if uid == "azure-ad:missing"));
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let store = InMemoryAccountStore::new();
        store.create_account(&record("azure-ad:1")).await.unwrap();

        let updated = store
            .update_account(
                "azure-ad:1",
                &AccountUpdate {
                    display_name: Some("Countess of Lovelace".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Countess of Lovelace"));

        let stored = store.get_account("azure-ad:1").await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_create_existing_account() {
        let store = InMemoryAccountStore::new();
        store.create_account(&record("azure-ad:1")).await.unwrap();
        let result = store.create_account(&record("azure-ad:1")).await;
        assert!(matches!(result, Err(StoreError::AccountAlreadyExists(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_one_record() {
        let store = InMemoryAccountStore::new();
        let mut handles = vec![];
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_account(&record("azure-ad:race")).await.is_ok()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_token_overwrite() {
        let store = InMemoryTokenStore::new();
        assert_eq!(store.get_access_token("azure-ad:1").await.unwrap(), None);

        store.set_access_token("azure-ad:1", "first").await.unwrap();
        store.set_access_token("azure-ad:1", "second").await.unwrap();
        assert_eq!(
            store.get_access_token("azure-ad:1").await.unwrap().as_deref(),
            Some("second")
        );
    }
}
