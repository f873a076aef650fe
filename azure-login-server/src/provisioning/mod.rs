use crate::credential::{CredentialError, CredentialIssuer};
use crate::store::{AccountRecord, AccountStore, StoreError, TokenStore};
use log::{error, info};
use std::sync::Arc;
use thiserror::Error;

pub mod upsert;

pub use upsert::{upsert_account, UpsertOutcome};

/// Failures of the account upsert / token write / credential sequence.
///
/// The two writes run concurrently without compensation, so the partial
/// outcomes name the side that did succeed.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Failed to store access token after account was upserted: {0}")]
    TokenPersistFailedAfterAccountUpserted(StoreError),
    #[error("Failed to upsert account after access token was stored: {0}")]
    AccountUpsertFailedAfterTokenPersisted(StoreError),
    #[error("Failed to upsert account ({account}) and to store access token ({token})")]
    BothWritesFailed {
        account: StoreError,
        token: StoreError,
    },
    #[error("Failed to mint credential: {0}")]
    Credential(#[from] CredentialError),
}

impl ProvisioningError {
    /// True when a concurrent login created the same account first
    pub fn is_account_conflict(&self) -> bool {
        matches!(
            self,
            ProvisioningError::AccountUpsertFailedAfterTokenPersisted(
                StoreError::AccountAlreadyExists(_)
            ) | ProvisioningError::BothWritesFailed {
                account: StoreError::AccountAlreadyExists(_),
                ..
            }
        )
    }
}

/// Maps external identities to local accounts and issues sign-in credentials
#[derive(Clone)]
pub struct IdentityProvisioner {
    account_prefix: String,
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<dyn TokenStore>,
    issuer: Arc<dyn CredentialIssuer>,
}

impl IdentityProvisioner {
    pub fn new(
        account_prefix: impl Into<String>,
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenStore>,
        issuer: Arc<dyn CredentialIssuer>,
    ) -> Self {
        Self {
            account_prefix: account_prefix.into(),
            accounts,
            tokens,
            issuer,
        }
    }

    /// Local account id of an external subject
    pub fn account_id(&self, external_id: &str) -> String {
        format!("{}:{}", self.account_prefix, external_id)
    }

    /// Upserts the account, stores the access token and mints a credential
    /// for the account. No credential is minted unless both writes succeed.
    pub async fn provision(
        &self,
        external_id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
        access_token: &str,
    ) -> Result<String, ProvisioningError> {
        let uid = self.account_id(external_id);
        let record = AccountRecord {
            uid: uid.clone(),
            display_name: display_name.map(str::to_string),
            email: email.map(str::to_string),
            email_verified: true,
        };

        let (account_result, token_result) = tokio::join!(
            upsert_account(self.accounts.as_ref(), &record),
            self.tokens.set_access_token(&uid, access_token)
        );

        match (account_result, token_result) {
            (Ok(outcome), Ok(())) => {
                let action = match outcome {
                    UpsertOutcome::Created(_) => "Created",
                    UpsertOutcome::Updated(_) => "Updated",
                };
                info!("{} account {}", action, outcome.record().uid);
            }
            (Ok(_), Err(token)) => {
                error!("Access token write failed for {}: {}", uid, token);
                return Err(ProvisioningError::TokenPersistFailedAfterAccountUpserted(
                    token,
                ));
            }
            (Err(account), Ok(())) => {
                error!("Account upsert failed for {}: {}", uid, account);
                return Err(ProvisioningError::AccountUpsertFailedAfterTokenPersisted(
                    account,
                ));
            }
            (Err(account), Err(token)) => {
                error!(
                    "Account upsert and access token write failed for {}: {}; {}",
                    uid, account, token
                );
                return Err(ProvisioningError::BothWritesFailed { account, token });
            }
        }

        let credential = self.issuer.mint_credential(&uid).await?;
        Ok(credential)
    }
}
