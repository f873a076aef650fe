use crate::config::AppConfig;
use crate::credential::{CredentialError, JwtCredentialIssuer};
use crate::login::LoginFlow;
use crate::provider::{AzureAdClient, ProviderError};
use crate::provisioning::IdentityProvisioner;
use crate::store::Stores;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to create Azure AD client: {0}")]
    Provider(#[from] ProviderError),
    #[error("Failed to create credential issuer: {0}")]
    Credential(#[from] CredentialError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub login: Arc<LoginFlow>,
    pub stores: Stores,
}

impl AppState {
    /// Wires the Azure AD client, the stores and the credential issuer into
    /// the login flow
    pub fn new(config: &AppConfig, stores: Stores) -> Result<Self, StateError> {
        let provider = Arc::new(AzureAdClient::new(&config.azure)?);
        let issuer = Arc::new(JwtCredentialIssuer::new(&config.credential)?);
        let provisioner = IdentityProvisioner::new(
            config.account_prefix.clone(),
            stores.accounts.clone(),
            stores.tokens.clone(),
            issuer,
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            login: Arc::new(LoginFlow::new(provider, provisioner)),
            stores,
        })
    }

    #[cfg(test)]
    pub fn for_testing(config: &AppConfig, stores: Stores) -> Self {
        Self::new(config, stores).expect("Failed to create test state")
    }
}
