use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub mod azure;
pub mod claims;

pub use azure::AzureAdClient;
pub use claims::{decode_identity_claims, ClaimsError};

/// Errors that can occur while talking to the identity provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider answered with an OAuth error object or a non-success status
    #[error("{0}")]
    Rejected(String),
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Tokens returned by a successful authorization-code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTokens {
    pub access_token: String,
    pub id_token: Option<String>,
}

/// Authorization-code flow operations of an OAuth 2.0 identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the URL the browser is redirected to, carrying `state`
    fn authorization_url(&self, state: &str) -> Result<Url, ProviderError>;

    /// Exchanges an authorization code for tokens over the back channel
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError>;
}
