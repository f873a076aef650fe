//! Authorization-code login flow: redirect construction and callback handling

use crate::provider::{decode_identity_claims, ClaimsError, IdentityProvider, ProviderError};
use crate::provisioning::{IdentityProvisioner, ProvisioningError};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

pub mod state_token;

pub use state_token::generate_state_token;

/// Failures of the callback validation sequence
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("State cookie not set or expired. Maybe you took too long to authorize. Please try again.")]
    StateMissing,
    #[error("State validation failed")]
    StateMismatch,
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),
    #[error("Failed to decode identity token: {0}")]
    ClaimDecode(#[from] ClaimsError),
    #[error("Failed to provision account: {0}")]
    Provisioning(#[from] ProvisioningError),
}

impl From<ProviderError> for LoginError {
    fn from(err: ProviderError) -> Self {
        LoginError::TokenExchangeFailed(err.to_string())
    }
}

/// Parameters the provider redirects back with
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Drives both halves of the login flow against a provider and a provisioner
#[derive(Clone)]
pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
    provisioner: IdentityProvisioner,
}

impl LoginFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>, provisioner: IdentityProvisioner) -> Self {
        Self {
            provider,
            provisioner,
        }
    }

    /// Provider URL the browser is sent to for the given state token
    pub fn authorization_url(&self, state: &str) -> Result<Url, ProviderError> {
        self.provider.authorization_url(state)
    }

    /// Validates the callback against the state held in the cookie, exchanges
    /// the code and provisions the account. Returns the sign-in credential.
    pub async fn complete(
        &self,
        cookie_state: Option<&str>,
        params: &CallbackParams,
    ) -> Result<String, LoginError> {
        let expected = match cookie_state {
            Some(state) if !state.is_empty() => state,
            _ => {
                warn!("Callback received without a state cookie");
                return Err(LoginError::StateMissing);
            }
        };

        if params.state.as_deref() != Some(expected) {
            warn!("Callback state does not match the state cookie");
            return Err(LoginError::StateMismatch);
        }

        // Consent denied or another authorization error
        if let Some(error) = &params.error {
            let message = params
                .error_description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| error.clone());
            warn!("Provider returned an authorization error: {}", error);
            return Err(LoginError::TokenExchangeFailed(message));
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                LoginError::TokenExchangeFailed(
                    "Authorization code missing from callback".to_string(),
                )
            })?;

        let tokens = self.provider.exchange_code(code).await?;
        let id_token = tokens.id_token.as_deref().ok_or(ClaimsError::Missing)?;
        let claims = decode_identity_claims(id_token)?;

        info!("Exchanged authorization code for subject {}", claims.subject);

        let credential = self
            .provisioner
            .provision(
                &claims.subject,
                claims.display_name.as_deref(),
                claims.email.as_deref(),
                &tokens.access_token,
            )
            .await?;

        info!(
            "Issued credential for {}",
            self.provisioner.account_id(&claims.subject)
        );
        Ok(credential)
    }
}
