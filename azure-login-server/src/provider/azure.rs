//! Azure AD (Microsoft identity platform v2.0) client

use super::{IdentityProvider, ProviderError, ProviderTokens};
use crate::config::AzureConfig;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
}

/// OAuth error object returned by the token endpoint
#[derive(Debug, Default, Deserialize)]
struct OAuthErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Azure AD authorization-code client
#[derive(Clone)]
pub struct AzureAdClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: String,
    authorize_endpoint: Url,
    token_endpoint: String,
}

impl AzureAdClient {
    pub fn new(config: &AzureConfig) -> Result<Self, ProviderError> {
        let authorize_endpoint = Url::parse(&config.authorize_endpoint()).map_err(|e| {
            ProviderError::Config(format!("Invalid authorization endpoint: {}", e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.client_timeout))
            .connect_timeout(Duration::from_secs(2))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| ProviderError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            authorize_endpoint,
            token_endpoint: config.token_endpoint(),
        })
    }

    /// Extracts the most descriptive error text from a failed token response
    fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
        let parsed: OAuthErrorResponse = serde_json::from_str(body).unwrap_or_default();
        parsed
            .error_description
            .filter(|d| !d.is_empty())
            .or(parsed.error.filter(|e| !e.is_empty()))
            .unwrap_or_else(|| format!("Token endpoint returned HTTP {}", status))
    }
}

#[async_trait]
impl IdentityProvider for AzureAdClient {
    fn authorization_url(&self, state: &str) -> Result<Url, ProviderError> {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &self.scopes)
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        debug!("Exchanging authorization code at {}", self.token_endpoint);

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", self.scopes.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!("Token endpoint request failed: {}", e);
                ProviderError::Http(e)
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = Self::rejection_message(status, &body);
            error!("Token exchange rejected with status {}: {}", status, message);
            return Err(ProviderError::Rejected(message));
        }

        let tokens: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ProviderTokens {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
        })
    }
}
