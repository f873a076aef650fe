use crate::config::CredentialConfig;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Unsupported credential algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid credential signing key: {0}")]
    InvalidKey(String),
    #[error("Failed to sign credential: {0}")]
    Signing(String),
}

/// Issues the signed sign-in credential handed back to the client
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn mint_credential(&self, account_id: &str) -> Result<String, CredentialError>;
}

/// Claims of a minted sign-in credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    /// Local account id the credential signs in as
    pub uid: String,
    pub iat: i64,
    pub exp: i64,
}

fn create_encoding_key(key_data: &str, algorithm: Algorithm) -> Result<EncodingKey, CredentialError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            if key_data.is_empty() {
                return Err(CredentialError::InvalidKey(
                    "HMAC secret must not be empty".to_string(),
                ));
            }
            Ok(EncodingKey::from_secret(key_data.as_bytes()))
        }
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => EncodingKey::from_rsa_pem(key_data.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(format!("Invalid RSA key format: {}", e))),
        Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(key_data.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(format!("Invalid EC key format: {}", e))),
        Algorithm::EdDSA => EncodingKey::from_ed_pem(key_data.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(format!("Invalid EdDSA key format: {}", e))),
    }
}

/// Mints JWT credentials signed with the configured key
#[derive(Clone)]
pub struct JwtCredentialIssuer {
    issuer: String,
    audience: String,
    ttl_secs: i64,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
}

impl JwtCredentialIssuer {
    pub fn new(config: &CredentialConfig) -> Result<Self, CredentialError> {
        let algorithm = Algorithm::from_str(config.algorithm.trim())
            .map_err(|_| CredentialError::UnsupportedAlgorithm(config.algorithm.clone()))?;
        let encoding_key = create_encoding_key(&config.signing_key, algorithm)?;

        Ok(Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl_secs: i64::try_from(config.ttl).unwrap_or(i64::MAX),
            algorithm,
            encoding_key,
        })
    }

    fn claims_for(&self, account_id: &str) -> CredentialClaims {
        let now = Utc::now().timestamp();
        CredentialClaims {
            iss: self.issuer.clone(),
            sub: self.issuer.clone(),
            aud: self.audience.clone(),
            uid: account_id.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        }
    }
}

#[async_trait]
impl CredentialIssuer for JwtCredentialIssuer {
    async fn mint_credential(&self, account_id: &str) -> Result<String, CredentialError> {
        let claims = self.claims_for(account_id);
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }
}
