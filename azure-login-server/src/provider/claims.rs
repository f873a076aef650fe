use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("Identity token missing from token response")]
    Missing,
    #[error("Malformed identity token: {0}")]
    Malformed(String),
    #[error("Identity token has no '{0}' claim")]
    MissingClaim(&'static str),
}

/// Identity of the signed-in user as asserted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Immutable object id of the user in the directory
    pub subject: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
}

/// Decodes the payload of an id token.
///
/// The signature is not checked; the token is trusted because it was received
/// directly from the token endpoint over TLS.
pub fn decode_identity_claims(id_token: &str) -> Result<IdentityClaims, ClaimsError> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(ClaimsError::Malformed(
            "expected three dot separated segments".to_string(),
        ));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| ClaimsError::Malformed(format!("payload is not base64url: {}", e)))?;
    let raw: RawClaims = serde_json::from_slice(&payload)
        .map_err(|e| ClaimsError::Malformed(format!("payload is not a JSON object: {}", e)))?;

    let subject = raw
        .oid
        .filter(|oid| !oid.is_empty())
        .ok_or(ClaimsError::MissingClaim("oid"))?;

    Ok(IdentityClaims {
        subject,
        display_name: raw.name,
        // Work and school accounts without a mailbox only carry the UPN
        email: raw.email.or(raw.preferred_username),
    })
}
