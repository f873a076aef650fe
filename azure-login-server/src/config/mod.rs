pub(crate) use crate::config::azure::AzureConfig;
pub(crate) use crate::config::cookie::StateCookieConfig;
pub(crate) use crate::config::credential::CredentialConfig;
pub(crate) use crate::config::store::{StoreBackend, StoreConfig};
use confique::Config;

pub mod azure;
pub mod cookie;
pub mod credential;
pub mod store;

/// Optional configuration file, read in addition to the environment
pub const CONFIG_FILE: &str = "azure-login.toml";

/// Main configuration structure for the login server
#[derive(Debug, Config, Clone)]
pub struct AppConfig {
    /// The port the login server will listen to (default: 7780)
    #[config(env = "AZURE_LOGIN_PORT", default = 7780)]
    pub port: u16,

    /// Prefix of local account ids, joined to the Azure object id with ':'
    /// (default: azure-ad)
    #[config(env = "AZURE_LOGIN_ACCOUNT_PREFIX", default = "azure-ad")]
    pub account_prefix: String,

    /// Timeout in seconds for each component readiness probe (default: 2)
    #[config(env = "AZURE_LOGIN_HEALTHCHECK_TIMEOUT", default = 2.0)]
    pub healthcheck_timeout: f64,

    /// Azure AD application registration
    #[config(nested)]
    pub azure: AzureConfig,

    /// Anti-CSRF state cookie settings
    #[config(nested)]
    pub state_cookie: StateCookieConfig,

    /// Sign-in credential issuer settings
    #[config(nested)]
    pub credential: CredentialConfig,

    /// Account and access-token store settings
    #[config(nested)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Loads the configuration from environment variables and the optional
    /// `azure-login.toml` file. Environment variables take precedence.
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().file(CONFIG_FILE).load()
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(azure_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            account_prefix: "azure-ad".to_string(),
            healthcheck_timeout: 1.0,
            azure: AzureConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                tenant_id: None,
                authority_host: azure_mock.uri(),
                redirect_uri: "https://example.firebaseapp.com/auth.html".to_string(),
                scopes: "openid profile email User.Read".to_string(),
                client_timeout: 5,
            },
            state_cookie: StateCookieConfig {
                name: "state".to_string(),
                max_age: 3600,
                secure: true,
                same_site: "None".to_string(),
            },
            credential: CredentialConfig {
                issuer: "azure-login@test".to_string(),
                audience: "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit".to_string(),
                algorithm: "HS256".to_string(),
                signing_key: "test-signing-secret".to_string(),
                ttl: 3600,
            },
            store: StoreConfig {
                backend: "in-memory".to_string(),
                redis_url: String::new(),
                token_key_prefix: "azureAccessToken".to_string(),
                account_key_prefix: "account".to_string(),
            },
        }
    }
}
