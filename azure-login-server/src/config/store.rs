use confique::Config;
use std::str::FromStr;

/// Specifies which store implementation backs accounts and access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-memory" | "memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(format!(
                "Unknown store backend '{other}', expected 'in-memory' or 'redis'"
            )),
        }
    }
}

/// Configuration for the account and access-token stores
#[derive(Debug, Config, Clone)]
pub struct StoreConfig {
    /// Store type: "in-memory" (default) or "redis"
    #[config(env = "AZURE_LOGIN_STORE_BACKEND", default = "in-memory")]
    pub backend: String,

    /// Redis connection string, required for the redis backend
    #[config(env = "AZURE_LOGIN_STORE_REDIS_URL", default = "")]
    pub redis_url: String,

    /// Key namespace of stored provider access tokens
    #[config(env = "AZURE_LOGIN_STORE_TOKEN_KEY_PREFIX", default = "azureAccessToken")]
    pub token_key_prefix: String,

    /// Key namespace of stored account records
    #[config(env = "AZURE_LOGIN_STORE_ACCOUNT_KEY_PREFIX", default = "account")]
    pub account_key_prefix: String,
}

impl StoreConfig {
    /// Parses the configured backend name
    pub fn backend(&self) -> Result<StoreBackend, String> {
        self.backend.parse()
    }
}
