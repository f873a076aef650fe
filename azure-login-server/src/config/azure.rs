use confique::Config;

/// Tenant used when none is configured; accepts any Microsoft account
pub const DEFAULT_TENANT: &str = "common";

/// Configuration for the Azure AD application used to sign users in
#[derive(Debug, Config, Clone)]
pub struct AzureConfig {
    /// Application (client) id of the app registration
    #[config(env = "AZURE_LOGIN_CLIENT_ID")]
    pub client_id: String,

    /// Client secret of the app registration
    #[config(env = "AZURE_LOGIN_CLIENT_SECRET")]
    pub client_secret: String,

    /// Directory (tenant) id; the `common` endpoint is used when unset
    #[config(env = "AZURE_LOGIN_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Identity platform host (default: https://login.microsoftonline.com)
    #[config(
        env = "AZURE_LOGIN_AUTHORITY_HOST",
        default = "https://login.microsoftonline.com"
    )]
    pub authority_host: String,

    /// Fixed URI the provider redirects back to after consent
    #[config(env = "AZURE_LOGIN_REDIRECT_URI")]
    pub redirect_uri: String,

    /// Space separated scopes requested on every login
    #[config(env = "AZURE_LOGIN_SCOPES", default = "openid profile email User.Read")]
    pub scopes: String,

    /// The timeout for token endpoint requests in seconds (default: 10)
    #[config(env = "AZURE_LOGIN_CLIENT_TIMEOUT", default = 10)]
    pub client_timeout: u64,
}

impl AzureConfig {
    /// Returns the configured tenant, falling back to `common`
    pub fn tenant(&self) -> &str {
        match self.tenant_id.as_deref() {
            Some(tenant) if !tenant.trim().is_empty() => tenant.trim(),
            _ => DEFAULT_TENANT,
        }
    }

    /// Authorization endpoint of the v2.0 identity platform
    pub fn authorize_endpoint(&self) -> String {
        self.endpoint("authorize")
    }

    /// Token endpoint of the v2.0 identity platform
    pub fn token_endpoint(&self) -> String {
        self.endpoint("token")
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/{}",
            self.authority_host.trim_end_matches('/'),
            self.tenant(),
            name
        )
    }
}
