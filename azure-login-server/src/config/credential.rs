use confique::Config;

/// Configuration for the signed sign-in credentials handed to clients
#[derive(Debug, Config, Clone)]
pub struct CredentialConfig {
    /// `iss` and `sub` claim of minted credentials
    #[config(env = "AZURE_LOGIN_CREDENTIAL_ISSUER", default = "azure-login")]
    pub issuer: String,

    /// `aud` claim of minted credentials
    #[config(
        env = "AZURE_LOGIN_CREDENTIAL_AUDIENCE",
        default = "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit"
    )]
    pub audience: String,

    /// JWT signing algorithm, e.g. HS256 or RS256 (default: HS256)
    #[config(env = "AZURE_LOGIN_CREDENTIAL_ALGORITHM", default = "HS256")]
    pub algorithm: String,

    /// HMAC secret, or PEM encoded private key for asymmetric algorithms
    #[config(env = "AZURE_LOGIN_CREDENTIAL_SIGNING_KEY")]
    pub signing_key: String,

    /// Credential lifetime in seconds (default: 3600 = 1 hour)
    #[config(env = "AZURE_LOGIN_CREDENTIAL_TTL", default = 3600)]
    pub ttl: u64,
}
