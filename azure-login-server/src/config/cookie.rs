use axum_extra::extract::cookie::SameSite;
use confique::Config;

/// Configuration for the cookie binding the login state to the browser
#[derive(Debug, Config, Clone)]
pub struct StateCookieConfig {
    /// Cookie name (default: state)
    #[config(env = "AZURE_LOGIN_STATE_COOKIE_NAME", default = "state")]
    pub name: String,

    /// Cookie lifetime in seconds (default: 3600 = 1 hour)
    #[config(env = "AZURE_LOGIN_STATE_COOKIE_MAX_AGE", default = 3600)]
    pub max_age: i64,

    /// Only send the cookie over HTTPS (default: true)
    #[config(env = "AZURE_LOGIN_STATE_COOKIE_SECURE", default = true)]
    pub secure: bool,

    /// SameSite attribute: "None", "Lax" or "Strict" (default: None).
    /// The callback is usually fetched cross-site as a script, which Lax and
    /// Strict cookies are not sent with.
    #[config(env = "AZURE_LOGIN_STATE_COOKIE_SAME_SITE", default = "None")]
    pub same_site: String,
}

impl StateCookieConfig {
    pub fn same_site(&self) -> SameSite {
        match self.same_site.trim().to_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "lax" => SameSite::Lax,
            _ => SameSite::None,
        }
    }
}
