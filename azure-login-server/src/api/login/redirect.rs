use crate::errors::ApiError;
use crate::login::generate_state_token;
use crate::openapi::LOGIN_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use log::{debug, error, info};

/// Redirects the browser to the Azure AD consent screen
#[utoipa::path(
    get,
    path = "/redirect",
    tag = LOGIN_TAG,
    responses(
        (status = 302, description = "Redirect to the Azure AD authorization endpoint, setting the state cookie"),
        (status = 500, description = "The authorization URL could not be built")
    )
)]
pub async fn redirect(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiError> {
    let cookie_config = &state.config.state_cookie;

    let state_token = match jar.get(&cookie_config.name) {
        Some(cookie) if !cookie.value().is_empty() => {
            debug!("Reusing state token from existing cookie");
            cookie.value().to_string()
        }
        _ => generate_state_token(),
    };

    let url = state.login.authorization_url(&state_token).map_err(|e| {
        error!("Failed to build authorization URL: {}", e);
        ApiError::internal(format!("Failed to build authorization URL: {}", e))
    })?;

    let cookie = Cookie::build((cookie_config.name.clone(), state_token))
        .path("/")
        .http_only(true)
        .secure(cookie_config.secure)
        .same_site(cookie_config.same_site())
        .max_age(time::Duration::seconds(cookie_config.max_age))
        .build();

    info!("Redirecting to {}", url.origin().ascii_serialization());

    Ok((
        StatusCode::FOUND,
        jar.add(cookie),
        [(header::LOCATION, url.to_string())],
    )
        .into_response())
}
