use super::jsonp::Jsonp;
use super::models::{CallbackPayload, CallbackQuery};
use crate::login::{CallbackParams, LoginError};
use crate::openapi::LOGIN_TAG;
use crate::state::AppState;
use axum::extract::{rejection::QueryRejection, Query, State};
use axum_extra::extract::cookie::CookieJar;
use http::Uri;
use log::{error, warn};
use url::form_urlencoded;

/// Completes the login started by `/redirect`.
///
/// Failures are reported in the body, never through the status code, because
/// the result is consumed by a script callback.
#[utoipa::path(
    get,
    path = "/token",
    tag = LOGIN_TAG,
    params(CallbackQuery),
    responses(
        (status = 200, description = "Sign-in credential or error description, as JSONP when `callback` is set", body = CallbackPayload)
    )
)]
pub async fn token(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Jsonp<CallbackPayload> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!("Rejected callback query: {}", rejection);
            return Jsonp::new(
                raw_callback(&uri).as_deref(),
                CallbackPayload::Error {
                    error: rejection.body_text(),
                },
            );
        }
    };

    let callback = query.callback.clone();
    let params = CallbackParams::from(query);
    let cookie_state = jar
        .get(&state.config.state_cookie.name)
        .map(|cookie| cookie.value().to_string());

    let payload = match state.login.complete(cookie_state.as_deref(), &params).await {
        Ok(token) => CallbackPayload::Token { token },
        Err(err) => {
            match &err {
                LoginError::StateMissing | LoginError::StateMismatch => {}
                _ => error!("Login failed: {}", err),
            }
            CallbackPayload::Error {
                error: err.to_string(),
            }
        }
    };

    Jsonp::new(callback.as_deref(), payload)
}

/// First `callback` parameter of a query string the typed extractor rejected
fn raw_callback(uri: &Uri) -> Option<String> {
    form_urlencoded::parse(uri.query()?.as_bytes())
        .find(|(key, _)| key == "callback")
        .map(|(_, value)| value.into_owned())
}
