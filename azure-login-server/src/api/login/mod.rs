pub(crate) mod callback;
pub(crate) mod jsonp;
pub(crate) mod models;
pub(crate) mod redirect;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/redirect", get(redirect::redirect))
        .route("/token", get(callback::token))
}
