use crate::login::CallbackParams;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters of the provider callback
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Authorization code issued by the provider
    pub code: Option<String>,
    /// State token echoed back by the provider
    pub state: Option<String>,
    /// OAuth error code, set instead of `code` when authorization failed
    pub error: Option<String>,
    pub error_description: Option<String>,
    /// Name of the script function the result is passed to
    pub callback: Option<String>,
}

impl From<CallbackQuery> for CallbackParams {
    fn from(query: CallbackQuery) -> Self {
        CallbackParams {
            code: query.code,
            state: query.state,
            error: query.error,
            error_description: query.error_description,
        }
    }
}

/// Result of the callback, distinguished by key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CallbackPayload {
    /// Sign-in credential to redeem with the account backend
    Token { token: String },
    /// Description of why the login failed
    Error { error: String },
}
