use crate::api::health::models::{
    ComponentHealth, ComponentStatus, HealthResponse, HealthStatusType, LivenessResponse,
};
use crate::api::login::models::CallbackPayload;
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const LOGIN_TAG: &str = "Login API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::login::redirect::redirect,
        crate::api::login::callback::token,
        crate::api::health::handlers::health_check,
        crate::api::health::handlers::ready_check,
    ),
    components(schemas(
        CallbackPayload,
        LivenessResponse,
        HealthResponse,
        ComponentHealth,
        ComponentStatus,
        HealthStatusType,
    )),
    tags(
        (name = LOGIN_TAG, description = "Azure AD authorization-code login endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    ),
    info(
        title = "Azure AD Login API",
        description = "Federates Azure AD identities into local accounts and issues sign-in credentials",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
