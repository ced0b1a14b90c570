//! Session-protected identity endpoint.

use super::bearer_token;
use crate::auth::{AuthService, Identity};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Identity asserted by the session token.", body = Identity),
        (status = 401, description = "Missing, malformed, forged or expired session token."),
    ),
    tag = "auth"
)]
pub async fn me(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> Response {
    let Some(token) = bearer_token(&headers) else {
        debug!("missing bearer token");
        return unauthorized();
    };

    match auth.validate_session(token) {
        Ok(identity) => (StatusCode::OK, Json(identity)).into_response(),
        Err(_) => unauthorized(),
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response()
}
