use super::{auth_error_response, valid_email, MessageResponse};
use crate::auth::AuthService;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/signup",
    request_body = SignupRequest,
    responses (
        (status = 200, description = "User created", body = MessageResponse, content_type = "application/json"),
        (status = 400, description = "Missing payload, invalid email, empty name or empty password"),
        (status = 409, description = "Email already in use"),
        (status = 500, description = "Password hashing or store failure"),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn signup(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("signup: {:?}", request);

    if request.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid name".to_string()).into_response();
    }

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if request.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    match auth
        .signup(&request.name, &request.email, &request.password)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("User created successfully")),
        )
            .into_response(),
        Err(err) => auth_error_response(&err).into_response(),
    }
}
