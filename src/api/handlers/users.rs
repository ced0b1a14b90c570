use crate::store::{Store, UserStore, UserSummary};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users without credentials, ordered by id.", body = [UserSummary]),
        (status = 500, description = "Store failure."),
    ),
    tag = "auth"
)]
pub async fn list_users(store: Extension<Arc<dyn Store>>) -> Response {
    match store.list_users().await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(err) => {
            error!("Failed to list users: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching users".to_string(),
            )
                .into_response()
        }
    }
}
