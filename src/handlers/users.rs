//! # User API Handlers

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};

use crate::auth::OperatorAuth;
use crate::error::ApiError;
use crate::models::user::UserResponse;
use crate::repositories::{NewUser, UserRepository};
use crate::server::AppState;

/// Create a user account
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    security(("bearer_auth" = [])),
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 409, description = "Username or email already registered", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = payload?;
    let user = UserRepository::new(&state.db).create_user(request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
