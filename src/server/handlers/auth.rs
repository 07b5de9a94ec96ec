use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::AuthService;
use crate::database::entities::users;
use crate::errors::AuthError;
use crate::server::app::AppState;
use crate::server::extract::CurrentUser;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: users::Model,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let (token, user) = AuthService::new(state.db.clone())
        .login(&payload.email, &payload.password)
        .await
        .map_err(|err| match err {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            err => {
                error!("Login failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    Ok(Json(LoginResponse { token, user }))
}

#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "All sessions revoked"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, StatusCode> {
    AuthService::new(state.db.clone())
        .logout(user.id)
        .await
        .map_err(|err| {
            error!("Logout failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/v1/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Old password does not match")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, StatusCode> {
    AuthService::new(state.db.clone())
        .change_password(user.id, &payload.old_password, &payload.new_password)
        .await
        .map_err(|err| match err {
            AuthError::PasswordMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            err => {
                error!("Password change failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    Ok(StatusCode::NO_CONTENT)
}
