//! HTTP handlers for authentication endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{
    AuthService, AuthTokens, ChangePasswordInput, LoginInput, RegisterInput,
};
use crate::AppState;

/// Register a new user account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.register(input).await?;
    Ok(Json(tokens))
}

/// Log in with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(input).await?;
    Ok(Json(tokens))
}

/// Return the account behind the presented token
pub async fn verify(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let service = AuthService::new(state.db, &state.config);
    let user = service.get_user(current_user.0.user_id).await?;
    Ok(Json(user))
}

/// Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<Json<()>> {
    let service = AuthService::new(state.db, &state.config);
    service
        .change_password(current_user.0.user_id, input)
        .await?;
    Ok(Json(()))
}
