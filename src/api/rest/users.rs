use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::api::rest::principal::CurrentUser;
use crate::error::AppError;
use crate::models::user::{PasswordChange, PasswordReset, ProfileInput, RegistrationInput, User};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/reset-password", post(reset_password))
        .route("/profile", get(profile).post(update_profile))
        .route("/profile/password", post(change_password))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegistrationInput>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.brokerage.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.brokerage.profile(&principal).await?))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ProfileInput>,
) -> Result<Json<User>, AppError> {
    Ok(Json(
        state.brokerage.update_profile(&principal, payload).await?,
    ))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<PasswordChange>,
) -> Result<StatusCode, AppError> {
    state.brokerage.change_password(&principal, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasswordReset>,
) -> Result<StatusCode, AppError> {
    state.brokerage.reset_password(payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
