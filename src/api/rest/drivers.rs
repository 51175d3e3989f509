use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use serde::Deserialize;

use crate::api::rest::principal::CurrentUser;
use crate::error::AppError;
use crate::models::driver::{Driver, DriverView, WorkStatus};
use crate::models::user::UserId;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/drivers", get(list_drivers))
        .route("/admin/drivers/:user_id/dismiss", post(dismiss_driver))
        .route("/admin/drivers/:user_id/restore", post(restore_driver))
        .route("/driver/info", get(own_driver))
        .route("/driver/work-status", post(set_work_status))
}

#[derive(Deserialize, Default)]
pub struct DismissRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct WorkStatusRequest {
    pub work_status: WorkStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

async fn list_drivers(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<DriverView>>, AppError> {
    Ok(Json(state.brokerage.list_drivers(&principal).await?))
}

async fn dismiss_driver(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<UserId>,
    payload: Option<Json<DismissRequest>>,
) -> Result<Json<Driver>, AppError> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    let driver = state
        .brokerage
        .dismiss_driver(&principal, user_id, payload.reason)
        .await?;
    Ok(Json(driver))
}

async fn restore_driver(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.brokerage.restore_driver(&principal, user_id).await?))
}

async fn own_driver(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Driver>, AppError> {
    Ok(Json(state.brokerage.own_driver(&principal).await?))
}

async fn set_work_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<WorkStatusRequest>,
) -> Result<Json<Driver>, AppError> {
    let driver = state
        .brokerage
        .set_driver_work_status(&principal, payload.work_status, payload.reason)
        .await?;
    Ok(Json(driver))
}
