use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::Serialize;

use crate::api::rest::principal::CurrentUser;
use crate::error::AppError;
use crate::models::application::{
    ApplicationId, ApplicationInput, ApplicationView, DriverApplication,
};
use crate::models::driver::Driver;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/driver/application",
            post(submit_application).get(own_application),
        )
        .route("/admin/driver_applications", get(list_applications))
        .route(
            "/admin/driver_application/:id/approve",
            post(approve_application),
        )
        .route("/admin/driver_application/:id/reject", post(reject_application))
}

#[derive(Serialize)]
pub struct SubmittedResponse {
    pub application_id: ApplicationId,
}

async fn submit_application(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ApplicationInput>,
) -> Result<(StatusCode, Json<SubmittedResponse>), AppError> {
    let application_id = state
        .brokerage
        .submit_driver_application(&principal, payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmittedResponse { application_id }),
    ))
}

async fn own_application(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Option<DriverApplication>>, AppError> {
    Ok(Json(state.brokerage.own_driver_application(&principal).await?))
}

async fn list_applications(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    Ok(Json(
        state.brokerage.list_driver_applications(&principal).await?,
    ))
}

async fn approve_application(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<ApplicationId>,
) -> Result<Json<Driver>, AppError> {
    let driver = state
        .brokerage
        .approve_driver_application(&principal, id)
        .await?;
    Ok(Json(driver))
}

async fn reject_application(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<ApplicationId>,
) -> Result<Json<DriverApplication>, AppError> {
    let application = state
        .brokerage
        .reject_driver_application(&principal, id)
        .await?;
    Ok(Json(application))
}
