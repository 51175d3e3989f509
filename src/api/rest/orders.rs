use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use crate::api::rest::principal::CurrentUser;
use crate::error::AppError;
use crate::models::order::{ClientStatus, Decision, Order, OrderId, OrderInput, OrderStatus};
use crate::models::user::UserId;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", post(update_status))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/admin/orders/:id/decision", post(decide_order))
        .route("/admin/orders/:id/assign", post(assign_driver))
        .route("/driver/orders/:id/accept", post(accept_order))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct DecisionResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub driver_id: UserId,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub client_status: Option<ClientStatus>,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<OrderInput>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.brokerage.create_order(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.brokerage.list_orders(&principal).await?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.brokerage.get_order(&principal, id).await?))
}

async fn decide_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<OrderId>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, AppError> {
    let status = state
        .brokerage
        .decide_order(&principal, id, payload.decision, payload.comment)
        .await?;

    Ok(Json(DecisionResponse {
        order_id: id,
        status,
    }))
}

async fn assign_driver(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<OrderId>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .brokerage
        .assign_driver(&principal, id, payload.driver_id)
        .await?;
    Ok(Json(order))
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.brokerage.accept_order(&principal, id).await?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .brokerage
        .update_order_status(&principal, id, payload.status, payload.client_status)
        .await?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<OrderId>,
    payload: Option<Json<CancelRequest>>,
) -> Result<Json<Order>, AppError> {
    let payload = payload.map(|Json(body)| body).unwrap_or_default();
    let order = state
        .brokerage
        .cancel_order(&principal, id, payload.reason)
        .await?;
    Ok(Json(order))
}
