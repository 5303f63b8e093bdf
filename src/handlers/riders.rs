use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::order::Model as OrderModel;
use crate::services::riders::RiderEarnings;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RiderActionRequest {
    pub rider_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RiderOnlineRequest {
    pub rider_id: Uuid,
    pub online: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RiderQuery {
    pub rider_id: Uuid,
    pub window_days: Option<i64>,
}

/// Orders waiting for a rider
#[utoipa::path(
    get,
    path = "/api/v1/rider/orders/available",
    responses(
        (status = 200, description = "Unclaimed orders, oldest first", body = ApiResponse<Vec<OrderModel>>),
    )
)]
pub async fn available_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OrderModel>>>, ServiceError> {
    let orders = state.services.riders.list_available_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Orders the rider is currently carrying
#[utoipa::path(
    get,
    path = "/api/v1/rider/orders/active",
    params(("rider_id" = Uuid, Query, description = "Rider profile id")),
    responses(
        (status = 200, description = "Assigned and out-for-delivery orders", body = ApiResponse<Vec<OrderModel>>),
    )
)]
pub async fn active_orders(
    State(state): State<AppState>,
    Query(query): Query<RiderQuery>,
) -> Result<Json<ApiResponse<Vec<OrderModel>>>, ServiceError> {
    let orders = state
        .services
        .riders
        .list_active_orders(query.rider_id)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Claim an order (first rider wins)
#[utoipa::path(
    post,
    path = "/api/v1/rider/orders/{id}/claim",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = RiderActionRequest,
    responses(
        (status = 200, description = "Order claimed", body = ApiResponse<OrderModel>),
        (status = 409, description = "Another rider already claimed it", body = crate::errors::ErrorResponse),
    )
)]
pub async fn claim_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RiderActionRequest>,
) -> Result<Json<ApiResponse<OrderModel>>, ServiceError> {
    let order = state
        .services
        .riders
        .claim_order(id, request.rider_id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Mark an assigned order as picked up
#[utoipa::path(
    post,
    path = "/api/v1/rider/orders/{id}/pickup",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = RiderActionRequest,
    responses(
        (status = 200, description = "Out for delivery", body = ApiResponse<OrderModel>),
        (status = 403, description = "Assigned to a different rider", body = crate::errors::ErrorResponse),
    )
)]
pub async fn pickup_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RiderActionRequest>,
) -> Result<Json<ApiResponse<OrderModel>>, ServiceError> {
    let order = state
        .services
        .riders
        .pickup_order(id, request.rider_id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Complete a delivery
#[utoipa::path(
    post,
    path = "/api/v1/rider/orders/{id}/deliver",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = RiderActionRequest,
    responses(
        (status = 200, description = "Delivered", body = ApiResponse<OrderModel>),
        (status = 403, description = "Assigned to a different rider", body = crate::errors::ErrorResponse),
    )
)]
pub async fn deliver_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RiderActionRequest>,
) -> Result<Json<ApiResponse<OrderModel>>, ServiceError> {
    let order = state
        .services
        .riders
        .complete_delivery(id, request.rider_id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Toggle rider availability
#[utoipa::path(
    post,
    path = "/api/v1/rider/status",
    request_body = RiderOnlineRequest,
    responses(
        (status = 200, description = "Availability updated"),
    )
)]
pub async fn set_online(
    State(state): State<AppState>,
    Json(request): Json<RiderOnlineRequest>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state
        .services
        .riders
        .set_online(request.rider_id, request.online)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

/// Delivery count and payout for a window (default 1 day)
#[utoipa::path(
    get,
    path = "/api/v1/rider/earnings",
    params(
        ("rider_id" = Uuid, Query, description = "Rider profile id"),
        ("window_days" = Option<i64>, Query, description = "Window in days (default: 1)"),
    ),
    responses(
        (status = 200, description = "Earnings summary", body = ApiResponse<RiderEarnings>),
    )
)]
pub async fn earnings(
    State(state): State<AppState>,
    Query(query): Query<RiderQuery>,
) -> Result<Json<ApiResponse<RiderEarnings>>, ServiceError> {
    let earnings = state
        .services
        .riders
        .earnings(query.rider_id, query.window_days.unwrap_or(1))
        .await?;
    Ok(Json(ApiResponse::success(earnings)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders/available", get(available_orders))
        .route("/orders/active", get(active_orders))
        .route("/orders/:id/claim", post(claim_order))
        .route("/orders/:id/pickup", post(pickup_order))
        .route("/orders/:id/deliver", post(deliver_order))
        .route("/status", post(set_online))
        .route("/earnings", get(earnings))
}
