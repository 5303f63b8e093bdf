use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::order::OrderStatus;
use crate::services::orders::{
    CreateOrderRequest, OrderFilter, OrderListResponse, OrderNotification, OrderResponse,
};
use crate::{errors::ServiceError, ApiResponse, AppState, ListQuery};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListParams {
    pub restaurant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Place an order
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid cart or coupon", body = crate::errors::ErrorResponse),
        (status = 403, description = "Restaurant suspended", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let order = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// List orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("restaurant_id" = Option<Uuid>, Query, description = "Filter by restaurant"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<OrderListResponse>),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(pagination): Query<ListQuery>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<ApiResponse<OrderListResponse>>, ServiceError> {
    let filter = OrderFilter {
        restaurant_id: params.restaurant_id,
        customer_id: params.customer_id,
        status: params.status,
    };
    let result = state
        .services
        .orders
        .list_orders(filter, pagination.page, pagination.limit)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Get an order by id
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Get an order by short code
#[utoipa::path(
    get,
    path = "/api/v1/orders/short/{short_id}",
    params(("short_id" = String, Path, description = "Human-readable order code")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order_by_short_id(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order = state
        .services
        .orders
        .get_order_by_short_id(&short_id)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Advance an order one step along the kitchen flow
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/advance",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order advanced", body = ApiResponse<OrderResponse>),
        (status = 409, description = "No next step from the current status", body = crate::errors::ErrorResponse),
    )
)]
pub async fn advance_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    state.services.order_status.advance(id).await?;
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Apply an explicit, validated status transition
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already delivered", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    state
        .services
        .order_status
        .update_status(id, request.status)
        .await?;
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Hand a READY order to the rider pool
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/request-rider",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Searching for a rider", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Order is not ready", body = crate::errors::ErrorResponse),
    )
)]
pub async fn request_rider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    state.services.order_status.request_rider(id).await?;
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Owner notification payload (WhatsApp summary + UPI link)
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/notification",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Notification links", body = ApiResponse<OrderNotification>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn order_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderNotification>>, ServiceError> {
    let notification = state.services.orders.notification_links(id).await?;
    Ok(Json(ApiResponse::success(notification)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/short/:short_id", get(get_order_by_short_id))
        .route("/:id/advance", post(advance_order))
        .route("/:id/status", post(update_order_status))
        .route("/:id/request-rider", post(request_rider))
        .route("/:id/notification", get(order_notification))
}
