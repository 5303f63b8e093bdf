use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::coupon::Model as CouponModel;
use crate::services::coupons::{AppliedCoupon, CreateCouponRequest};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CouponListParams {
    pub restaurant_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    pub restaurant_id: Uuid,
    pub code: String,
    pub cart_subtotal: Decimal,
}

/// Create a coupon
#[utoipa::path(
    post,
    path = "/api/v1/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = ApiResponse<CouponModel>),
        (status = 409, description = "Code already exists", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CouponModel>>), ServiceError> {
    let coupon = state.services.coupons.create_coupon(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(coupon))))
}

/// List a restaurant's coupons
#[utoipa::path(
    get,
    path = "/api/v1/coupons",
    params(("restaurant_id" = Uuid, Query, description = "Restaurant id")),
    responses(
        (status = 200, description = "Coupons", body = ApiResponse<Vec<CouponModel>>),
    )
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    Query(params): Query<CouponListParams>,
) -> Result<Json<ApiResponse<Vec<CouponModel>>>, ServiceError> {
    let coupons = state
        .services
        .coupons
        .list_coupons(params.restaurant_id)
        .await?;
    Ok(Json(ApiResponse::success(coupons)))
}

/// Validate a coupon against a cart subtotal
#[utoipa::path(
    post,
    path = "/api/v1/coupons/apply",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon applies; discount returned", body = ApiResponse<AppliedCoupon>),
        (status = 404, description = "No active coupon with that code", body = crate::errors::ErrorResponse),
        (status = 400, description = "Cart below the minimum order value", body = crate::errors::ErrorResponse),
    )
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Json(request): Json<ApplyCouponRequest>,
) -> Result<Json<ApiResponse<AppliedCoupon>>, ServiceError> {
    let applied = state
        .services
        .coupons
        .apply_coupon(request.restaurant_id, &request.code, request.cart_subtotal)
        .await?;
    Ok(Json(ApiResponse::success(applied)))
}

/// Toggle a coupon's active flag
#[utoipa::path(
    post,
    path = "/api/v1/coupons/{id}/toggle",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 200, description = "Coupon toggled", body = ApiResponse<CouponModel>),
        (status = 404, description = "Coupon not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn toggle_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CouponModel>>, ServiceError> {
    let coupon = state.services.coupons.toggle_coupon(id).await?;
    Ok(Json(ApiResponse::success(coupon)))
}

/// Delete a coupon
#[utoipa::path(
    delete,
    path = "/api/v1/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 204, description = "Coupon deleted"),
        (status = 404, description = "Coupon not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.coupons.delete_coupon(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_coupon).get(list_coupons))
        .route("/apply", post(apply_coupon))
        .route("/:id/toggle", post(toggle_coupon))
        .route("/:id", delete(delete_coupon))
}
