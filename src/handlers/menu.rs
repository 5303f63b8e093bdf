use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::menu_item::Model as MenuItemModel;
use crate::services::menu::CreateMenuItemRequest;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuListParams {
    pub restaurant_id: Uuid,
    #[serde(default)]
    pub available_only: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleLootRequest {
    pub discount_percentage: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAvailabilityRequest {
    pub available: bool,
}

/// Add a menu item
#[utoipa::path(
    post,
    path = "/api/v1/menu-items",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Item created with selling price fixed", body = ApiResponse<MenuItemModel>),
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateMenuItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MenuItemModel>>), ServiceError> {
    let item = state.services.menu.create_item(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// List a restaurant's menu
#[utoipa::path(
    get,
    path = "/api/v1/menu-items",
    params(
        ("restaurant_id" = Uuid, Query, description = "Restaurant id"),
        ("available_only" = Option<bool>, Query, description = "Hide unavailable items"),
    ),
    responses(
        (status = 200, description = "Menu items", body = ApiResponse<Vec<MenuItemModel>>),
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<MenuListParams>,
) -> Result<Json<ApiResponse<Vec<MenuItemModel>>>, ServiceError> {
    let items = state
        .services
        .menu
        .list_items(params.restaurant_id, params.available_only)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Set remaining stock for a flash-sale item
#[utoipa::path(
    put,
    path = "/api/v1/menu-items/{id}/stock",
    params(("id" = Uuid, Path, description = "Menu item id")),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse<MenuItemModel>),
    )
)]
pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStockRequest>,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    let item = state.services.menu.update_stock(id, request.stock).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Toggle loot (flash-sale) mode
#[utoipa::path(
    post,
    path = "/api/v1/menu-items/{id}/loot",
    params(("id" = Uuid, Path, description = "Menu item id")),
    request_body = ToggleLootRequest,
    responses(
        (status = 200, description = "Loot mode toggled", body = ApiResponse<MenuItemModel>),
        (status = 422, description = "No stock to enable loot mode", body = crate::errors::ErrorResponse),
    )
)]
pub async fn toggle_loot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ToggleLootRequest>,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    let item = state
        .services
        .menu
        .toggle_loot_mode(id, request.discount_percentage)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Flip item availability
#[utoipa::path(
    put,
    path = "/api/v1/menu-items/{id}/availability",
    params(("id" = Uuid, Path, description = "Menu item id")),
    request_body = SetAvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = ApiResponse<MenuItemModel>),
    )
)]
pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<ApiResponse<MenuItemModel>>, ServiceError> {
    let item = state
        .services
        .menu
        .set_availability(id, request.available)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/:id/stock", put(update_stock))
        .route("/:id/loot", post(toggle_loot))
        .route("/:id/availability", put(set_availability))
}
