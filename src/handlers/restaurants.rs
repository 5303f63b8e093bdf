use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::restaurant::Model as RestaurantModel;
use crate::services::restaurants::OnboardRestaurantRequest;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Onboard a restaurant (admin)
#[utoipa::path(
    post,
    path = "/api/v1/restaurants",
    request_body = OnboardRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant onboarded", body = ApiResponse<RestaurantModel>),
        (status = 409, description = "Slug already taken", body = crate::errors::ErrorResponse),
    )
)]
pub async fn onboard(
    State(state): State<AppState>,
    Json(request): Json<OnboardRestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RestaurantModel>>), ServiceError> {
    let restaurant = state.services.restaurants.onboard(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(restaurant))))
}

/// Active restaurants for customer listings
#[utoipa::path(
    get,
    path = "/api/v1/restaurants",
    responses(
        (status = 200, description = "Active restaurants", body = ApiResponse<Vec<RestaurantModel>>),
    )
)]
pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RestaurantModel>>>, ServiceError> {
    let restaurants = state.services.restaurants.list_active().await?;
    Ok(Json(ApiResponse::success(restaurants)))
}

/// Fetch a restaurant by slug
#[utoipa::path(
    get,
    path = "/api/v1/restaurants/slug/{slug}",
    params(("slug" = String, Path, description = "URL slug")),
    responses(
        (status = 200, description = "Restaurant", body = ApiResponse<RestaurantModel>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<RestaurantModel>>, ServiceError> {
    let restaurant = state.services.restaurants.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(restaurant)))
}

/// Activate or deactivate a tenant (admin)
#[utoipa::path(
    put,
    path = "/api/v1/restaurants/{id}/active",
    params(("id" = Uuid, Path, description = "Restaurant id")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Flag updated", body = ApiResponse<RestaurantModel>),
    )
)]
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<RestaurantModel>>, ServiceError> {
    let restaurant = state
        .services
        .restaurants
        .set_active(id, request.active)
        .await?;
    Ok(Json(ApiResponse::success(restaurant)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(onboard).get(list_active))
        .route("/slug/:slug", get(get_by_slug))
        .route("/:id/active", put(set_active))
}
