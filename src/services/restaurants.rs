use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::restaurant::{self, ActiveModel as RestaurantActiveModel, Entity as RestaurantEntity},
    errors::ServiceError,
    services::pricing,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct OnboardRestaurantRequest {
    #[validate(length(min = 2, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 2, max = 60, message = "Slug is required"))]
    pub slug: String,
    #[validate(length(min = 10, max = 15, message = "Owner phone is required"))]
    pub owner_phone: String,
    #[validate(length(min = 3, max = 100, message = "UPI id is required"))]
    pub upi_id: String,
    pub tech_fee: Decimal,
    pub delivery_fee: Decimal,
    pub free_delivery_threshold: Option<Decimal>,
    pub min_balance_limit: Decimal,
    pub gst_number: Option<String>,
    #[serde(default)]
    pub gst_enabled: bool,
    pub food_gst_rate: Option<Decimal>,
}

#[derive(Clone)]
pub struct RestaurantService {
    db: Arc<DbPool>,
    default_food_gst_rate: Decimal,
}

impl RestaurantService {
    pub fn new(db: Arc<DbPool>, default_food_gst_rate: Decimal) -> Self {
        Self {
            db,
            default_food_gst_rate,
        }
    }

    /// Onboards a tenant. Slugs are URL-unique; a GST number, when supplied,
    /// is normalized and format-checked before storage.
    #[instrument(skip(self, request), fields(slug = %request.slug))]
    pub async fn onboard(
        &self,
        request: OnboardRestaurantRequest,
    ) -> Result<restaurant::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        if request.tech_fee < Decimal::ZERO || request.delivery_fee < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Fees cannot be negative".to_string(),
            ));
        }

        let slug = request.slug.trim().to_lowercase();
        let existing = RestaurantEntity::find()
            .filter(restaurant::Column::Slug.eq(slug.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Slug {} is already taken",
                slug
            )));
        }

        let gst_number = match request.gst_number.as_deref() {
            Some(raw) => {
                let normalized = pricing::normalize_gstin(raw);
                if !pricing::is_valid_gstin(&normalized) {
                    return Err(ServiceError::ValidationError(format!(
                        "Invalid GST number: {raw}"
                    )));
                }
                Some(normalized)
            }
            None => None,
        };
        let is_gst_registered = gst_number.is_some();

        let model = RestaurantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.clone()),
            slug: Set(slug.clone()),
            owner_phone: Set(request.owner_phone),
            upi_id: Set(request.upi_id),
            is_active: Set(true),
            tech_fee: Set(request.tech_fee),
            delivery_fee: Set(request.delivery_fee),
            free_delivery_threshold: Set(request.free_delivery_threshold),
            rating_avg: Set(Decimal::ZERO),
            rating_count: Set(0),
            credit_balance: Set(Decimal::ZERO),
            min_balance_limit: Set(request.min_balance_limit),
            gst_number: Set(gst_number),
            is_gst_registered: Set(is_gst_registered),
            food_gst_rate: Set(request.food_gst_rate.unwrap_or(self.default_food_gst_rate)),
            gst_enabled: Set(request.gst_enabled && is_gst_registered),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db).await?;
        info!(restaurant_id = %created.id, slug = %slug, "Restaurant onboarded");
        Ok(created)
    }

    /// Active restaurants for customer-facing listings. Suspended or
    /// deactivated tenants never show up here.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<restaurant::Model>, ServiceError> {
        let restaurants = RestaurantEntity::find()
            .filter(restaurant::Column::IsActive.eq(true))
            .order_by_desc(restaurant::Column::RatingAvg)
            .all(&*self.db)
            .await?;
        Ok(restaurants)
    }

    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<restaurant::Model, ServiceError> {
        RestaurantEntity::find()
            .filter(restaurant::Column::Slug.eq(slug.to_lowercase()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Restaurant {} not found", slug)))
    }

    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn get(&self, restaurant_id: Uuid) -> Result<restaurant::Model, ServiceError> {
        RestaurantEntity::find_by_id(restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant {} not found", restaurant_id))
            })
    }

    /// Activates or deactivates a tenant.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id, active = active))]
    pub async fn set_active(
        &self,
        restaurant_id: Uuid,
        active: bool,
    ) -> Result<restaurant::Model, ServiceError> {
        let rst = self.get(restaurant_id).await?;
        let mut model: RestaurantActiveModel = rst.into();
        model.is_active = Set(active);
        let updated = model.update(&*self.db).await?;
        Ok(updated)
    }
}
