use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::coupon::{self, ActiveModel as CouponActiveModel, Entity as CouponEntity},
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCouponRequest {
    pub restaurant_id: Uuid,
    #[validate(length(min = 3, max = 20, message = "Code must be 3 to 20 characters"))]
    pub code: String,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
}

/// Result of a successful coupon application. The redemption is recorded on
/// the order at creation time, never on the coupon itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Decimal,
}

#[derive(Clone)]
pub struct CouponService {
    db: Arc<DbPool>,
}

impl CouponService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Validates a coupon code against a restaurant's active set.
    ///
    /// Lookup is case-insensitive (codes are stored uppercase) and the
    /// minimum-order check uses the pre-discount cart subtotal, not the
    /// post-delivery-fee total. Pure validation: no state is mutated.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id, code = %code))]
    pub async fn apply_coupon(
        &self,
        restaurant_id: Uuid,
        code: &str,
        cart_subtotal: Decimal,
    ) -> Result<AppliedCoupon, ServiceError> {
        let normalized = code.trim().to_uppercase();

        let coupon = CouponEntity::find()
            .filter(coupon::Column::RestaurantId.eq(restaurant_id))
            .filter(coupon::Column::Code.eq(normalized.clone()))
            .filter(coupon::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                debug!("No active coupon matched");
                ServiceError::CouponNotFound(normalized.clone())
            })?;

        if cart_subtotal < coupon.min_order_value {
            warn!(
                min_order_value = %coupon.min_order_value,
                subtotal = %cart_subtotal,
                "Coupon below minimum order value"
            );
            return Err(ServiceError::BelowMinimumOrder(coupon.min_order_value));
        }

        Ok(AppliedCoupon {
            code: coupon.code,
            discount: coupon.discount_value,
        })
    }

    /// Creates a coupon for a restaurant. Codes are normalized to uppercase
    /// before storage so lookups stay case-insensitive.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id))]
    pub async fn create_coupon(
        &self,
        request: CreateCouponRequest,
    ) -> Result<coupon::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        if request.discount_value <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Discount value must be positive".to_string(),
            ));
        }
        if request.min_order_value < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Minimum order value cannot be negative".to_string(),
            ));
        }

        let code = request.code.trim().to_uppercase();

        let existing = CouponEntity::find()
            .filter(coupon::Column::RestaurantId.eq(request.restaurant_id))
            .filter(coupon::Column::Code.eq(code.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Coupon {} already exists for this restaurant",
                code
            )));
        }

        let model = CouponActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(request.restaurant_id),
            code: Set(code.clone()),
            discount_value: Set(request.discount_value),
            min_order_value: Set(request.min_order_value),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db).await?;
        info!(coupon_id = %created.id, code = %code, "Coupon created");
        Ok(created)
    }

    /// Lists a restaurant's coupons, newest first.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn list_coupons(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<coupon::Model>, ServiceError> {
        let coupons = CouponEntity::find()
            .filter(coupon::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(coupon::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(coupons)
    }

    /// Flips a coupon's active flag.
    #[instrument(skip(self), fields(coupon_id = %coupon_id))]
    pub async fn toggle_coupon(&self, coupon_id: Uuid) -> Result<coupon::Model, ServiceError> {
        let coupon = CouponEntity::find_by_id(coupon_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", coupon_id)))?;

        let was_active = coupon.is_active;
        let mut active: CouponActiveModel = coupon.into();
        active.is_active = Set(!was_active);
        let updated = active.update(&*self.db).await?;

        info!(coupon_id = %coupon_id, is_active = updated.is_active, "Coupon toggled");
        Ok(updated)
    }

    /// Deletes a coupon. Orders that already redeemed it keep their recorded
    /// code and discount.
    #[instrument(skip(self), fields(coupon_id = %coupon_id))]
    pub async fn delete_coupon(&self, coupon_id: Uuid) -> Result<(), ServiceError> {
        let result = CouponEntity::delete_by_id(coupon_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Coupon {} not found",
                coupon_id
            )));
        }
        Ok(())
    }
}
