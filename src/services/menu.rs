use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::menu_item::{
        self, ActiveModel as MenuItemActiveModel, Entity as MenuItemEntity, MysteryType,
    },
    entities::restaurant::Entity as RestaurantEntity,
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMenuItemRequest {
    pub restaurant_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Category is required"))]
    pub category: String,
    pub image_url: Option<String>,
    pub base_price: Decimal,
    #[serde(default = "default_true")]
    pub is_veg: bool,
    #[serde(default)]
    pub is_mystery: bool,
    pub mystery_type: Option<MysteryType>,
    pub promo_description: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone)]
pub struct MenuService {
    db: Arc<DbPool>,
}

impl MenuService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a menu item. The selling price is fixed here as
    /// base price + the restaurant's tech fee; later tech-fee changes do not
    /// reprice existing items.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, name = %request.name))]
    pub async fn create_item(
        &self,
        request: CreateMenuItemRequest,
    ) -> Result<menu_item::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        if request.base_price <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Base price must be positive".to_string(),
            ));
        }

        let rst = RestaurantEntity::find_by_id(request.restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Restaurant {} not found",
                    request.restaurant_id
                ))
            })?;

        let selling_price = request.base_price + rst.tech_fee;
        let mystery_type = if request.is_mystery {
            Some(request.mystery_type.unwrap_or(MysteryType::Any))
        } else {
            None
        };

        let model = MenuItemActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(rst.id),
            name: Set(request.name.clone()),
            category: Set(request.category),
            image_url: Set(request.image_url),
            base_price: Set(request.base_price),
            selling_price: Set(selling_price),
            is_veg: Set(request.is_veg),
            is_available: Set(true),
            is_clearance: Set(false),
            stock_remaining: Set(0),
            is_mystery: Set(request.is_mystery),
            mystery_type: Set(mystery_type),
            loot_discount_percentage: Set(None),
            promo_description: Set(request.promo_description),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db).await?;
        info!(menu_item_id = %created.id, selling_price = %selling_price, "Menu item created");
        Ok(created)
    }

    /// Lists a restaurant's menu, newest first.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn list_items(
        &self,
        restaurant_id: Uuid,
        available_only: bool,
    ) -> Result<Vec<menu_item::Model>, ServiceError> {
        let mut query =
            MenuItemEntity::find().filter(menu_item::Column::RestaurantId.eq(restaurant_id));
        if available_only {
            query = query.filter(menu_item::Column::IsAvailable.eq(true));
        }
        let items = query
            .order_by_desc(menu_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Sets the remaining stock for a flash-sale item.
    #[instrument(skip(self), fields(item_id = %item_id, stock = stock))]
    pub async fn update_stock(
        &self,
        item_id: Uuid,
        stock: i32,
    ) -> Result<menu_item::Model, ServiceError> {
        if stock < 0 {
            return Err(ServiceError::ValidationError(
                "Stock cannot be negative".to_string(),
            ));
        }

        let item = self.fetch(item_id).await?;
        let mut active: MenuItemActiveModel = item.into();
        active.stock_remaining = Set(stock);
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Toggles loot (flash-sale) mode. Enabling requires stock on hand;
    /// the price is never touched, only the flag.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn toggle_loot_mode(
        &self,
        item_id: Uuid,
        discount_percentage: Option<Decimal>,
    ) -> Result<menu_item::Model, ServiceError> {
        let item = self.fetch(item_id).await?;

        let enabling = !item.is_clearance;
        if enabling && item.stock_remaining <= 0 {
            warn!("Loot mode requested with no stock");
            return Err(ServiceError::InsufficientStock(
                "Set a stock quantity before enabling loot mode".to_string(),
            ));
        }

        if let Some(pct) = discount_percentage {
            if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                return Err(ServiceError::ValidationError(
                    "Discount percentage must be between 0 and 100".to_string(),
                ));
            }
        }

        let mut active: MenuItemActiveModel = item.into();
        active.is_clearance = Set(enabling);
        if enabling {
            active.loot_discount_percentage = Set(discount_percentage);
        } else {
            active.loot_discount_percentage = Set(None);
        }
        let updated = active.update(&*self.db).await?;

        info!(is_clearance = updated.is_clearance, "Loot mode toggled");
        Ok(updated)
    }

    /// Flips item availability on the menu.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn set_availability(
        &self,
        item_id: Uuid,
        available: bool,
    ) -> Result<menu_item::Model, ServiceError> {
        let item = self.fetch(item_id).await?;
        let mut active: MenuItemActiveModel = item.into();
        active.is_available = Set(available);
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    async fn fetch(&self, item_id: Uuid) -> Result<menu_item::Model, ServiceError> {
        MenuItemEntity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", item_id)))
    }
}
