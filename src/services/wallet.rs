use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::restaurant::{self, Entity as RestaurantEntity},
    entities::wallet_transaction::{
        self, ActiveModel as TxnActiveModel, Entity as TxnEntity, WalletTransactionStatus,
        WalletTransactionType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RechargeRequest {
    pub restaurant_id: Uuid,
    pub amount: Decimal,
    pub proof_image_url: Option<String>,
    #[validate(length(max = 500, message = "Notes are limited to 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RechargeDecision {
    Approve,
    Reject,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletSummary {
    pub restaurant_id: Uuid,
    pub credit_balance: Decimal,
    pub min_balance_limit: Decimal,
    pub can_accept_orders: bool,
}

/// Records the automatic tech-fee deduction for an order inside the caller's
/// transaction. Always permitted: the balance may fall below the minimum
/// limit, because suspension blocks future order acceptance rather than
/// rolling back the order that crossed the line.
///
/// Returns the ledger row; `magnitude` is the positive fee, stored negated.
pub async fn record_fee_deduction<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: Uuid,
    magnitude: Decimal,
    notes: Option<String>,
) -> Result<wallet_transaction::Model, ServiceError> {
    let txn = TxnActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        amount: Set(-magnitude),
        r#type: Set(WalletTransactionType::FeeDeduction),
        status: Set(WalletTransactionStatus::Approved),
        proof_image_url: Set(None),
        notes: Set(notes),
        approved_by: Set(None),
        approved_at: Set(Some(Utc::now())),
        created_at: Set(Utc::now()),
    };
    let txn = txn.insert(conn).await?;

    RestaurantEntity::update_many()
        .col_expr(
            restaurant::Column::CreditBalance,
            Expr::col(restaurant::Column::CreditBalance).add(txn.amount),
        )
        .filter(restaurant::Column::Id.eq(restaurant_id))
        .exec(conn)
        .await?;

    Ok(txn)
}

#[derive(Clone)]
pub struct WalletService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl WalletService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a PENDING recharge request. The balance is untouched until an
    /// admin approves.
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id, amount = %request.amount))]
    pub async fn request_recharge(
        &self,
        request: RechargeRequest,
    ) -> Result<wallet_transaction::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Recharge amount must be positive".to_string(),
            ));
        }

        RestaurantEntity::find_by_id(request.restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Restaurant {} not found",
                    request.restaurant_id
                ))
            })?;

        let txn = TxnActiveModel {
            id: Set(Uuid::new_v4()),
            restaurant_id: Set(request.restaurant_id),
            amount: Set(request.amount),
            r#type: Set(WalletTransactionType::WalletRecharge),
            status: Set(WalletTransactionStatus::Pending),
            proof_image_url: Set(request.proof_image_url),
            notes: Set(request.notes),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(Utc::now()),
        };
        let txn = txn.insert(&*self.db).await?;

        info!(transaction_id = %txn.id, "Recharge request recorded");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::RechargeRequested {
                    transaction_id: txn.id,
                    restaurant_id: txn.restaurant_id,
                    amount: txn.amount,
                })
                .await;
        }

        Ok(txn)
    }

    /// Resolves a PENDING recharge. Approval credits the restaurant balance
    /// and stamps the approver; rejection only flips the status.
    ///
    /// The status flip is a conditional update keyed on the row still being
    /// PENDING, so a second resolution attempt affects zero rows and is
    /// rejected as a conflict. APPROVED and REJECTED are terminal.
    #[instrument(skip(self), fields(transaction_id = %transaction_id, approver = %approver))]
    pub async fn resolve_recharge(
        &self,
        transaction_id: Uuid,
        decision: RechargeDecision,
        approver: Uuid,
    ) -> Result<wallet_transaction::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await?;

        let record = TxnEntity::find_by_id(transaction_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Wallet transaction {} not found", transaction_id))
            })?;

        if record.r#type != WalletTransactionType::WalletRecharge {
            return Err(ServiceError::InvalidOperation(
                "Only recharge transactions can be resolved".to_string(),
            ));
        }

        let new_status = match decision {
            RechargeDecision::Approve => WalletTransactionStatus::Approved,
            RechargeDecision::Reject => WalletTransactionStatus::Rejected,
        };
        let now = Utc::now();

        let updated = TxnEntity::update_many()
            .col_expr(wallet_transaction::Column::Status, Expr::value(new_status))
            .col_expr(
                wallet_transaction::Column::ApprovedBy,
                Expr::value(Some(approver)),
            )
            .col_expr(
                wallet_transaction::Column::ApprovedAt,
                Expr::value(Some(now)),
            )
            .filter(wallet_transaction::Column::Id.eq(transaction_id))
            .filter(wallet_transaction::Column::Status.eq(WalletTransactionStatus::Pending))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            error!(status = ?record.status, "Attempted to resolve a non-pending transaction");
            return Err(ServiceError::Conflict(format!(
                "Wallet transaction {} is already resolved",
                transaction_id
            )));
        }

        if matches!(decision, RechargeDecision::Approve) {
            RestaurantEntity::update_many()
                .col_expr(
                    restaurant::Column::CreditBalance,
                    Expr::col(restaurant::Column::CreditBalance).add(record.amount),
                )
                .filter(restaurant::Column::Id.eq(record.restaurant_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        info!(decision = ?decision, "Recharge resolved");

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::RechargeResolved {
                    transaction_id,
                    approved: matches!(decision, RechargeDecision::Approve),
                    resolved_at: now,
                })
                .await;
        }

        let resolved = TxnEntity::find_by_id(transaction_id)
            .one(&*self.db)
            .await?
            .ok_or(ServiceError::InternalServerError)?;
        Ok(resolved)
    }

    /// Balance plus the order-acceptance gate for a restaurant.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn wallet_summary(&self, restaurant_id: Uuid) -> Result<WalletSummary, ServiceError> {
        let rst = RestaurantEntity::find_by_id(restaurant_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Restaurant {} not found", restaurant_id))
            })?;

        Ok(WalletSummary {
            restaurant_id: rst.id,
            credit_balance: rst.credit_balance,
            min_balance_limit: rst.min_balance_limit,
            can_accept_orders: rst.can_accept_orders(),
        })
    }

    /// Ledger history for a restaurant, newest first.
    #[instrument(skip(self), fields(restaurant_id = %restaurant_id))]
    pub async fn list_transactions(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<wallet_transaction::Model>, ServiceError> {
        let txns = TxnEntity::find()
            .filter(wallet_transaction::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(wallet_transaction::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(txns)
    }

    /// All recharges awaiting an admin decision, oldest first.
    #[instrument(skip(self))]
    pub async fn list_pending_recharges(
        &self,
    ) -> Result<Vec<wallet_transaction::Model>, ServiceError> {
        let txns = TxnEntity::find()
            .filter(wallet_transaction::Column::Type.eq(WalletTransactionType::WalletRecharge))
            .filter(wallet_transaction::Column::Status.eq(WalletTransactionStatus::Pending))
            .order_by_asc(wallet_transaction::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(txns)
    }
}
