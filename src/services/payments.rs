use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::PaymentConfig,
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, PaymentStatus},
    entities::profile::{self, Entity as ProfileEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Transaction-id namespaces. The gateway reports back a single id; the
/// prefix decides whether the callback settles an order or a wallet
/// recharge.
pub const ORDER_TXN_PREFIX: &str = "order_";
pub const RECHARGE_TXN_PREFIX: &str = "RECHARGE-";

/// Gateway endpoint that participates in the X-VERIFY checksum
const PAY_ENDPOINT: &str = "/pg/v1/pay";

pub fn order_transaction_id(order_id: Uuid) -> String {
    format!("{ORDER_TXN_PREFIX}{order_id}")
}

pub fn recharge_transaction_id(profile_id: Uuid) -> String {
    format!("{RECHARGE_TXN_PREFIX}{profile_id}")
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitiatePaymentResponse {
    pub transaction_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Success,
    Failure,
}

/// Asynchronous result reported by the gateway against a previously issued
/// transaction id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentCallback {
    pub merchant_transaction_id: String,
    pub status: CallbackStatus,
    pub amount: Decimal,
}

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DbPool>,
    config: PaymentConfig,
    http: reqwest::Client,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(
        db: Arc<DbPool>,
        config: PaymentConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            config,
            http: reqwest::Client::new(),
            event_sender,
        }
    }

    /// Starts a hosted-checkout payment for a placed order and remembers the
    /// transaction id on the order row for callback routing.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn initiate_order_payment(
        &self,
        order_id: Uuid,
        mobile_number: &str,
    ) -> Result<InitiatePaymentResponse, ServiceError> {
        let order_row = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if order_row.payment_status == PaymentStatus::Completed {
            return Err(ServiceError::Conflict(format!(
                "Order {} is already paid",
                order_id
            )));
        }

        let transaction_id = order_transaction_id(order_id);
        let amount = order_row.total_amount;

        let redirect_path = format!("payment-status?type=ORDER&txnId={transaction_id}");
        let redirect_url = self
            .initiate(&transaction_id, amount, mobile_number, &redirect_path)
            .await?;

        let mut active: order::ActiveModel = order_row.into();
        active.payment_transaction_id = Set(Some(transaction_id.clone()));
        active.update(&*self.db).await?;

        Ok(InitiatePaymentResponse {
            transaction_id,
            redirect_url,
        })
    }

    /// Starts a hosted-checkout payment that tops up a customer wallet.
    #[instrument(skip(self), fields(profile_id = %profile_id, amount = %amount))]
    pub async fn initiate_wallet_recharge(
        &self,
        profile_id: Uuid,
        amount: Decimal,
        mobile_number: &str,
    ) -> Result<InitiatePaymentResponse, ServiceError> {
        ProfileEntity::find_by_id(profile_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Profile {} not found", profile_id)))?;

        let transaction_id = recharge_transaction_id(profile_id);
        let redirect_path = format!("payment-status?type=RECHARGE&txnId={transaction_id}");
        let redirect_url = self
            .initiate(&transaction_id, amount, mobile_number, &redirect_path)
            .await?;

        Ok(InitiatePaymentResponse {
            transaction_id,
            redirect_url,
        })
    }

    /// Routes a gateway callback by transaction-id prefix: `order_` settles
    /// the order's payment status, `RECHARGE-` credits a customer wallet.
    /// Anything else is rejected.
    #[instrument(skip(self), fields(transaction_id = %callback.merchant_transaction_id))]
    pub async fn handle_callback(&self, callback: PaymentCallback) -> Result<(), ServiceError> {
        let txn_id = callback.merchant_transaction_id.clone();

        if txn_id.starts_with(ORDER_TXN_PREFIX) {
            self.settle_order_payment(&txn_id, callback.status, callback.amount)
                .await
        } else if let Some(rest) = txn_id.strip_prefix(RECHARGE_TXN_PREFIX) {
            self.settle_wallet_recharge(rest, callback.status, callback.amount)
                .await
        } else {
            warn!("Callback with unknown transaction namespace");
            Err(ServiceError::ValidationError(format!(
                "Unknown transaction id namespace: {txn_id}"
            )))
        }
    }

    async fn settle_order_payment(
        &self,
        transaction_id: &str,
        status: CallbackStatus,
        amount: Decimal,
    ) -> Result<(), ServiceError> {
        let order_row = OrderEntity::find()
            .filter(order::Column::PaymentTransactionId.eq(transaction_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                error!("No order for payment callback");
                ServiceError::NotFound(format!(
                    "No order for transaction {transaction_id}"
                ))
            })?;

        let new_status = match status {
            CallbackStatus::Success => PaymentStatus::Completed,
            CallbackStatus::Failure => PaymentStatus::Failed,
        };

        let order_id = order_row.id;
        let mut active: order::ActiveModel = order_row.into();
        active.payment_status = Set(new_status);
        active.updated_at = Set(Some(chrono::Utc::now()));
        active.update(&*self.db).await?;

        info!(order_id = %order_id, status = ?new_status, "Order payment settled");

        if let Some(sender) = &self.event_sender {
            let event = match status {
                CallbackStatus::Success => Event::PaymentCompleted {
                    transaction_id: transaction_id.to_string(),
                    amount,
                },
                CallbackStatus::Failure => Event::PaymentFailed {
                    transaction_id: transaction_id.to_string(),
                },
            };
            let _ = sender.send(event).await;
        }

        Ok(())
    }

    async fn settle_wallet_recharge(
        &self,
        profile_part: &str,
        status: CallbackStatus,
        amount: Decimal,
    ) -> Result<(), ServiceError> {
        let profile_id = Uuid::parse_str(profile_part).map_err(|_| {
            ServiceError::ValidationError(format!(
                "Malformed recharge transaction id: {RECHARGE_TXN_PREFIX}{profile_part}"
            ))
        })?;

        match status {
            CallbackStatus::Success => {
                if amount <= Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "Recharge amount must be positive".to_string(),
                    ));
                }

                let updated = ProfileEntity::update_many()
                    .col_expr(
                        profile::Column::WalletBalance,
                        Expr::col(profile::Column::WalletBalance).add(amount),
                    )
                    .filter(profile::Column::Id.eq(profile_id))
                    .exec(&*self.db)
                    .await?;

                if updated.rows_affected == 0 {
                    return Err(ServiceError::NotFound(format!(
                        "Profile {} not found",
                        profile_id
                    )));
                }

                info!(profile_id = %profile_id, amount = %amount, "Wallet credited");

                if let Some(sender) = &self.event_sender {
                    let _ = sender
                        .send(Event::PaymentCompleted {
                            transaction_id: recharge_transaction_id(profile_id),
                            amount,
                        })
                        .await;
                }
            }
            CallbackStatus::Failure => {
                warn!(profile_id = %profile_id, "Wallet recharge failed at the gateway");
                if let Some(sender) = &self.event_sender {
                    let _ = sender
                        .send(Event::PaymentFailed {
                            transaction_id: recharge_transaction_id(profile_id),
                        })
                        .await;
                }
            }
        }

        Ok(())
    }

    /// POSTs the signed initiation request and returns the gateway's
    /// redirect URL. Amounts are validated here; the gateway wants paise.
    async fn initiate(
        &self,
        transaction_id: &str,
        amount: Decimal,
        mobile_number: &str,
        redirect_path: &str,
    ) -> Result<String, ServiceError> {
        if !self.config.is_configured() {
            return Err(ServiceError::ExternalServiceError(
                "Payment gateway is not configured".to_string(),
            ));
        }

        if amount <= Decimal::ZERO || amount > self.config.max_amount {
            return Err(ServiceError::ValidationError(format!(
                "Payment amount {amount} is out of range"
            )));
        }

        let amount_paise = (amount * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or_else(|| ServiceError::ValidationError("Amount overflow".to_string()))?;

        let payload = json!({
            "merchantId": self.config.merchant_id,
            "merchantTransactionId": transaction_id,
            "amount": amount_paise,
            "mobileNumber": mobile_number,
            "callbackUrl": format!("{}/api/v1/payments/callback", self.config.app_base_url),
            "redirectUrl": format!("{}/{}", self.config.app_base_url, redirect_path),
            "redirectMode": "REDIRECT",
            "paymentInstrument": { "type": "PAY_PAGE" },
        });

        let encoded = BASE64.encode(payload.to_string());
        let checksum = self.sign(&encoded);

        let response = self
            .http
            .post(format!("{}{}", self.config.host_url, PAY_ENDPOINT))
            .header("Content-Type", "application/json")
            .header("X-VERIFY", checksum)
            .json(&json!({ "request": encoded }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Payment initiation request failed");
                ServiceError::ExternalServiceError(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(ServiceError::PaymentFailed(format!(
                "Gateway returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("Malformed gateway response: {e}"))
        })?;

        body.pointer("/data/instrumentResponse/redirectInfo/url")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ServiceError::PaymentFailed("Gateway response missing redirect URL".to_string())
            })
    }

    /// X-VERIFY: sha256(base64 payload + endpoint + salt key) with the salt
    /// index appended.
    fn sign(&self, encoded_payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(encoded_payload.as_bytes());
        hasher.update(PAY_ENDPOINT.as_bytes());
        hasher.update(self.config.salt_key.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{digest}###{}", self.config.salt_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_namespaces_are_disjoint() {
        let order_id = Uuid::new_v4();
        let profile_id = Uuid::new_v4();
        assert!(order_transaction_id(order_id).starts_with(ORDER_TXN_PREFIX));
        assert!(recharge_transaction_id(profile_id).starts_with(RECHARGE_TXN_PREFIX));
        assert!(!order_transaction_id(order_id).starts_with(RECHARGE_TXN_PREFIX));
    }

    #[test]
    fn recharge_id_round_trips_the_profile() {
        let profile_id = Uuid::new_v4();
        let txn_id = recharge_transaction_id(profile_id);
        let rest = txn_id.strip_prefix(RECHARGE_TXN_PREFIX).unwrap();
        assert_eq!(Uuid::parse_str(rest).unwrap(), profile_id);
    }
}
