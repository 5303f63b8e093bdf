use axum::{
    extract::State,
    response::Json,
    routing::post,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::payments::{InitiatePaymentResponse, PaymentCallback};
use crate::{errors::ServiceError, ApiResponse, AppState};

/// What the payment is for. Decides the transaction-id namespace that the
/// callback later routes on.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPurpose {
    Order,
    Recharge,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    pub purpose: PaymentPurpose,
    /// Required for ORDER payments
    pub order_id: Option<Uuid>,
    /// Required for RECHARGE payments
    pub profile_id: Option<Uuid>,
    /// Required for RECHARGE payments; ORDER amounts come from the order
    pub amount: Option<Decimal>,
    pub mobile_number: String,
}

/// Start a hosted-checkout payment
#[utoipa::path(
    post,
    path = "/api/v1/payments/initiate",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Redirect URL issued", body = ApiResponse<InitiatePaymentResponse>),
        (status = 400, description = "Missing fields or amount out of range", body = crate::errors::ErrorResponse),
        (status = 502, description = "Gateway unreachable", body = crate::errors::ErrorResponse),
    )
)]
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Json<ApiResponse<InitiatePaymentResponse>>, ServiceError> {
    let response = match request.purpose {
        PaymentPurpose::Order => {
            let order_id = request.order_id.ok_or_else(|| {
                ServiceError::ValidationError("order_id is required for ORDER payments".to_string())
            })?;
            state
                .services
                .payments
                .initiate_order_payment(order_id, &request.mobile_number)
                .await?
        }
        PaymentPurpose::Recharge => {
            let profile_id = request.profile_id.ok_or_else(|| {
                ServiceError::ValidationError(
                    "profile_id is required for RECHARGE payments".to_string(),
                )
            })?;
            let amount = request.amount.ok_or_else(|| {
                ServiceError::ValidationError(
                    "amount is required for RECHARGE payments".to_string(),
                )
            })?;
            state
                .services
                .payments
                .initiate_wallet_recharge(profile_id, amount, &request.mobile_number)
                .await?
        }
    };

    Ok(Json(ApiResponse::success(response)))
}

/// Gateway callback, routed by transaction-id prefix
#[utoipa::path(
    post,
    path = "/api/v1/payments/callback",
    request_body = PaymentCallback,
    responses(
        (status = 200, description = "Callback processed"),
        (status = 400, description = "Unknown transaction namespace", body = crate::errors::ErrorResponse),
        (status = 404, description = "No matching order or profile", body = crate::errors::ErrorResponse),
    )
)]
pub async fn payment_callback(
    State(state): State<AppState>,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.payments.handle_callback(callback).await?;
    Ok(Json(ApiResponse::success(())))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate_payment))
        .route("/callback", post(payment_callback))
}
