use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::wallet_transaction::Model as WalletTransactionModel;
use crate::services::wallet::{RechargeDecision, RechargeRequest, WalletSummary};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRechargeRequest {
    pub decision: RechargeDecision,
    pub approver_id: Uuid,
}

/// Balance and order-acceptance gate for a restaurant
#[utoipa::path(
    get,
    path = "/api/v1/wallet/{restaurant_id}",
    params(("restaurant_id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Wallet summary", body = ApiResponse<WalletSummary>),
    )
)]
pub async fn wallet_summary(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<ApiResponse<WalletSummary>>, ServiceError> {
    let summary = state.services.wallet.wallet_summary(restaurant_id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// Ledger history for a restaurant
#[utoipa::path(
    get,
    path = "/api/v1/wallet/{restaurant_id}/transactions",
    params(("restaurant_id" = Uuid, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Transactions, newest first", body = ApiResponse<Vec<WalletTransactionModel>>),
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<WalletTransactionModel>>>, ServiceError> {
    let txns = state
        .services
        .wallet
        .list_transactions(restaurant_id)
        .await?;
    Ok(Json(ApiResponse::success(txns)))
}

/// Request a credit recharge (stays PENDING until an admin decides)
#[utoipa::path(
    post,
    path = "/api/v1/wallet/recharge",
    request_body = RechargeRequest,
    responses(
        (status = 201, description = "Recharge requested", body = ApiResponse<WalletTransactionModel>),
    )
)]
pub async fn request_recharge(
    State(state): State<AppState>,
    Json(request): Json<RechargeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WalletTransactionModel>>), ServiceError> {
    let txn = state.services.wallet.request_recharge(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(txn))))
}

/// Recharges awaiting an admin decision
#[utoipa::path(
    get,
    path = "/api/v1/wallet/recharges/pending",
    responses(
        (status = 200, description = "Pending recharges, oldest first", body = ApiResponse<Vec<WalletTransactionModel>>),
    )
)]
pub async fn pending_recharges(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WalletTransactionModel>>>, ServiceError> {
    let txns = state.services.wallet.list_pending_recharges().await?;
    Ok(Json(ApiResponse::success(txns)))
}

/// Approve or reject a pending recharge
#[utoipa::path(
    post,
    path = "/api/v1/wallet/recharges/{id}/resolve",
    params(("id" = Uuid, Path, description = "Wallet transaction id")),
    request_body = ResolveRechargeRequest,
    responses(
        (status = 200, description = "Recharge resolved", body = ApiResponse<WalletTransactionModel>),
        (status = 409, description = "Already resolved", body = crate::errors::ErrorResponse),
    )
)]
pub async fn resolve_recharge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRechargeRequest>,
) -> Result<Json<ApiResponse<WalletTransactionModel>>, ServiceError> {
    let txn = state
        .services
        .wallet
        .resolve_recharge(id, request.decision, request.approver_id)
        .await?;
    Ok(Json(ApiResponse::success(txn)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recharge", post(request_recharge))
        .route("/recharges/pending", get(pending_recharges))
        .route("/recharges/:id/resolve", post(resolve_recharge))
        .route("/:restaurant_id", get(wallet_summary))
        .route("/:restaurant_id/transactions", get(list_transactions))
}
