//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amount, DomainError, RequestContext};
use crate::error::AppError;
use crate::usecase::AccountUseCase;

/// Header carrying a caller-supplied correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_id: String,
    pub to_id: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub from_id: String,
    pub to_id: String,
    pub amount: i64,
    pub from_balance: i64,
    pub to_balance: i64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub location: String,
    pub balance: i64,
}

// =========================================================================
// Shared state
// =========================================================================

/// State shared by all handlers
#[derive(Clone)]
pub struct ApiState {
    pub accounts: Arc<dyn AccountUseCase>,
    pub request_timeout: Duration,
}

impl ApiState {
    pub fn new(accounts: Arc<dyn AccountUseCase>, request_timeout: Duration) -> Self {
        Self {
            accounts,
            request_timeout,
        }
    }

    /// Per-request context bounded by the configured timeout
    fn context(&self, headers: &HeaderMap) -> RequestContext {
        let context = RequestContext::new().with_timeout(self.request_timeout);

        match headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
        {
            Some(correlation_id) => context.with_correlation_id(correlation_id),
            None => context,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<ApiState> {
    Router::new()
        .route("/accounts/:account_id", get(get_account))
        .route("/transfers", post(transfer))
}

// =========================================================================
// GET /accounts/:account_id
// =========================================================================

async fn get_account(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(account_id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let context = state.context(&headers);
    let account = state.accounts.find_account(&context, &account_id).await?;

    Ok(Json(AccountResponse {
        id: account.id,
        location: account.location,
        balance: account.balance,
    }))
}

// =========================================================================
// POST /transfers
// =========================================================================

async fn transfer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let amount = Amount::new(request.amount).map_err(DomainError::from)?;
    let context = state.context(&headers);

    let receipt = state
        .accounts
        .transfer(&context, &request.from_id, &request.to_id, amount)
        .await?;

    Ok(Json(TransferResponse {
        from_id: receipt.record.from_id,
        to_id: receipt.record.to_id,
        amount: receipt.record.amount.value(),
        from_balance: receipt.from_balance,
        to_balance: receipt.to_balance,
        status: "committed".to_string(),
    }))
}
