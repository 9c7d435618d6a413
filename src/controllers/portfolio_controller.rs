use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{TransactionDto, UserStockDto};
use crate::services::user_service;
use crate::AppState;

// GET /api/portfolio/:firebase_uid/stocks
pub async fn get_stocks(
    State(state): State<AppState>,
    Path(firebase_uid): Path<String>,
) -> Result<Json<Vec<UserStockDto>>, ApiError> {
    let stocks = user_service::get_stocks(&state.db, &firebase_uid).await?;
    Ok(Json(stocks))
}

// GET /api/portfolio/:firebase_uid/transactions
pub async fn get_transactions(
    State(state): State<AppState>,
    Path(firebase_uid): Path<String>,
) -> Result<Json<Vec<TransactionDto>>, ApiError> {
    let transactions = user_service::get_transactions(&state.db, &firebase_uid).await?;
    Ok(Json(transactions))
}

// GET /api/portfolio/:firebase_uid/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Path(firebase_uid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let balance = user_service::get_balance(&state.db, &firebase_uid).await?;
    Ok(Json(json!({ "balance": balance })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceRequest {
    pub firebase_user_id: String,
    pub amount_change: f64,
}

// POST /api/portfolio/balance/update
pub async fn update_balance(
    State(state): State<AppState>,
    Json(req): Json<UpdateBalanceRequest>,
) -> Result<Json<Value>, ApiError> {
    if !req.amount_change.is_finite() {
        return Err(ApiError::Validation("Invalid amount.".to_string()));
    }

    let new_balance = user_service::adjust_balance(
        &state.db,
        &state.trade_locks,
        &req.firebase_user_id,
        req.amount_change,
    )
    .await?;

    Ok(Json(json!({
        "message": "Balance updated successfully",
        "balance": new_balance,
    })))
}
