use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::trading_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub external_user_id: String,
    pub symbol: String,
    pub quantity: i64,
}

// POST /api/trade/buy
pub async fn post_buy(
    State(state): State<AppState>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<Value>, ApiError> {
    let receipt = trading_service::buy_stock(
        &state.db,
        &state.trade_locks,
        &state.market,
        &req.external_user_id,
        &req.symbol,
        req.quantity,
    )
    .await?;

    Ok(Json(json!({
        "message": format!(
            "Bought {} {} @ {:.2}",
            receipt.quantity, receipt.symbol, receipt.price
        ),
        "balance": receipt.new_balance,
    })))
}

// POST /api/trade/sell
pub async fn post_sell(
    State(state): State<AppState>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<Value>, ApiError> {
    let receipt = trading_service::sell_stock(
        &state.db,
        &state.trade_locks,
        &state.market,
        &req.external_user_id,
        &req.symbol,
        req.quantity,
    )
    .await?;

    Ok(Json(json!({
        "message": format!(
            "Sold {} {} @ {:.2}",
            receipt.quantity, receipt.symbol, receipt.price
        ),
        "balance": receipt.new_balance,
    })))
}
