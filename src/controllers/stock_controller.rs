use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::market::{Candle, StockQuote};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PricesRequest {
    pub tickers: Vec<String>,
}

// POST /api/stocks/prices
pub async fn get_prices(
    State(state): State<AppState>,
    Json(req): Json<PricesRequest>,
) -> Result<Json<HashMap<String, StockQuote>>, ApiError> {
    let tickers: Vec<String> = req
        .tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    let quotes = state.market.get_quotes(&tickers).await?;
    Ok(Json(quotes))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

// GET /api/stocks/search?query=Apple
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    if params.query.trim().is_empty() {
        return Err(ApiError::Validation("Missing query.".to_string()));
    }

    let symbol = state
        .market
        .search_symbol(params.query.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Stock not found.".to_string()))?;

    Ok(Json(json!({ "symbol": symbol })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Unix timestamps (seconds). Defaults to the past year.
    pub start: Option<i64>,
    pub end: Option<i64>,
}

// GET /api/stocks/history/:symbol
pub async fn get_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<Candle>>, ApiError> {
    let sym = symbol.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ApiError::Validation("Missing symbol.".to_string()));
    }

    let end = params.end.unwrap_or_else(|| Utc::now().timestamp());
    let start = params
        .start
        .unwrap_or_else(|| (Utc::now() - Duration::days(365)).timestamp());
    if start >= end {
        return Err(ApiError::Validation(
            "start must be before end.".to_string(),
        ));
    }

    let candles = state.market.get_history(&sym, start, end).await?;
    Ok(Json(candles))
}
