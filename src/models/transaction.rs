use serde::{Deserialize, Serialize};

/// One executed trade. Append-only: rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockTransaction {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub quantity: i64,

    /// Price per share at execution; equals the price the trade was costed at.
    pub price: f64,

    /// "buy" | "sell"
    pub side: String,

    /// Unix timestamp (seconds).
    pub executed_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub stock_symbol: String,
    pub quantity: i64,
    pub transaction_type: String,
    pub price: f64,
    pub date: String,
}

impl From<StockTransaction> for TransactionDto {
    fn from(t: StockTransaction) -> Self {
        let date = chrono::DateTime::from_timestamp(t.executed_at, 0)
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| t.executed_at.to_string());

        TransactionDto {
            stock_symbol: t.symbol,
            quantity: t.quantity,
            transaction_type: if t.side == "buy" { "Buy" } else { "Sell" }.to_string(),
            price: t.price,
            date,
        }
    }
}
