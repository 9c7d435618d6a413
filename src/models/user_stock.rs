use serde::{Deserialize, Serialize};

/// A holding: how many shares of one symbol a user owns. At most one row per
/// (user, symbol); the row is deleted when quantity reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStock {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStockDto {
    pub stock_symbol: String,
    pub quantity: i64,
}

impl From<UserStock> for UserStockDto {
    fn from(s: UserStock) -> Self {
        UserStockDto {
            stock_symbol: s.symbol,
            quantity: s.quantity,
        }
    }
}
