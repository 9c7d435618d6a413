use serde::{Deserialize, Serialize};

/// Virtual cash for one user. Exactly one row per user; amount never goes
/// below zero after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Balance {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
}
