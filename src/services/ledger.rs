//! Relational primitives for the four ledger tables. Every function takes a
//! `&mut AnyConnection` so the portfolio service can run all mutations of one
//! trade on a single transaction and commit them together.

use sqlx::AnyConnection;

use crate::models::{Balance, StockTransaction, User, UserStock};

/// Round to cents. Balances and trade totals are stored with two-decimal
/// precision, matching the original ledger's decimal(18,2) columns.
pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub async fn find_user_by_uid(
    conn: &mut AnyConnection,
    firebase_uid: &str,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, firebase_uid, username, email, profile_picture
        FROM users
        WHERE firebase_uid = $1
        "#,
    )
    .bind(firebase_uid)
    .fetch_optional(conn)
    .await
}

pub async fn insert_user(
    conn: &mut AnyConnection,
    firebase_uid: &str,
    username: &str,
    email: &str,
    profile_picture: Option<&str>,
) -> sqlx::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (firebase_uid, username, email, profile_picture)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(firebase_uid)
    .bind(username)
    .bind(email)
    .bind(profile_picture)
    .fetch_one(conn)
    .await?;

    Ok(row.0)
}

pub async fn create_balance(
    conn: &mut AnyConnection,
    user_id: i64,
    amount: f64,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO balances (user_id, amount) VALUES ($1, $2)")
        .bind(user_id)
        .bind(round_cents(amount))
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn get_balance(conn: &mut AnyConnection, user_id: i64) -> sqlx::Result<Option<Balance>> {
    sqlx::query_as::<_, Balance>(
        "SELECT id, user_id, amount FROM balances WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// Apply a signed delta to the user's balance, returning the new amount, or
/// `None` when the user has no balance row. The stored amount is re-rounded
/// to cents so repeated trades cannot accumulate float drift.
pub async fn adjust_balance(
    conn: &mut AnyConnection,
    user_id: i64,
    delta: f64,
) -> sqlx::Result<Option<f64>> {
    let Some(balance) = get_balance(&mut *conn, user_id).await? else {
        return Ok(None);
    };

    let new_amount = round_cents(balance.amount + delta);
    sqlx::query("UPDATE balances SET amount = $1 WHERE user_id = $2")
        .bind(new_amount)
        .bind(user_id)
        .execute(conn)
        .await?;

    Ok(Some(new_amount))
}

pub async fn get_holding(
    conn: &mut AnyConnection,
    user_id: i64,
    symbol: &str,
) -> sqlx::Result<Option<UserStock>> {
    sqlx::query_as::<_, UserStock>(
        r#"
        SELECT id, user_id, symbol, quantity
        FROM user_stocks
        WHERE user_id = $1 AND symbol = $2
        "#,
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_optional(conn)
    .await
}

/// Apply a signed quantity delta to a holding and return the new quantity.
/// Creates the row on first buy and deletes it when the quantity lands on
/// exactly zero; callers must have validated that it cannot go negative.
pub async fn upsert_holding(
    conn: &mut AnyConnection,
    user_id: i64,
    symbol: &str,
    delta_qty: i64,
) -> sqlx::Result<i64> {
    match get_holding(&mut *conn, user_id, symbol).await? {
        None => {
            sqlx::query(
                "INSERT INTO user_stocks (user_id, symbol, quantity) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(symbol)
            .bind(delta_qty)
            .execute(conn)
            .await?;
            Ok(delta_qty)
        }
        Some(holding) => {
            let new_qty = holding.quantity + delta_qty;
            if new_qty == 0 {
                sqlx::query("DELETE FROM user_stocks WHERE id = $1")
                    .bind(holding.id)
                    .execute(conn)
                    .await?;
            } else {
                sqlx::query("UPDATE user_stocks SET quantity = $1 WHERE id = $2")
                    .bind(new_qty)
                    .bind(holding.id)
                    .execute(conn)
                    .await?;
            }
            Ok(new_qty)
        }
    }
}

pub async fn append_transaction(
    conn: &mut AnyConnection,
    user_id: i64,
    symbol: &str,
    quantity: i64,
    price: f64,
    side: &str,
    executed_at: i64,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (user_id, symbol, quantity, price, side, executed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(user_id)
    .bind(symbol)
    .bind(quantity)
    .bind(price)
    .bind(side)
    .bind(executed_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn list_holdings(conn: &mut AnyConnection, user_id: i64) -> sqlx::Result<Vec<UserStock>> {
    sqlx::query_as::<_, UserStock>(
        r#"
        SELECT id, user_id, symbol, quantity
        FROM user_stocks
        WHERE user_id = $1
        ORDER BY symbol
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

pub async fn list_transactions(
    conn: &mut AnyConnection,
    user_id: i64,
) -> sqlx::Result<Vec<StockTransaction>> {
    sqlx::query_as::<_, StockTransaction>(
        r#"
        SELECT id, user_id, symbol, quantity, price, side, executed_at
        FROM transactions
        WHERE user_id = $1
        ORDER BY executed_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::round_cents;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_cents(10.0 / 3.0), 3.33);
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_cents(10.0), 10.0);
        assert_eq!(round_cents(-10.0 / 3.0), -3.33);
    }
}
