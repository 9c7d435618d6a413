use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;

use stockfolio::services::firebase::FirebaseClient;
use stockfolio::services::market::{MarketError, PriceSource, YahooClient};
use stockfolio::services::ollama::OllamaClient;
use stockfolio::services::qdrant::QdrantClient;
use stockfolio::services::trading_service::TradeLocks;
use stockfolio::{config, AppState};

static DB_SEQ: AtomicU32 = AtomicU32::new(0);

/// Fresh in-memory SQLite database with the ledger schema. A single pooled
/// connection keeps shared-cache SQLite from returning SQLITE_LOCKED when
/// tests run trades concurrently.
pub async fn setup_test_db() -> AnyPool {
    install_default_drivers();

    let db_name = format!(
        "test_{}_{}",
        std::process::id(),
        DB_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    let database_url = format!("sqlite:file:{db_name}?mode=memory&cache=shared");

    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to create in-memory SQLite DB");

    let statements = [
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            firebase_uid TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL,
            email TEXT NOT NULL,
            profile_picture TEXT
        )",
        "CREATE TABLE balances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users (id) ON DELETE CASCADE,
            amount DOUBLE NOT NULL
        )",
        "CREATE TABLE user_stocks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            symbol TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            UNIQUE (user_id, symbol)
        )",
        "CREATE TABLE transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            symbol TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            price DOUBLE NOT NULL,
            side TEXT NOT NULL,
            executed_at INTEGER NOT NULL
        )",
    ];

    for stmt in statements {
        sqlx::query(stmt)
            .execute(&pool)
            .await
            .expect("Failed to create test table");
    }

    pool
}

/// Insert a user plus balance row, returning the local user id.
pub async fn seed_user(pool: &AnyPool, firebase_uid: &str, balance: f64) -> i64 {
    let row: (i64,) = sqlx::query_as(
        "INSERT INTO users (firebase_uid, username, email) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(firebase_uid)
    .bind(format!("user_{firebase_uid}"))
    .bind(format!("{firebase_uid}@example.com"))
    .fetch_one(pool)
    .await
    .expect("Failed to insert test user");

    sqlx::query("INSERT INTO balances (user_id, amount) VALUES ($1, $2)")
        .bind(row.0)
        .bind(balance)
        .execute(pool)
        .await
        .expect("Failed to insert test balance");

    row.0
}

pub async fn get_balance(pool: &AnyPool, user_id: i64) -> f64 {
    let row: (f64,) = sqlx::query_as("SELECT amount FROM balances WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance");
    row.0
}

pub async fn get_holding_qty(pool: &AnyPool, user_id: i64, symbol: &str) -> Option<i64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT quantity FROM user_stocks WHERE user_id = $1 AND symbol = $2")
            .bind(user_id)
            .bind(symbol)
            .fetch_optional(pool)
            .await
            .expect("Failed to read holding");
    row.map(|r| r.0)
}

pub async fn count_transactions(pool: &AnyPool, user_id: i64) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count transactions");
    row.0
}

/// Price source returning the same price for every symbol.
pub struct FixedPrice(pub f64);

#[async_trait]
impl PriceSource for FixedPrice {
    async fn current_price(&self, _symbol: &str) -> Result<f64, MarketError> {
        Ok(self.0)
    }
}

/// Price source that always fails, standing in for a dead upstream.
pub struct NoPrice;

#[async_trait]
impl PriceSource for NoPrice {
    async fn current_price(&self, symbol: &str) -> Result<f64, MarketError> {
        Err(MarketError::PriceUnavailable(symbol.to_string()))
    }
}

/// App state wired to the test database. Gateway clients point at their
/// defaults and are only exercised by tests that stay off the network.
pub fn test_state(db: AnyPool) -> AppState {
    let settings = config::load();

    AppState {
        db,
        market: YahooClient::new(),
        firebase: FirebaseClient::new(String::new()),
        qdrant: QdrantClient::new(
            settings.qdrant_url.clone(),
            settings.qdrant_collection.clone(),
        ),
        ollama: OllamaClient::new(
            settings.ollama_url.clone(),
            settings.ollama_model.clone(),
            settings.ollama_embed_model.clone(),
        ),
        trade_locks: TradeLocks::new(),
        settings,
    }
}
