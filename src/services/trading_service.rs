//! Buy/sell orchestration. A trade is one fresh price lookup followed by a
//! read-modify-write of the user's ledger, executed under that user's trade
//! lock and inside a single database transaction: balance change, holding
//! change, and the appended transaction row commit together or not at all.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use sqlx::AnyPool;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::services::ledger::{self, round_cents};
use crate::services::market::{MarketError, PriceSource};

#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("{0}")]
    Validation(String),

    #[error("User not found.")]
    UserNotFound,

    #[error("Balance record not found for the user.")]
    BalanceMissing,

    #[error("Insufficient funds.")]
    InsufficientFunds,

    #[error("Not enough stocks to sell.")]
    InsufficientHoldings,

    #[error("Invalid stock symbol or unable to fetch stock price.")]
    PriceUnavailable(#[source] MarketError),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

/// Per-user async mutexes serializing ledger read-modify-writes. Two trades
/// for the same user never interleave between the balance read and the
/// commit, so concurrent requests cannot lose updates.
#[derive(Clone, Default)]
pub struct TradeLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl TradeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, Clone)]
pub struct TradeReceipt {
    pub symbol: String,
    pub quantity: i64,
    /// Price per share the trade executed at, as recorded in the ledger.
    pub price: f64,
    /// Cost for a buy, proceeds for a sell.
    pub total: f64,
    pub new_balance: f64,
}

fn symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$").expect("valid symbol regex"))
}

fn normalize_symbol(symbol: &str) -> Result<String, TradeError> {
    let sym = symbol.trim().to_uppercase();
    if !symbol_re().is_match(&sym) {
        return Err(TradeError::Validation(format!(
            "'{symbol}' is not a valid stock symbol."
        )));
    }
    Ok(sym)
}

fn validate_quantity(quantity: i64) -> Result<(), TradeError> {
    if quantity <= 0 {
        return Err(TradeError::Validation(
            "Quantity must be greater than zero.".to_string(),
        ));
    }
    Ok(())
}

/// Buy `quantity` shares of `symbol` at the current market price.
pub async fn buy_stock(
    db: &AnyPool,
    locks: &TradeLocks,
    market: &dyn PriceSource,
    firebase_uid: &str,
    symbol: &str,
    quantity: i64,
) -> Result<TradeReceipt, TradeError> {
    let sym = normalize_symbol(symbol)?;
    validate_quantity(quantity)?;

    let user = {
        let mut conn = db.acquire().await?;
        ledger::find_user_by_uid(&mut conn, firebase_uid)
            .await?
            .ok_or(TradeError::UserNotFound)?
    };

    // Fetched fresh on every call; the recorded transaction price must equal
    // the price the trade was costed at.
    let price = market
        .current_price(&sym)
        .await
        .map_err(TradeError::PriceUnavailable)?;
    let cost = round_cents(price * quantity as f64);

    let _guard = locks.acquire(user.id).await;
    let mut tx = db.begin().await?;

    let balance = ledger::get_balance(&mut tx, user.id)
        .await?
        .ok_or(TradeError::BalanceMissing)?;
    if balance.amount < cost {
        return Err(TradeError::InsufficientFunds);
    }

    let new_balance = ledger::adjust_balance(&mut tx, user.id, -cost)
        .await?
        .ok_or(TradeError::BalanceMissing)?;
    ledger::upsert_holding(&mut tx, user.id, &sym, quantity).await?;
    ledger::append_transaction(
        &mut tx,
        user.id,
        &sym,
        quantity,
        price,
        "buy",
        Utc::now().timestamp(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, symbol = %sym, quantity, price, "buy executed");

    Ok(TradeReceipt {
        symbol: sym,
        quantity,
        price,
        total: cost,
        new_balance,
    })
}

/// Sell `quantity` shares of `symbol` at the current market price. The
/// holding row is deleted when the remaining quantity is exactly zero.
pub async fn sell_stock(
    db: &AnyPool,
    locks: &TradeLocks,
    market: &dyn PriceSource,
    firebase_uid: &str,
    symbol: &str,
    quantity: i64,
) -> Result<TradeReceipt, TradeError> {
    let sym = normalize_symbol(symbol)?;
    validate_quantity(quantity)?;

    let user = {
        let mut conn = db.acquire().await?;
        ledger::find_user_by_uid(&mut conn, firebase_uid)
            .await?
            .ok_or(TradeError::UserNotFound)?
    };

    let price = market
        .current_price(&sym)
        .await
        .map_err(TradeError::PriceUnavailable)?;
    let proceeds = round_cents(price * quantity as f64);

    let _guard = locks.acquire(user.id).await;
    let mut tx = db.begin().await?;

    let holding = ledger::get_holding(&mut tx, user.id, &sym).await?;
    match holding {
        Some(h) if h.quantity >= quantity => {}
        _ => return Err(TradeError::InsufficientHoldings),
    }

    let new_balance = ledger::adjust_balance(&mut tx, user.id, proceeds)
        .await?
        .ok_or(TradeError::BalanceMissing)?;
    ledger::upsert_holding(&mut tx, user.id, &sym, -quantity).await?;
    ledger::append_transaction(
        &mut tx,
        user.id,
        &sym,
        quantity,
        price,
        "sell",
        Utc::now().timestamp(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, symbol = %sym, quantity, price, "sell executed");

    Ok(TradeReceipt {
        symbol: sym,
        quantity,
        price,
        total: proceeds,
        new_balance,
    })
}
