//! Registration, login, and the portfolio read paths. Registration creates
//! the identity-provider account first, then inserts the local user row and
//! its starting balance in one transaction so no user exists without a
//! balance.

use sqlx::AnyPool;

use crate::models::{TransactionDto, User, UserDto, UserStockDto};
use crate::services::avatars;
use crate::services::firebase::{AuthError, FirebaseClient};
use crate::services::ledger;
use crate::services::trading_service::TradeLocks;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User already exists.")]
    AlreadyExists,

    #[error("User not found.")]
    NotFound,

    #[error("Balance record not found for the user.")]
    BalanceMissing,

    #[error("Google account must have an email.")]
    EmailMissing,

    #[error("Balance cannot go below zero.")]
    InvalidAdjustment,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Register a new user: identity account, local row, starting balance.
/// Returns the provider-issued user id.
pub async fn register(
    db: &AnyPool,
    firebase: &FirebaseClient,
    starting_balance: f64,
    username: &str,
    email: &str,
    password: &str,
    profile_picture: Option<String>,
) -> Result<String, UserError> {
    let firebase_uid = firebase.sign_up(email, password).await?;

    {
        let mut conn = db.acquire().await?;
        if ledger::find_user_by_uid(&mut conn, &firebase_uid)
            .await?
            .is_some()
        {
            return Err(UserError::AlreadyExists);
        }
    }

    let picture = profile_picture
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| avatars::default_avatar_url(username));

    let mut tx = db.begin().await?;
    let user_id =
        ledger::insert_user(&mut tx, &firebase_uid, username, email, Some(&picture)).await?;
    ledger::create_balance(&mut tx, user_id, starting_balance).await?;
    tx.commit().await?;

    tracing::info!(user_id, "registered new user");

    Ok(firebase_uid)
}

/// Email + password login. The provider verifies credentials and issues the
/// token; we only check the user actually exists locally.
pub async fn login(
    db: &AnyPool,
    firebase: &FirebaseClient,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, UserError> {
    let token = firebase.sign_in(email, password).await?;
    let verified = firebase.verify_token(&token).await?;

    let mut conn = db.acquire().await?;
    let user = ledger::find_user_by_uid(&mut conn, &verified.uid)
        .await?
        .ok_or(UserError::NotFound)?;

    Ok(LoginOutcome { user, token })
}

/// Google federated login. First login registers the user locally, with the
/// same starting balance a password registration gets.
pub async fn login_with_google(
    db: &AnyPool,
    firebase: &FirebaseClient,
    starting_balance: f64,
    google_id_token: &str,
) -> Result<LoginOutcome, UserError> {
    let token = firebase.sign_in_with_google(google_id_token).await?;
    let verified = firebase.verify_token(&token).await?;

    let email = verified.email.ok_or(UserError::EmailMissing)?;

    let existing = {
        let mut conn = db.acquire().await?;
        ledger::find_user_by_uid(&mut conn, &verified.uid).await?
    };

    let user = match existing {
        Some(user) => user,
        None => {
            let username = verified.name.unwrap_or_else(|| "User".to_string());
            let picture = avatars::default_avatar_url(&username);

            let mut tx = db.begin().await?;
            let user_id =
                ledger::insert_user(&mut tx, &verified.uid, &username, &email, Some(&picture))
                    .await?;
            ledger::create_balance(&mut tx, user_id, starting_balance).await?;
            tx.commit().await?;

            tracing::info!(user_id, "registered user via google login");

            User {
                id: user_id,
                firebase_uid: verified.uid,
                username,
                email,
                profile_picture: Some(picture),
            }
        }
    };

    Ok(LoginOutcome { user, token })
}

pub async fn get_profile(db: &AnyPool, firebase_uid: &str) -> Result<UserDto, UserError> {
    let mut conn = db.acquire().await?;
    let user = ledger::find_user_by_uid(&mut conn, firebase_uid)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(user.into())
}

pub async fn get_stocks(db: &AnyPool, firebase_uid: &str) -> Result<Vec<UserStockDto>, UserError> {
    let mut conn = db.acquire().await?;
    let user = ledger::find_user_by_uid(&mut conn, firebase_uid)
        .await?
        .ok_or(UserError::NotFound)?;

    let holdings = ledger::list_holdings(&mut conn, user.id).await?;
    Ok(holdings.into_iter().map(Into::into).collect())
}

pub async fn get_transactions(
    db: &AnyPool,
    firebase_uid: &str,
) -> Result<Vec<TransactionDto>, UserError> {
    let mut conn = db.acquire().await?;
    let user = ledger::find_user_by_uid(&mut conn, firebase_uid)
        .await?
        .ok_or(UserError::NotFound)?;

    let transactions = ledger::list_transactions(&mut conn, user.id).await?;
    Ok(transactions.into_iter().map(Into::into).collect())
}

pub async fn get_balance(db: &AnyPool, firebase_uid: &str) -> Result<f64, UserError> {
    let mut conn = db.acquire().await?;
    let user = ledger::find_user_by_uid(&mut conn, firebase_uid)
        .await?
        .ok_or(UserError::NotFound)?;

    let balance = ledger::get_balance(&mut conn, user.id)
        .await?
        .ok_or(UserError::BalanceMissing)?;
    Ok(balance.amount)
}

/// Manually credit or debit a user's balance (demo top-up endpoint). Shares
/// the trade lock so it cannot interleave with a concurrent buy/sell, and
/// refuses adjustments that would take the balance negative.
pub async fn adjust_balance(
    db: &AnyPool,
    locks: &TradeLocks,
    firebase_uid: &str,
    amount_change: f64,
) -> Result<f64, UserError> {
    let user = {
        let mut conn = db.acquire().await?;
        ledger::find_user_by_uid(&mut conn, firebase_uid)
            .await?
            .ok_or(UserError::NotFound)?
    };

    let _guard = locks.acquire(user.id).await;
    let mut tx = db.begin().await?;

    let balance = ledger::get_balance(&mut tx, user.id)
        .await?
        .ok_or(UserError::BalanceMissing)?;
    if balance.amount + amount_change < 0.0 {
        return Err(UserError::InvalidAdjustment);
    }

    let new_amount = ledger::adjust_balance(&mut tx, user.id, amount_change)
        .await?
        .ok_or(UserError::BalanceMissing)?;
    tx.commit().await?;

    Ok(new_amount)
}
