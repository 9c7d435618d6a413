use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::services::firebase::AuthError;
use crate::services::market::MarketError;
use crate::services::ollama::OllamaError;
use crate::services::qdrant::QdrantError;
use crate::services::trading_service::TradeError;
use crate::services::user_service::UserError;

/// API-level failure taxonomy. Every handler returns `Result<_, ApiError>`
/// and the status mapping lives in one place.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Insufficient funds.")]
    InsufficientFunds,

    #[error("Not enough stocks to sell.")]
    InsufficientHoldings,

    #[error("Invalid stock symbol or unable to fetch stock price.")]
    PriceUnavailable,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Upstream(String),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InsufficientFunds => StatusCode::BAD_REQUEST,
            ApiError::InsufficientHoldings => StatusCode::BAD_REQUEST,
            ApiError::PriceUnavailable => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        match err {
            TradeError::Validation(msg) => ApiError::Validation(msg),
            TradeError::UserNotFound => ApiError::NotFound("User not found.".to_string()),
            TradeError::BalanceMissing => {
                ApiError::NotFound("Balance record not found for the user.".to_string())
            }
            TradeError::InsufficientFunds => ApiError::InsufficientFunds,
            TradeError::InsufficientHoldings => ApiError::InsufficientHoldings,
            TradeError::PriceUnavailable(_) => ApiError::PriceUnavailable,
            TradeError::Db(e) => ApiError::Db(e),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AlreadyExists => ApiError::Conflict("User already exists.".to_string()),
            UserError::NotFound => ApiError::NotFound("User not found.".to_string()),
            UserError::BalanceMissing => {
                ApiError::NotFound("Balance record not found for the user.".to_string())
            }
            UserError::EmailMissing => {
                ApiError::Validation("Google account must have an email.".to_string())
            }
            UserError::InvalidAdjustment => {
                ApiError::Validation("Balance cannot go below zero.".to_string())
            }
            UserError::Auth(e) => e.into(),
            UserError::Db(e) => ApiError::Db(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::Rejected(msg) => ApiError::Validation(msg),
            AuthError::MissingKey => {
                ApiError::Upstream("FIREBASE_API_KEY is missing in .env".to_string())
            }
            AuthError::Http(e) => ApiError::Upstream(e.to_string()),
            AuthError::Upstream(msg) => ApiError::Upstream(msg),
        }
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::PriceUnavailable(_) => ApiError::PriceUnavailable,
            MarketError::Http(e) => ApiError::Upstream(e.to_string()),
            MarketError::Upstream(msg) => ApiError::Upstream(msg),
        }
    }
}

impl From<OllamaError> for ApiError {
    fn from(err: OllamaError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<QdrantError> for ApiError {
    fn from(err: QdrantError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}
