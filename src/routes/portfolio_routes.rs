use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::portfolio_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/portfolio/:firebase_uid/stocks", get(portfolio_controller::get_stocks))
        .route(
            "/api/portfolio/:firebase_uid/transactions",
            get(portfolio_controller::get_transactions),
        )
        .route("/api/portfolio/:firebase_uid/balance", get(portfolio_controller::get_balance))
        .route("/api/portfolio/balance/update", post(portfolio_controller::update_balance))
}
