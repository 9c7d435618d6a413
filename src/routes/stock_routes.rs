use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::stock_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/stocks/prices", post(stock_controller::get_prices))
        .route("/api/stocks/search", get(stock_controller::search))
        .route("/api/stocks/history/:symbol", get(stock_controller::get_history))
}
