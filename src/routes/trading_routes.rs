use axum::{Router, routing::post};

use crate::{AppState, controllers::trading_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/trade/buy", post(trading_controller::post_buy))
        .route("/api/trade/sell", post(trading_controller::post_sell))
}
