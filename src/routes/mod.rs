use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod user_routes;
pub mod portfolio_routes;
pub mod trading_routes;
pub mod stock_routes;
pub mod rag_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = user_routes::add_routes(router);
    let router = portfolio_routes::add_routes(router);
    let router = trading_routes::add_routes(router);
    let router = stock_routes::add_routes(router);
    let router = rag_routes::add_routes(router);

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
