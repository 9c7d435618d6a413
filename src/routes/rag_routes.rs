use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::rag_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/rag/ask", post(rag_controller::ask))
        .route("/api/rag/daily-advice", get(rag_controller::daily_advice))
}
