use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::user_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/user/register", post(user_controller::register))
        .route("/api/user/login", post(user_controller::login))
        .route("/api/user/login-google", post(user_controller::login_google))
        .route("/api/user/change-password", post(user_controller::change_password))
        .route("/api/user/forgot-password", post(user_controller::forgot_password))
        .route("/api/user/:firebase_uid", get(user_controller::get_user))
}
