use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::UserDto;
use crate::services::user_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub id_token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

fn require_field(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("Missing {name}.")));
    }
    Ok(())
}

// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    require_field(&req.username, "username")?;
    require_field(&req.email, "email")?;
    require_field(&req.password, "password")?;

    let firebase_uid = user_service::register(
        &state.db,
        &state.firebase,
        state.settings.starting_balance,
        &req.username,
        &req.email,
        &req.password,
        req.profile_picture,
    )
    .await?;

    Ok(Json(json!({
        "userId": firebase_uid,
        "message": "User created successfully",
    })))
}

fn login_response(outcome: user_service::LoginOutcome) -> Json<Value> {
    Json(json!({
        "id": outcome.user.id,
        "username": outcome.user.username,
        "email": outcome.user.email,
        "firebaseUserId": outcome.user.firebase_uid,
        "profilePicture": outcome.user.profile_picture,
        "token": outcome.token,
    }))
}

// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    require_field(&req.email, "email")?;
    require_field(&req.password, "password")?;

    let outcome = user_service::login(&state.db, &state.firebase, &req.email, &req.password).await?;
    Ok(login_response(outcome))
}

// POST /api/user/login-google
pub async fn login_google(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<Value>, ApiError> {
    require_field(&req.id_token, "idToken")?;

    let outcome = user_service::login_with_google(
        &state.db,
        &state.firebase,
        state.settings.starting_balance,
        &req.id_token,
    )
    .await?;
    Ok(login_response(outcome))
}

// POST /api/user/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    require_field(&req.id_token, "idToken")?;
    require_field(&req.new_password, "newPassword")?;

    state
        .firebase
        .change_password(&req.id_token, &req.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

// POST /api/user/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    require_field(&req.email, "email")?;

    state.firebase.send_password_reset(&req.email).await?;

    Ok(Json(json!({ "message": "Password reset email sent successfully" })))
}

// GET /api/user/:firebase_uid
pub async fn get_user(
    State(state): State<AppState>,
    Path(firebase_uid): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let profile = user_service::get_profile(&state.db, &firebase_uid).await?;
    Ok(Json(profile))
}
