use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::{clear_session_cookies, with_token, AppState};
use crate::entities::{Asset, Provider};
use crate::error::AppError;
use crate::services::auth::{RegisterInput, SocialProfile};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/confirmation_token", get(confirm))
        .route("/oauth", post(oauth))
        .route("/oauth/password", post(oauth_password))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterDto {
    #[validate(length(min = 1, max = 60))]
    name: String,
    #[validate(length(min = 1, max = 60))]
    username: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct LoginDto {
    #[validate(email)]
    email: String,
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct SocialProfileDto {
    provider: Provider,
    provider_id: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, max = 60))]
    name: String,
    #[validate(length(min = 1, max = 60))]
    username: String,
    avatar: Option<Asset>,
}

async fn register(
    State(state): State<AppState>,
    Json(dto): Json<RegisterDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let (user, token) = state
        .auth
        .register(RegisterInput {
            name: dto.name,
            username: dto.username,
            email: dto.email,
            password: dto.password,
        })
        .await?;

    let mut res = with_token(user, token);
    *res.status_mut() = StatusCode::CREATED;
    Ok(res)
}

async fn login(
    State(state): State<AppState>,
    Json(dto): Json<LoginDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let (user, token) = state.auth.login(&dto.email, &dto.password).await?;
    Ok(with_token(user, token))
}

async fn logout() -> Response {
    let mut res = Json(serde_json::json!({ "message": "Successfully logged out" })).into_response();
    clear_session_cookies(&mut res);
    res
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: String,
}

async fn confirm(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, AppError> {
    let user = state.auth.confirm_account(&query.token).await?;
    Ok(Json(user).into_response())
}

async fn oauth(
    State(state): State<AppState>,
    Json(dto): Json<SocialProfileDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let (user, token) = state
        .auth
        .social(SocialProfile {
            provider: dto.provider,
            provider_id: dto.provider_id,
            email: dto.email,
            name: dto.name,
            username: dto.username,
            avatar: dto.avatar,
        })
        .await?;

    Ok(with_token(user, token))
}

#[derive(Debug, Deserialize)]
struct OauthPasswordQuery {
    token: String,
    pass: String,
}

async fn oauth_password(
    State(state): State<AppState>,
    Query(query): Query<OauthPasswordQuery>,
) -> Result<Response, AppError> {
    let (user, token) = state.auth.set_password(&query.token, &query.pass).await?;
    Ok(with_token(user, token))
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordQuery {
    email: String,
}

async fn forgot_password(
    State(state): State<AppState>,
    Query(query): Query<ForgotPasswordQuery>,
) -> Result<Response, AppError> {
    state.auth.forgot_password(&query.email).await?;

    Ok(Json(serde_json::json!({
        "message": "Check your email for password reset instructions"
    }))
    .into_response())
}

#[derive(Debug, Deserialize, Validate)]
struct ResetPasswordDto {
    #[validate(length(min = 8))]
    password: String,
}

async fn reset_password(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(dto): Json<ResetPasswordDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    state.auth.reset_password(&query.token, &dto.password).await?;

    Ok(Json(serde_json::json!({ "message": "Password successfully updated." })).into_response())
}
