use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::extract::{ensure_admin, parse_id, AuthUser};
use super::{cached_list, clear_session_cookies, invalidate, AppState};
use crate::error::AppError;
use crate::services::users::{NewUser, UpdateUser};

const LIST_CACHE_KEY: &str = "users:all";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(create))
        .route("/all", get(find))
        .route("/profile", get(profile))
        .route("/single/:value", get(find_one))
        .route("/detail/:id", get(find_by_id))
        .route("/email/:email", get(find_by_email))
        .route("/username/:username", get(find_by_username))
        .route("/block/:id", put(block))
        .route("/unblock/:id", put(unblock))
        .route("/edit-role/:id", put(update_role))
        .route("/edit-password", put(update_password))
        .route("/edit-user", put(update))
        .route("/delete", delete(request_delete))
        .route("/confirm_destroy", delete(confirm_destroy))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateUserDto {
    #[validate(length(min = 1, max = 60))]
    name: String,
    #[validate(length(min = 1, max = 60))]
    username: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
}

async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateUserDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let user = state
        .users
        .create(NewUser {
            name: dto.name,
            username: dto.username,
            email: dto.email,
            password: dto.password,
        })
        .await?;

    invalidate(&state.cache).await;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn find(State(state): State<AppState>) -> Result<Response, AppError> {
    cached_list(&state.cache, LIST_CACHE_KEY, || async {
        state.users.find().await
    })
    .await
}

async fn profile(State(state): State<AppState>, auth: AuthUser) -> Result<Response, AppError> {
    let user = state.users.find_by_id(auth.id).await?;
    Ok(Json(user).into_response())
}

#[derive(Debug, Deserialize)]
struct TableQuery {
    table: Option<String>,
}

async fn find_one(
    State(state): State<AppState>,
    Path(value): Path<String>,
    Query(query): Query<TableQuery>,
) -> Result<Response, AppError> {
    let table = query.table.unwrap_or_default();
    let user = state.users.find_one(&table, &value).await?;
    Ok(Json(user).into_response())
}

async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let user = state.users.find_by_id(parse_id(&id)?).await?;
    Ok(Json(user).into_response())
}

async fn find_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Response, AppError> {
    let user = state.users.find_by_email(&email).await?;
    Ok(Json(user).into_response())
}

async fn find_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let user = state.users.find_by_username(&username).await?;
    Ok(Json(user).into_response())
}

async fn block(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    ensure_admin(&state, auth.id).await?;

    let user = state.users.block(parse_id(&id)?).await?;
    invalidate(&state.cache).await;
    Ok(Json(user).into_response())
}

async fn unblock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    ensure_admin(&state, auth.id).await?;

    let user = state.users.unblock(parse_id(&id)?).await?;
    invalidate(&state.cache).await;
    Ok(Json(user).into_response())
}

#[derive(Debug, Deserialize)]
struct RoleQuery {
    role: String,
}

async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Result<Response, AppError> {
    ensure_admin(&state, auth.id).await?;

    let user = state.users.update_role(parse_id(&id)?, &query.role).await?;
    invalidate(&state.cache).await;
    Ok(Json(user).into_response())
}

#[derive(Debug, Deserialize, Validate)]
struct UpdatePasswordDto {
    old_password: String,
    #[validate(length(min = 8))]
    password: String,
    confirm_password: String,
}

async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(dto): Json<UpdatePasswordDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    state
        .users
        .update_password(auth.id, &dto.old_password, &dto.password, &dto.confirm_password)
        .await?;

    Ok(StatusCode::OK.into_response())
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateUserDto {
    #[validate(length(min = 1, max = 60))]
    name: Option<String>,
    #[validate(length(min = 1, max = 60))]
    username: Option<String>,
    #[validate(length(max = 200))]
    bio: Option<String>,
    brand_color: Option<String>,
    #[validate(length(max = 100))]
    education: Option<String>,
    #[validate(length(max = 200))]
    projects: Option<String>,
    #[validate(length(max = 200))]
    skills: Option<String>,
    #[validate(length(max = 200))]
    learning: Option<String>,
    urls: Option<Vec<String>>,
    #[validate(length(max = 100))]
    location: Option<String>,
    #[validate(length(max = 100))]
    work: Option<String>,
    avatar: Option<String>,
}

async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(dto): Json<UpdateUserDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let user = state
        .users
        .update(
            auth.id,
            UpdateUser {
                name: dto.name,
                username: dto.username,
                bio: dto.bio,
                brand_color: dto.brand_color,
                education: dto.education,
                projects: dto.projects,
                skills: dto.skills,
                learning: dto.learning,
                urls: dto.urls,
                location: dto.location,
                work: dto.work,
                avatar: dto.avatar,
            },
        )
        .await?;

    invalidate(&state.cache).await;
    Ok(Json(user).into_response())
}

async fn request_delete(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    state.users.request_delete(auth.id).await?;

    Ok(Json(serde_json::json!({
        "message": "You have requested account deletion. Please, check your email for further instructions."
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
struct ConfirmDestroyQuery {
    token: String,
    username: String,
}

async fn confirm_destroy(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ConfirmDestroyQuery>,
) -> Result<Response, AppError> {
    let user = state
        .users
        .confirm_delete(&query.token, &query.username)
        .await?;

    invalidate(&state.cache).await;

    let mut res = Json(user).into_response();
    clear_session_cookies(&mut res);
    Ok(res)
}
