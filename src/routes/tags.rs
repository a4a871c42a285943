use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::extract::{parse_id, AuthUser};
use super::{cached_list, invalidate, invalidate_key, AppState};
use crate::error::AppError;
use crate::services::tags::{CreateTag, UpdateTag};

const LIST_CACHE_KEY: &str = "tags:all";

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(create))
        .route("/all", get(find))
        .route("/single/:value", get(find_one))
        .route("/detail/:id", get(find_by_id))
        .route("/search", get(search))
        .route("/follow/all", get(find_followed))
        .route("/hide/all", get(find_hidden))
        .route("/edit-tag/:id", put(update))
        .route("/follow", put(follow))
        .route("/hide", put(hide))
        .route("/delete/:id", delete(remove))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateTagDto {
    #[validate(length(min = 1, max = 60))]
    title: String,
    #[validate(length(max = 300))]
    description: Option<String>,
    color: Option<String>,
    image: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Json(dto): Json<CreateTagDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let tag = state
        .tags
        .create(CreateTag {
            title: dto.title,
            description: dto.description,
            color: dto.color,
            image: dto.image,
        })
        .await?;

    invalidate(&state.cache).await;
    Ok((StatusCode::CREATED, Json(tag)).into_response())
}

async fn find(State(state): State<AppState>) -> Result<Response, AppError> {
    cached_list(&state.cache, LIST_CACHE_KEY, || async {
        state.tags.find().await
    })
    .await
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
    let tag = state.tags.find_one(&table, &value).await?;
    Ok(Json(tag).into_response())
}

async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let tag = state.tags.find_by_id(parse_id(&id)?).await?;
    Ok(Json(tag).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: String,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let tags = state.tags.search(&query.query).await?;
    Ok(Json(tags).into_response())
}

async fn find_followed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let tags = state.tags.find_followed(auth.id).await?;
    Ok(Json(tags).into_response())
}

async fn find_hidden(State(state): State<AppState>, auth: AuthUser) -> Result<Response, AppError> {
    let tags = state.tags.find_hidden(auth.id).await?;
    Ok(Json(tags).into_response())
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateTagDto {
    #[validate(length(min = 1, max = 60))]
    title: Option<String>,
    #[validate(length(max = 300))]
    description: Option<String>,
    color: Option<String>,
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<UpdateTagDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let tag = state
        .tags
        .update(
            parse_id(&id)?,
            UpdateTag {
                title: dto.title,
                description: dto.description,
                color: dto.color,
            },
        )
        .await?;

    invalidate_key(&state.cache, LIST_CACHE_KEY).await;
    Ok(Json(tag).into_response())
}

#[derive(Debug, Deserialize)]
struct TagIdQuery {
    tag_id: String,
}

async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TagIdQuery>,
) -> Result<Response, AppError> {
    let user = state.tags.follow(auth.id, parse_id(&query.tag_id)?).await?;
    Ok(Json(user).into_response())
}

async fn hide(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TagIdQuery>,
) -> Result<Response, AppError> {
    let user = state.tags.hide(auth.id, parse_id(&query.tag_id)?).await?;
    Ok(Json(user).into_response())
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let tag = state.tags.delete(parse_id(&id)?).await?;

    invalidate(&state.cache).await;
    Ok(Json(tag).into_response())
}
