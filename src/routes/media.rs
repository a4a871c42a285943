use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::extract::{parse_id, AuthUser};
use super::{cached_list, invalidate, AppState};
use crate::error::AppError;
use crate::providers::cache;
use crate::repositories::Page;
use crate::services::media::{CreateMedia, UpdateMedia};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/new", post(create))
        .route("/all", get(find))
        .route("/single/:value", get(find_one))
        .route("/detail/:id", get(find_by_id))
        .route("/tag/:tag", get(find_by_tag))
        .route("/category/:category", get(find_by_category))
        .route("/search", get(search))
        .route("/like/:id", put(like))
        .route("/dislike/:id", put(dislike))
        .route("/save/:id", put(save))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(remove))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateMediaDto {
    #[validate(length(min = 1, max = 200))]
    title: String,
    #[validate(length(min = 1))]
    content: String,
    #[validate(length(min = 1))]
    content_html: String,
    #[validate(length(min = 1, max = 500))]
    summary: String,
    #[validate(length(min = 1, max = 200))]
    slug: String,
    #[validate(length(min = 1, max = 100))]
    category: String,
    #[validate(length(min = 1))]
    tags: Vec<String>,
    video: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(dto): Json<CreateMediaDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let media = state
        .media
        .create(
            auth.id,
            CreateMedia {
                title: dto.title,
                content: dto.content,
                content_html: dto.content_html,
                summary: dto.summary,
                slug: dto.slug,
                category: dto.category,
                tags: dto.tags,
                video: dto.video,
            },
        )
        .await?;

    invalidate(&state.cache).await;
    Ok((StatusCode::CREATED, Json(media)).into_response())
}

async fn find(State(state): State<AppState>, page: Page) -> Result<Response, AppError> {
    let key = cache::list_key("media", &page);

    cached_list(&state.cache, &key, || async {
        state.media.find(&page).await
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
    let media = state.media.find_one(&table, &value).await?;
    Ok(Json(media).into_response())
}

async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let media = state.media.find_by_id(parse_id(&id)?).await?;
    Ok(Json(media).into_response())
}

async fn find_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Response, AppError> {
    let media = state.media.find_by_tag(&tag).await?;
    Ok(Json(media).into_response())
}

async fn find_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Response, AppError> {
    let media = state.media.find_by_category(&category).await?;
    Ok(Json(media).into_response())
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: String,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let media = state.media.search(&query.query).await?;
    Ok(Json(media).into_response())
}

async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let media = state.media.like(auth.id, parse_id(&id)?).await?;
    Ok(Json(media).into_response())
}

async fn dislike(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let media = state.media.dislike(auth.id, parse_id(&id)?).await?;
    Ok(Json(media).into_response())
}

async fn save(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let user = state.media.save(auth.id, parse_id(&id)?).await?;
    Ok(Json(user).into_response())
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateMediaDto {
    #[validate(length(min = 1, max = 200))]
    title: Option<String>,
    #[validate(length(min = 1))]
    content: Option<String>,
    content_html: Option<String>,
    #[validate(length(max = 500))]
    summary: Option<String>,
    #[validate(length(min = 1, max = 200))]
    slug: Option<String>,
    #[validate(length(min = 1, max = 100))]
    category: Option<String>,
    tags: Option<Vec<String>>,
    video: Option<String>,
}

async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
    Json(dto): Json<UpdateMediaDto>,
) -> Result<Response, AppError> {
    dto.validate()?;

    let media = state
        .media
        .update(
            parse_id(&id)?,
            UpdateMedia {
                title: dto.title,
                content: dto.content,
                content_html: dto.content_html,
                summary: dto.summary,
                slug: dto.slug,
                category: dto.category,
                tags: dto.tags,
                video: dto.video,
            },
        )
        .await?;

    invalidate(&state.cache).await;
    Ok(Json(media).into_response())
}

async fn remove(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let media = state.media.delete(parse_id(&id)?).await?;

    invalidate(&state.cache).await;
    Ok(Json(media).into_response())
}
