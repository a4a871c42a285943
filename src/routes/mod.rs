use axum::http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::entities::User;
use crate::error::AppError;
use crate::providers::cache::CacheService;
use crate::services::auth::AuthService;
use crate::services::blogs::BlogsService;
use crate::services::media::MediaService;
use crate::services::tags::TagsService;
use crate::services::users::UsersService;
use crate::tokens::TokenKeys;

mod auth;
mod blogs;
mod extract;
mod media;
mod tags;
mod users;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UsersService,
    pub blogs: BlogsService,
    pub media: MediaService,
    pub tags: TagsService,
    pub cache: Option<CacheService>,
    pub tokens: TokenKeys,
}

pub fn router(state: AppState, cors_origin: &str) -> ::anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/users", users::routes())
        .nest("/blogs", blogs::routes())
        .nest("/media", media::routes())
        .nest("/tags", tags::routes());

    Ok(Router::new()
        .nest("/api/v2", api)
        .layer(cors)
        .with_state(state))
}

/// Session response: body carries `{user, token}`, plus the bearer header and
/// the http-only cookie the frontend reads.
pub(crate) fn with_token(user: User, token: String) -> Response {
    let mut res = Json(serde_json::json!({ "user": user, "token": token })).into_response();

    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
        res.headers_mut().insert(AUTHORIZATION, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Path=/",
        token
    )) {
        res.headers_mut().append(SET_COOKIE, value);
    }

    res
}

pub(crate) fn clear_session_cookies(res: &mut Response) {
    for name in ["token", "oauth_token", "current_user"] {
        if let Ok(value) = HeaderValue::from_str(&format!(
            "{}=; Max-Age=0; HttpOnly; Secure; SameSite=Lax; Path=/",
            name
        )) {
            res.headers_mut().append(SET_COOKIE, value);
        }
    }
}

/// Read-through helper for the list endpoints. Cache trouble never fails the
/// request.
pub(crate) async fn cached_list<T, F, Fut>(
    cache: &Option<CacheService>,
    key: &str,
    load: F,
) -> Result<Response, AppError>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: ::std::future::Future<Output = Result<T, AppError>>,
{
    if let Some(cache) = cache {
        match cache.get(key).await {
            Ok(Some(hit)) => {
                return Ok((
                    [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                    hit,
                )
                    .into_response())
            }
            Ok(None) => (),
            Err(e) => warn!("cache read for {} failed: {}", key, e),
        }
    }

    let items = load().await?;

    if let Some(cache) = cache {
        match serde_json::to_string(&items) {
            Ok(body) => {
                if let Err(e) = cache.set(key, &body).await {
                    warn!("cache write for {} failed: {}", key, e);
                }
            }
            Err(e) => warn!("cache serialization for {} failed: {}", key, e),
        }
    }

    Ok(Json(items).into_response())
}

/// Wholesale invalidation after a write, best effort.
pub(crate) async fn invalidate(cache: &Option<CacheService>) {
    if let Some(cache) = cache {
        if let Err(e) = cache.reset().await {
            warn!("cache reset failed: {}", e);
        }
    }
}

/// Single-key invalidation for writes that only touch one list, best effort.
pub(crate) async fn invalidate_key(cache: &Option<CacheService>, key: &str) {
    if let Some(cache) = cache {
        if let Err(e) = cache.del(key).await {
            warn!("cache delete for {} failed: {}", key, e);
        }
    }
}
