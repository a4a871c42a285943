use axum::extract::{FromRequestParts, Query};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;
use crate::repositories::{Order, Page, SortSpec};

/// Authenticated caller, resolved from the bearer header or the `token`
/// cookie.
pub struct AuthUser {
    pub id: Uuid,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| AppError::Unauthorized("Missing credentials".to_owned()))?;

        let claims = state.tokens.verify(&token)?;

        Ok(AuthUser {
            id: claims.user_id()?,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_owned())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, value)| value.to_owned())
}

/// Role check against the stored record, not the token.
pub(crate) async fn ensure_admin(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let user = state.users.find_by_id(id).await?;

    match user.role {
        crate::entities::Role::Admin => Ok(()),
        crate::entities::Role::User => {
            Err(AppError::Unauthorized("You are not admin".to_owned()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageParams {
    skip: Option<u64>,
    limit: Option<i64>,
    /// Comma-separated `field:asc|desc` pairs.
    sort: Option<String>,
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Page {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, AppError> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid pagination parameters".to_owned()))?;

        let mut page = Page::default();
        if let Some(skip) = params.skip {
            page.skip = skip;
        }
        if let Some(limit) = params.limit {
            page.limit = limit;
        }

        if let Some(sort) = params.sort {
            for item in sort.split(',').filter(|s| !s.is_empty()) {
                let (field, order) = match item.split_once(':') {
                    Some((f, o)) => (f.trim(), o.trim()),
                    None => (item.trim(), "desc"),
                };

                page.sort.push(SortSpec {
                    field: field.to_owned(),
                    order: if order.eq_ignore_ascii_case("asc") {
                        Order::Asc
                    } else {
                        Order::Desc
                    },
                });
            }
        }

        Ok(page)
    }
}

/// Path ids come in as strings so a malformed value maps to a 400 naming the
/// offender, not a framework-shaped rejection.
pub(crate) fn parse_id(value: &str) -> Result<Uuid, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid identifier format: {}", value)))
}
