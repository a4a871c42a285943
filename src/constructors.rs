use std::sync::Arc;

use axum::Router;
use chrono::Duration;

use crate::config::Config;
use crate::entities::{Blog, Media, Tag, User};
use crate::providers::assets::{CloudinaryStore, InMemoryAssetStore};
use crate::providers::cache::CacheService;
use crate::providers::mail::{LogMailer, Mails, SmtpMailer};
use crate::repositories::mock::InMemoryRepository;
use crate::repositories::mongo::{
    MongoBlogRepository, MongoMediaRepository, MongoTagRepository, MongoUserRepository,
};
use crate::routes::{self, AppState};
use crate::services::auth::AuthService;
use crate::services::blogs::BlogsService;
use crate::services::media::MediaService;
use crate::services::tags::TagsService;
use crate::services::users::UsersService;
use crate::services::{Assets, BlogRepo, MediaRepo, TagRepo, UserRepo};
use crate::tokens::TokenKeys;

/// Wires the application against MongoDB (and Redis when configured).
pub async fn mongo(config: &Config) -> ::anyhow::Result<Router> {
    let client = ::mongodb::Client::with_uri_str(&config.mongo_uri).await?;
    let db = client.database(&config.mongo_db);

    let users: UserRepo = Arc::new(MongoUserRepository::new_with(&db).await?);
    let blogs: BlogRepo = Arc::new(MongoBlogRepository::new_with(&db).await?);
    let media: MediaRepo = Arc::new(MongoMediaRepository::new_with(&db).await?);
    let tags: TagRepo = Arc::new(MongoTagRepository::new_with(&db).await?);

    let cache = match &config.redis_url {
        Some(url) => Some(CacheService::connect(url, config.cache_ttl_seconds).await?),
        None => None,
    };

    assemble(config, users, blogs, media, tags, cache)
}

/// Everything held in process memory; handy for local runs without any
/// backing services.
pub fn in_memory(config: &Config) -> ::anyhow::Result<Router> {
    let users: UserRepo = Arc::new(InMemoryRepository::<User>::new());
    let blogs: BlogRepo = Arc::new(InMemoryRepository::<Blog>::new());
    let media: MediaRepo = Arc::new(InMemoryRepository::<Media>::new());
    let tags: TagRepo = Arc::new(InMemoryRepository::<Tag>::new());

    assemble(config, users, blogs, media, tags, None)
}

fn assemble(
    config: &Config,
    users: UserRepo,
    blogs: BlogRepo,
    media: MediaRepo,
    tags: TagRepo,
    cache: Option<CacheService>,
) -> ::anyhow::Result<Router> {
    let tokens = TokenKeys::new(
        config.jwt_secret.as_bytes(),
        Duration::hours(config.jwt_ttl_hours),
    );

    let sender: Arc<dyn crate::providers::mail::MailSender + Sync + Send> =
        match &config.smtp_host {
            Some(host) => Arc::new(SmtpMailer::new(
                host,
                config.smtp_username.clone(),
                config.smtp_password.clone(),
                &config.mail_from,
            )?),
            None => Arc::new(LogMailer),
        };
    let mails = Mails::new(sender, config.public_url.clone());

    let assets: Assets = match &config.asset_cloud_name {
        Some(cloud) => Arc::new(CloudinaryStore::new(
            cloud.clone(),
            config.asset_api_key.clone(),
            config.asset_api_secret.clone(),
        )),
        None => Arc::new(InMemoryAssetStore),
    };

    let state = AppState {
        auth: AuthService::new(users.clone(), mails.clone(), tokens.clone()),
        users: UsersService::new(users.clone(), assets.clone(), mails.clone()),
        blogs: BlogsService::new(blogs, users.clone(), tags.clone(), assets.clone()),
        media: MediaService::new(media, users.clone(), tags.clone(), assets.clone()),
        tags: TagsService::new(tags, users, assets),
        cache,
        tokens,
    };

    routes::router(state, &config.cors_origin)
}
