use chrono::Utc;
use uuid::Uuid;

use super::{Assets, MediaRepo, TagRepo, UserRepo};
use crate::entities::{Media, Tag, User};
use crate::error::{AppError, NotFoundAs};
use crate::providers::assets::AssetKind;
use crate::repositories::{Page, PostField, PostMutation};

#[derive(Debug, Clone)]
pub struct CreateMedia {
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub slug: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Raw file reference for the asset shim.
    pub video: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMedia {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_html: Option<String>,
    pub summary: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub video: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    media: MediaRepo,
    users: UserRepo,
    tags: TagRepo,
    assets: Assets,
}

impl MediaService {
    pub fn new(media: MediaRepo, users: UserRepo, tags: TagRepo, assets: Assets) -> Self {
        Self {
            media,
            users,
            tags,
            assets,
        }
    }

    /// Unlike blog creation, media creation coins any tag title it has not
    /// seen before.
    #[tracing::instrument(skip(self, input))]
    pub async fn create(&self, author: Uuid, input: CreateMedia) -> Result<Media, AppError> {
        let video = match input.video {
            Some(file) => Some(
                self.assets
                    .upload(&file, AssetKind::Video)
                    .await
                    .map_err(AppError::Internal)?,
            ),
            None => None,
        };

        let now = Utc::now();
        let media = Media {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            content_html: input.content_html,
            summary: input.summary,
            slug: input.slug,
            category: input.category,
            tags: input.tags,
            video,
            author,
            likes: Default::default(),
            dislikes: Default::default(),
            created_at: now,
            updated_at: now,
        };

        self.media.insert(media.clone()).await?;

        for tag in &media.tags {
            if self.tags.find_by_title(tag).await?.is_some() {
                self.tags.increment_posts(tag).await?;
            } else {
                self.tags.insert(Tag::with_title(tag)).await?;
            }
        }

        Ok(media)
    }

    pub async fn find(&self, page: &Page) -> Result<Vec<Media>, AppError> {
        Ok(self.media.find_all(page).await?)
    }

    pub async fn find_one(&self, table: &str, value: &str) -> Result<Media, AppError> {
        let field = PostField::parse(table)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown field: {}", table)))?;

        self.media
            .find_by_field(field, value)
            .await
            .not_found_as(|| format!("Media with value: {} not found", value))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Media, AppError> {
        self.media
            .find(id)
            .await
            .not_found_as(|| format!("Media id: {} not found", id))
    }

    pub async fn find_by_tag(&self, tag: &str) -> Result<Vec<Media>, AppError> {
        Ok(self.media.find_by_tag(tag).await?)
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Media>, AppError> {
        Ok(self.media.find_by_category(category).await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Media>, AppError> {
        let media = self.media.search(query).await?;

        if media.is_empty() {
            return Err(AppError::NotFound("Media not found".to_owned()));
        }

        Ok(media)
    }

    #[tracing::instrument(skip(self))]
    pub async fn like(&self, user_id: Uuid, media_id: Uuid) -> Result<Media, AppError> {
        let not_found = || format!("Media id: {} not found", media_id);

        self.media.find(media_id).await.not_found_as(not_found)?;

        let updated = if self.media.is_liked(media_id, user_id).await? {
            self.media.delete_like(media_id, user_id).await
        } else {
            self.media.insert_like(media_id, user_id).await
        };

        updated.not_found_as(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn dislike(&self, user_id: Uuid, media_id: Uuid) -> Result<Media, AppError> {
        let not_found = || format!("Media id: {} not found", media_id);

        self.media.find(media_id).await.not_found_as(not_found)?;

        let updated = if self.media.is_disliked(media_id, user_id).await? {
            self.media.delete_dislike(media_id, user_id).await
        } else {
            self.media.insert_dislike(media_id, user_id).await
        };

        updated.not_found_as(not_found)
    }

    /// Saved media shares the user's saved set with blogs.
    #[tracing::instrument(skip(self))]
    pub async fn save(&self, user_id: Uuid, media_id: Uuid) -> Result<User, AppError> {
        let not_found = || format!("User id: {} not found", user_id);

        self.users.find(user_id).await.not_found_as(not_found)?;

        let updated = if self.users.is_saved(user_id, media_id).await? {
            self.users.delete_saved(user_id, media_id).await
        } else {
            self.users.insert_saved(user_id, media_id).await
        };

        updated.not_found_as(not_found)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateMedia) -> Result<Media, AppError> {
        let existing = self
            .media
            .find(id)
            .await
            .not_found_as(|| format!("Media id: {} not found", id))?;

        let asset = match input.video {
            Some(file) => Some(
                self.assets
                    .replace(
                        existing.video.as_ref().map(|a| a.public_id.as_str()),
                        &file,
                        AssetKind::Video,
                    )
                    .await
                    .map_err(AppError::Internal)?,
            ),
            None => None,
        };

        let mutation = PostMutation {
            title: input.title,
            content: input.content,
            content_html: input.content_html,
            summary: input.summary,
            slug: input.slug,
            category: input.category,
            tags: input.tags,
            asset,
        };

        self.media
            .update(id, mutation)
            .await
            .not_found_as(|| format!("Media id: {} not found", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Media, AppError> {
        let media = self
            .media
            .delete(id)
            .await
            .not_found_as(|| format!("Media id: {} not found", id))?;

        if let Some(video) = &media.video {
            self.assets
                .destroy(&video.public_id)
                .await
                .map_err(AppError::Internal)?;
        }

        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::providers::assets::testing::RecordingAssetStore;
    use crate::repositories::mock::InMemoryRepository;
    use crate::repositories::TagRepository;

    struct Fixture {
        svc: MediaService,
        tags: Arc<InMemoryRepository<Tag>>,
        assets: Arc<RecordingAssetStore>,
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingAssetStore::default())
    }

    fn fixture_with(assets: RecordingAssetStore) -> Fixture {
        let media = Arc::new(InMemoryRepository::<Media>::new());
        let users = Arc::new(InMemoryRepository::<User>::new());
        let tags = Arc::new(InMemoryRepository::<Tag>::new());
        let assets = Arc::new(assets);

        Fixture {
            svc: MediaService::new(media, users, tags.clone(), assets.clone()),
            tags,
            assets,
        }
    }

    fn create_input() -> CreateMedia {
        CreateMedia {
            title: "Streams in practice".to_owned(),
            content: "pinning, polling, backpressure".to_owned(),
            content_html: "<p>pinning, polling, backpressure</p>".to_owned(),
            summary: "talk recording".to_owned(),
            slug: "streams-in-practice".to_owned(),
            category: "rust".to_owned(),
            tags: vec!["rust".to_owned(), "async".to_owned()],
            video: Some("data:video/mp4;base64,abc".to_owned()),
        }
    }

    #[tokio::test]
    async fn create_coins_unknown_tags_and_bumps_known_ones() {
        let f = fixture();
        f.tags.insert(Tag::with_title("rust")).await.unwrap();

        f.svc.create(Uuid::new_v4(), create_input()).await.unwrap();

        assert_eq!(f.tags.find_by_title("rust").await.unwrap().unwrap().posts, 1);
        let coined = f.tags.find_by_title("async").await.unwrap().unwrap();
        assert_eq!(coined.posts, 0);
    }

    #[tokio::test]
    async fn dislike_twice_returns_to_the_original_state() {
        let f = fixture();
        let actor = Uuid::new_v4();
        let media = f.svc.create(Uuid::new_v4(), create_input()).await.unwrap();

        let disliked = f.svc.dislike(actor, media.id).await.unwrap();
        assert!(disliked.dislikes.contains(&actor));

        let undone = f.svc.dislike(actor, media.id).await.unwrap();
        assert!(!undone.dislikes.contains(&actor));
        assert_eq!(undone.dislikes, media.dislikes);
    }

    #[tokio::test]
    async fn delete_surfaces_a_failing_video_destroy_exactly_once() {
        let f = fixture_with(RecordingAssetStore::failing_destroy());
        let media = f.svc.create(Uuid::new_v4(), create_input()).await.unwrap();
        let public_id = media.video.as_ref().unwrap().public_id.clone();

        let res = f.svc.delete(media.id).await;

        assert!(matches!(res, Err(AppError::Internal(_))));
        assert_eq!(*f.assets.destroyed.lock().await, vec![public_id]);
    }
}
