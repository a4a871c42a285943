use chrono::Utc;
use uuid::Uuid;

use super::{Assets, BlogRepo, TagRepo, UserRepo};
use crate::entities::{Blog, User};
use crate::error::{AppError, NotFoundAs};
use crate::providers::assets::AssetKind;
use crate::repositories::{Page, PostField, PostMutation};

#[derive(Debug, Clone)]
pub struct CreateBlog {
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub slug: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Raw file reference for the asset shim.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBlog {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_html: Option<String>,
    pub summary: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct BlogsService {
    blogs: BlogRepo,
    users: UserRepo,
    tags: TagRepo,
    assets: Assets,
}

impl BlogsService {
    pub fn new(blogs: BlogRepo, users: UserRepo, tags: TagRepo, assets: Assets) -> Self {
        Self {
            blogs,
            users,
            tags,
            assets,
        }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create(&self, author: Uuid, input: CreateBlog) -> Result<Blog, AppError> {
        let image = match input.image {
            Some(file) => Some(
                self.assets
                    .upload(&file, AssetKind::BlogImage)
                    .await
                    .map_err(AppError::Internal)?,
            ),
            None => None,
        };

        let now = Utc::now();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            content_html: input.content_html,
            summary: input.summary,
            slug: input.slug,
            category: input.category,
            tags: input.tags,
            image,
            author,
            likes: Default::default(),
            dislikes: Default::default(),
            created_at: now,
            updated_at: now,
        };

        self.blogs.insert(blog.clone()).await?;

        // Unknown titles are silently skipped; only media creation coins tags.
        for tag in &blog.tags {
            self.tags.increment_posts(tag).await?;
        }

        Ok(blog)
    }

    pub async fn find(&self, page: &Page) -> Result<Vec<Blog>, AppError> {
        Ok(self.blogs.find_all(page).await?)
    }

    pub async fn find_one(&self, table: &str, value: &str) -> Result<Blog, AppError> {
        let field = PostField::parse(table)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown field: {}", table)))?;

        self.blogs
            .find_by_field(field, value)
            .await
            .not_found_as(|| format!("Blog with value: {} not found", value))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Blog, AppError> {
        self.blogs
            .find(id)
            .await
            .not_found_as(|| format!("Blog id: {} not found", id))
    }

    pub async fn find_by_tag(&self, tag: &str) -> Result<Vec<Blog>, AppError> {
        Ok(self.blogs.find_by_tag(tag).await?)
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<Blog>, AppError> {
        Ok(self.blogs.find_by_category(category).await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Blog>, AppError> {
        let blogs = self.blogs.search(query).await?;

        if blogs.is_empty() {
            return Err(AppError::NotFound("Blogs not found".to_owned()));
        }

        Ok(blogs)
    }

    /// Toggle: a second like withdraws the first; a like over a dislike
    /// replaces it in a single document update.
    #[tracing::instrument(skip(self))]
    pub async fn like(&self, user_id: Uuid, blog_id: Uuid) -> Result<Blog, AppError> {
        let not_found = || format!("Blog id: {} not found", blog_id);

        self.blogs.find(blog_id).await.not_found_as(not_found)?;

        let updated = if self.blogs.is_liked(blog_id, user_id).await? {
            self.blogs.delete_like(blog_id, user_id).await
        } else {
            self.blogs.insert_like(blog_id, user_id).await
        };

        updated.not_found_as(not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn dislike(&self, user_id: Uuid, blog_id: Uuid) -> Result<Blog, AppError> {
        let not_found = || format!("Blog id: {} not found", blog_id);

        self.blogs.find(blog_id).await.not_found_as(not_found)?;

        let updated = if self.blogs.is_disliked(blog_id, user_id).await? {
            self.blogs.delete_dislike(blog_id, user_id).await
        } else {
            self.blogs.insert_dislike(blog_id, user_id).await
        };

        updated.not_found_as(not_found)
    }

    /// The save set lives on the user document, not the blog.
    #[tracing::instrument(skip(self))]
    pub async fn save(&self, user_id: Uuid, blog_id: Uuid) -> Result<User, AppError> {
        let not_found = || format!("User id: {} not found", user_id);

        self.users.find(user_id).await.not_found_as(not_found)?;

        let updated = if self.users.is_saved(user_id, blog_id).await? {
            self.users.delete_saved(user_id, blog_id).await
        } else {
            self.users.insert_saved(user_id, blog_id).await
        };

        updated.not_found_as(not_found)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateBlog) -> Result<Blog, AppError> {
        let existing = self
            .blogs
            .find(id)
            .await
            .not_found_as(|| format!("Blog id: {} not found", id))?;

        let asset = match input.image {
            Some(file) => Some(
                self.assets
                    .replace(
                        existing.image.as_ref().map(|a| a.public_id.as_str()),
                        &file,
                        AssetKind::BlogImage,
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

        self.blogs
            .update(id, mutation)
            .await
            .not_found_as(|| format!("Blog id: {} not found", id))
    }

    /// The document goes first; a failing asset destroy is reported, not
    /// masked, and the document is not restored.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Blog, AppError> {
        let blog = self
            .blogs
            .delete(id)
            .await
            .not_found_as(|| format!("Blog id: {} not found", id))?;

        if let Some(image) = &blog.image {
            self.assets
                .destroy(&image.public_id)
                .await
                .map_err(AppError::Internal)?;
        }

        Ok(blog)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::{Profile, Provider, Role, Tag};
    use crate::providers::assets::testing::RecordingAssetStore;
    use crate::repositories::mock::InMemoryRepository;
    use crate::repositories::{BlogRepository, TagRepository, UserRepository};

    struct Fixture {
        svc: BlogsService,
        blogs: Arc<InMemoryRepository<Blog>>,
        users: Arc<InMemoryRepository<User>>,
        tags: Arc<InMemoryRepository<Tag>>,
        assets: Arc<RecordingAssetStore>,
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingAssetStore::default())
    }

    fn fixture_with(assets: RecordingAssetStore) -> Fixture {
        let blogs = Arc::new(InMemoryRepository::<Blog>::new());
        let users = Arc::new(InMemoryRepository::<User>::new());
        let tags = Arc::new(InMemoryRepository::<Tag>::new());
        let assets = Arc::new(assets);

        Fixture {
            svc: BlogsService::new(blogs.clone(), users.clone(), tags.clone(), assets.clone()),
            blogs,
            users,
            tags,
            assets,
        }
    }

    async fn seed_user(users: &InMemoryRepository<User>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        users
            .insert(User {
                id,
                name: "Ada".to_owned(),
                username: "ada".to_owned(),
                email: format!("{}@example.com", id),
                password: None,
                role: Role::User,
                blocked: false,
                avatar: None,
                provider: Provider::Local,
                google_id: None,
                github_id: None,
                confirm_token: None,
                confirmed: true,
                destroy_token: None,
                reset_token: None,
                reset_expires: None,
                saved_blogs: Default::default(),
                following_tags: Default::default(),
                hidden_tags: Default::default(),
                profile: Profile::default(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        id
    }

    fn create_input() -> CreateBlog {
        CreateBlog {
            title: "Borrow checker field notes".to_owned(),
            content: "lifetimes all the way down".to_owned(),
            content_html: "<p>lifetimes all the way down</p>".to_owned(),
            summary: "notes".to_owned(),
            slug: "borrow-checker-field-notes".to_owned(),
            category: "rust".to_owned(),
            tags: vec!["rust".to_owned(), "memory".to_owned()],
            image: Some("data:image/png;base64,abc".to_owned()),
        }
    }

    #[tokio::test]
    async fn create_uploads_image_and_bumps_existing_tag_counters() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        f.tags.insert(Tag::with_title("rust")).await.unwrap();

        let blog = f.svc.create(author, create_input()).await.unwrap();

        assert!(blog.image.is_some());
        assert_eq!(f.assets.uploads.lock().await.len(), 1);
        assert_eq!(f.tags.find_by_title("rust").await.unwrap().unwrap().posts, 1);
        // "memory" was never registered as a tag and must not be coined here.
        assert!(f.tags.find_by_title("memory").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn like_twice_returns_to_the_original_state() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        let actor = seed_user(&f.users).await;
        let blog = f.svc.create(author, create_input()).await.unwrap();

        let liked = f.svc.like(actor, blog.id).await.unwrap();
        assert!(liked.likes.contains(&actor));

        let unliked = f.svc.like(actor, blog.id).await.unwrap();
        assert!(!unliked.likes.contains(&actor));
        assert_eq!(unliked.likes, blog.likes);
        assert_eq!(unliked.dislikes, blog.dislikes);
    }

    #[tokio::test]
    async fn like_over_a_dislike_swaps_without_a_both_present_state() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        let actor = seed_user(&f.users).await;
        let blog = f.svc.create(author, create_input()).await.unwrap();

        let disliked = f.svc.dislike(actor, blog.id).await.unwrap();
        assert!(disliked.dislikes.contains(&actor));

        let liked = f.svc.like(actor, blog.id).await.unwrap();
        assert!(liked.likes.contains(&actor));
        assert!(!liked.dislikes.contains(&actor));
    }

    #[tokio::test]
    async fn save_toggle_pair_is_idempotent_on_the_user_document() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        let actor = seed_user(&f.users).await;
        let blog = f.svc.create(author, create_input()).await.unwrap();

        let saved = f.svc.save(actor, blog.id).await.unwrap();
        assert!(saved.saved_blogs.contains(&blog.id));

        let unsaved = f.svc.save(actor, blog.id).await.unwrap();
        assert!(!unsaved.saved_blogs.contains(&blog.id));
    }

    #[tokio::test]
    async fn like_missing_blog_is_not_found() {
        let f = fixture();
        let actor = seed_user(&f.users).await;

        let res = f.svc.like(actor, Uuid::new_v4()).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn search_finds_case_insensitively_and_404s_on_nothing() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        f.svc.create(author, create_input()).await.unwrap();

        let hits = f.svc.search("BORROW").await.unwrap();
        assert_eq!(hits.len(), 1);

        let none = f.svc.search("quantum").await;
        assert!(matches!(none, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_destroys_the_stored_asset_exactly_once() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        let blog = f.svc.create(author, create_input()).await.unwrap();
        let public_id = blog.image.as_ref().unwrap().public_id.clone();

        f.svc.delete(blog.id).await.unwrap();

        assert_eq!(*f.assets.destroyed.lock().await, vec![public_id]);
        assert!(matches!(
            f.blogs.find(blog.id).await,
            Err(crate::repositories::RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_surfaces_a_failing_asset_destroy() {
        let f = fixture_with(RecordingAssetStore::failing_destroy());
        let author = seed_user(&f.users).await;
        let blog = f.svc.create(author, create_input()).await.unwrap();

        let res = f.svc.delete(blog.id).await;

        assert!(matches!(res, Err(AppError::Internal(_))));
        assert_eq!(f.assets.destroyed.lock().await.len(), 1);
        // No rollback: the document is already gone.
        assert!(matches!(
            f.blogs.find(blog.id).await,
            Err(crate::repositories::RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_replaces_the_image_through_the_asset_store() {
        let f = fixture();
        let author = seed_user(&f.users).await;
        let blog = f.svc.create(author, create_input()).await.unwrap();
        let old_id = blog.image.as_ref().unwrap().public_id.clone();

        let updated = f
            .svc
            .update(
                blog.id,
                UpdateBlog {
                    title: Some("Borrow checker, revisited".to_owned()),
                    image: Some("data:image/png;base64,def".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Borrow checker, revisited");
        assert_ne!(updated.image.as_ref().unwrap().public_id, old_id);
        assert_eq!(*f.assets.destroyed.lock().await, vec![old_id]);
    }
}
