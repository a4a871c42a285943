use chrono::Utc;
use uuid::Uuid;

use super::{Assets, TagRepo, UserRepo};
use crate::entities::{Tag, User};
use crate::error::{AppError, NotFoundAs};
use crate::providers::assets::AssetKind;
use crate::repositories::{TagField, TagMutation};

#[derive(Debug, Clone)]
pub struct CreateTag {
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    /// Raw file reference for the asset shim.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTag {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone)]
pub struct TagsService {
    tags: TagRepo,
    users: UserRepo,
    assets: Assets,
}

impl TagsService {
    pub fn new(tags: TagRepo, users: UserRepo, assets: Assets) -> Self {
        Self {
            tags,
            users,
            assets,
        }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create(&self, input: CreateTag) -> Result<Tag, AppError> {
        let image = match input.image {
            Some(file) => Some(
                self.assets
                    .upload(&file, AssetKind::Avatar)
                    .await
                    .map_err(AppError::Internal)?,
            ),
            None => None,
        };

        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            color: input.color.unwrap_or_else(|| Tag::DEFAULT_COLOR.to_owned()),
            image,
            posts: 0,
            created_at: now,
            updated_at: now,
        };

        if !self.tags.insert(tag.clone()).await? {
            return Err(AppError::Conflict(format!(
                "Tag with this title {} already exists",
                tag.title
            )));
        }

        Ok(tag)
    }

    pub async fn find(&self) -> Result<Vec<Tag>, AppError> {
        Ok(self.tags.find_all().await?)
    }

    pub async fn find_one(&self, table: &str, value: &str) -> Result<Tag, AppError> {
        let field = TagField::parse(table)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown field: {}", table)))?;

        self.tags
            .find_by_field(field, value)
            .await
            .not_found_as(|| format!("Tag with value: {} not found", value))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Tag, AppError> {
        self.tags
            .find(id)
            .await
            .not_found_as(|| format!("Tag id: {} not found", id))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Tag>, AppError> {
        let tags = self.tags.search(query).await?;

        if tags.is_empty() {
            return Err(AppError::NotFound("Tags not found".to_owned()));
        }

        Ok(tags)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateTag) -> Result<Tag, AppError> {
        let mutation = TagMutation {
            title: input.title,
            description: input.description,
            color: input.color,
            image: None,
        };

        self.tags
            .update(id, mutation)
            .await
            .not_found_as(|| format!("Tag id: {} not found", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn follow(&self, user_id: Uuid, tag_id: Uuid) -> Result<User, AppError> {
        let user_not_found = || format!("User id: {} not found", user_id);

        self.users.find(user_id).await.not_found_as(user_not_found)?;
        self.tags
            .find(tag_id)
            .await
            .not_found_as(|| format!("Tag id: {} not found", tag_id))?;

        let updated = if self.users.is_following(user_id, tag_id).await? {
            self.users.delete_following(user_id, tag_id).await
        } else {
            self.users.insert_following(user_id, tag_id).await
        };

        updated.not_found_as(user_not_found)
    }

    #[tracing::instrument(skip(self))]
    pub async fn hide(&self, user_id: Uuid, tag_id: Uuid) -> Result<User, AppError> {
        let user_not_found = || format!("User id: {} not found", user_id);

        self.users.find(user_id).await.not_found_as(user_not_found)?;
        self.tags
            .find(tag_id)
            .await
            .not_found_as(|| format!("Tag id: {} not found", tag_id))?;

        let updated = if self.users.is_hidden(user_id, tag_id).await? {
            self.users.delete_hidden(user_id, tag_id).await
        } else {
            self.users.insert_hidden(user_id, tag_id).await
        };

        updated.not_found_as(user_not_found)
    }

    pub async fn find_followed(&self, user_id: Uuid) -> Result<Vec<Tag>, AppError> {
        let user = self
            .users
            .find(user_id)
            .await
            .not_found_as(|| format!("User id: {} not found", user_id))?;

        Ok(self.tags.find_many(&user.following_tags).await?)
    }

    pub async fn find_hidden(&self, user_id: Uuid) -> Result<Vec<Tag>, AppError> {
        let user = self
            .users
            .find(user_id)
            .await
            .not_found_as(|| format!("User id: {} not found", user_id))?;

        Ok(self.tags.find_many(&user.hidden_tags).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Tag, AppError> {
        let tag = self
            .tags
            .delete(id)
            .await
            .not_found_as(|| format!("Tag id: {} not found", id))?;

        if let Some(image) = &tag.image {
            self.assets
                .destroy(&image.public_id)
                .await
                .map_err(AppError::Internal)?;
        }

        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::{Profile, Provider, Role};
    use crate::providers::assets::testing::RecordingAssetStore;
    use crate::repositories::mock::InMemoryRepository;
    use crate::repositories::UserRepository;

    struct Fixture {
        svc: TagsService,
        users: Arc<InMemoryRepository<User>>,
        assets: Arc<RecordingAssetStore>,
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingAssetStore::default())
    }

    fn fixture_with(assets: RecordingAssetStore) -> Fixture {
        let tags = Arc::new(InMemoryRepository::<Tag>::new());
        let users = Arc::new(InMemoryRepository::<User>::new());
        let assets = Arc::new(assets);

        Fixture {
            svc: TagsService::new(tags, users.clone(), assets.clone()),
            users,
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

    fn create_input(title: &str) -> CreateTag {
        CreateTag {
            title: title.to_owned(),
            description: Some("systems language".to_owned()),
            color: None,
            image: Some("data:image/png;base64,abc".to_owned()),
        }
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let f = fixture();

        f.svc.create(create_input("rust")).await.unwrap();
        let res = f.svc.create(create_input("rust")).await;

        assert!(matches!(res, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn follow_toggle_pair_is_idempotent() {
        let f = fixture();
        let user = seed_user(&f.users).await;
        let tag = f.svc.create(create_input("rust")).await.unwrap();

        let followed = f.svc.follow(user, tag.id).await.unwrap();
        assert!(followed.following_tags.contains(&tag.id));

        let unfollowed = f.svc.follow(user, tag.id).await.unwrap();
        assert!(!unfollowed.following_tags.contains(&tag.id));
    }

    #[tokio::test]
    async fn follow_and_hide_are_independent_sets() {
        let f = fixture();
        let user = seed_user(&f.users).await;
        let tag = f.svc.create(create_input("rust")).await.unwrap();

        f.svc.follow(user, tag.id).await.unwrap();
        let hidden = f.svc.hide(user, tag.id).await.unwrap();

        assert!(hidden.following_tags.contains(&tag.id));
        assert!(hidden.hidden_tags.contains(&tag.id));
    }

    #[tokio::test]
    async fn follow_missing_tag_is_not_found() {
        let f = fixture();
        let user = seed_user(&f.users).await;

        let res = f.svc.follow(user, Uuid::new_v4()).await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn followed_listing_resolves_tag_documents() {
        let f = fixture();
        let user = seed_user(&f.users).await;
        let rust = f.svc.create(create_input("rust")).await.unwrap();
        f.svc.create(create_input("go")).await.unwrap();

        f.svc.follow(user, rust.id).await.unwrap();

        let followed = f.svc.find_followed(user).await.unwrap();
        assert_eq!(followed.len(), 1);
        assert_eq!(followed[0].id, rust.id);
    }

    #[tokio::test]
    async fn delete_surfaces_a_failing_image_destroy_exactly_once() {
        let f = fixture_with(RecordingAssetStore::failing_destroy());
        let tag = f.svc.create(create_input("rust")).await.unwrap();
        let public_id = tag.image.as_ref().unwrap().public_id.clone();

        let res = f.svc.delete(tag.id).await;

        assert!(matches!(res, Err(AppError::Internal(_))));
        assert_eq!(*f.assets.destroyed.lock().await, vec![public_id]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_description() {
        let f = fixture();
        f.svc.create(create_input("rust")).await.unwrap();

        assert_eq!(f.svc.search("RUST").await.unwrap().len(), 1);
        assert_eq!(f.svc.search("systems").await.unwrap().len(), 1);
        assert!(matches!(f.svc.search("cobol").await, Err(AppError::NotFound(_))));
    }
}
