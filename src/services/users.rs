use anyhow::anyhow;
use chrono::Utc;
use uuid::Uuid;

use super::{Assets, UserRepo};
use crate::entities::{Profile, Provider, Role, User};
use crate::error::{AppError, NotFoundAs};
use crate::providers::assets::AssetKind;
use crate::providers::mail::Mails;
use crate::repositories::{TokenKind, UserField, UserMutation};
use crate::tokens::generate_token;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Profile update; `avatar` carries the raw file reference to push through
/// the asset shim.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub brand_color: Option<String>,
    pub education: Option<String>,
    pub projects: Option<String>,
    pub skills: Option<String>,
    pub learning: Option<String>,
    pub urls: Option<Vec<String>>,
    pub location: Option<String>,
    pub work: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Clone)]
pub struct UsersService {
    users: UserRepo,
    assets: Assets,
    mails: Mails,
}

impl UsersService {
    pub fn new(users: UserRepo, assets: Assets, mails: Mails) -> Self {
        Self {
            users,
            assets,
            mails,
        }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn create(&self, input: NewUser) -> Result<User, AppError> {
        let hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(anyhow!(e)))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            username: input.username,
            email: input.email,
            password: Some(hash),
            role: Role::User,
            blocked: false,
            avatar: None,
            provider: Provider::Local,
            google_id: None,
            github_id: None,
            confirm_token: None,
            confirmed: false,
            destroy_token: None,
            reset_token: None,
            reset_expires: None,
            saved_blogs: Default::default(),
            following_tags: Default::default(),
            hidden_tags: Default::default(),
            profile: Profile::default(),
            created_at: now,
            updated_at: now,
        };

        if !self.users.insert(user.clone()).await? {
            return Err(AppError::Conflict(format!(
                "User with this {} email already exists",
                user.email
            )));
        }

        Ok(user)
    }

    pub async fn find(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.find_all().await?)
    }

    pub async fn find_one(&self, table: &str, value: &str) -> Result<User, AppError> {
        let field = UserField::parse(table)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown field: {}", table)))?;

        self.users
            .find_by_field(field, value)
            .await
            .not_found_as(|| format!("User with value: {} not found", value))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find(id)
            .await
            .not_found_as(|| format!("User with id: {} not found", id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_email(email).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        self.users
            .find_by_field(UserField::Username, username)
            .await
            .not_found_as(|| format!("User with username: {} not found", username))
    }

    #[tracing::instrument(skip(self))]
    pub async fn block(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .set_blocked(id, true)
            .await
            .not_found_as(|| format!("User id: {} not found", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn unblock(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .set_blocked(id, false)
            .await
            .not_found_as(|| format!("User id: {} not found", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_role(&self, id: Uuid, role: &str) -> Result<User, AppError> {
        let role = match role {
            "user" => Role::User,
            "admin" => Role::Admin,
            other => return Err(AppError::BadRequest(format!("Invalid role: {}", other))),
        };

        self.users
            .set_role(id, role)
            .await
            .not_found_as(|| format!("User id: {} not found", id))
    }

    #[tracing::instrument(skip(self, old_password, password, confirm_password))]
    pub async fn update_password(
        &self,
        id: Uuid,
        old_password: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AppError> {
        let user = self
            .users
            .find(id)
            .await
            .not_found_as(|| format!("User id: {} not found", id))?;

        let hash = user
            .password
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Old password is incorrect".to_owned()))?;

        let check = bcrypt::verify(old_password, hash).map_err(|e| AppError::Internal(anyhow!(e)))?;
        if !check {
            return Err(AppError::BadRequest("Old password is incorrect".to_owned()));
        }
        if password != confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".to_owned()));
        }

        let new_hash =
            bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AppError::Internal(anyhow!(e)))?;

        Ok(self.users.set_password(id, &new_hash).await?)
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateUser) -> Result<User, AppError> {
        let user = self
            .users
            .find(id)
            .await
            .not_found_as(|| format!("User id: {} not found", id))?;

        let avatar = match input.avatar {
            Some(file) => Some(
                self.assets
                    .replace(
                        user.avatar.as_ref().map(|a| a.public_id.as_str()),
                        &file,
                        AssetKind::Avatar,
                    )
                    .await
                    .map_err(AppError::Internal)?,
            ),
            None => None,
        };

        let mutation = UserMutation {
            name: input.name,
            username: input.username,
            bio: input.bio,
            brand_color: input.brand_color,
            education: input.education,
            projects: input.projects,
            skills: input.skills,
            learning: input.learning,
            urls: input.urls,
            location: input.location,
            work: input.work,
            avatar,
        };

        Ok(self.users.update(id, mutation).await?)
    }

    /// Step one of account deletion: stamp a destroy token and mail the
    /// confirmation link.
    #[tracing::instrument(skip(self))]
    pub async fn request_delete(&self, id: Uuid) -> Result<(), AppError> {
        let user = self
            .users
            .find(id)
            .await
            .not_found_as(|| format!("User id: {} not found", id))?;

        let token = generate_token();
        self.users.set_destroy_token(user.id, &token).await?;

        self.mails
            .send_destroy_account(&user.username, &user.email, &token)
            .await;

        Ok(())
    }

    /// Step two: the mailed token comes back, the avatar is destroyed and the
    /// document is removed.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_delete(&self, token: &str, username: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_token(TokenKind::Destroy, token)
            .await
            .not_found_as(|| "User token not found".to_owned())?;

        self.users
            .find_by_field(UserField::Username, username)
            .await
            .not_found_as(|| "User name not found".to_owned())?;

        if let Some(avatar) = &user.avatar {
            self.assets
                .destroy(&avatar.public_id)
                .await
                .map_err(AppError::Internal)?;
        }

        Ok(self.users.delete(user.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::providers::assets::testing::RecordingAssetStore;
    use crate::providers::mail::testing::RecordingMailer;
    use crate::repositories::mock::InMemoryRepository;
    use crate::repositories::UserRepository;

    fn service() -> (
        UsersService,
        Arc<InMemoryRepository<User>>,
        Arc<RecordingAssetStore>,
        Arc<RecordingMailer>,
    ) {
        let users = Arc::new(InMemoryRepository::<User>::new());
        let assets = Arc::new(RecordingAssetStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mails = Mails::new(mailer.clone(), "http://localhost:3000".to_owned());

        (
            UsersService::new(users.clone(), assets.clone(), mails),
            users,
            assets,
            mailer,
        )
    }

    fn new_user() -> NewUser {
        NewUser {
            name: "Ada Lovelace".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "correct horse".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_hashes_the_password() {
        let (svc, _, _, _) = service();

        let user = svc.create(new_user()).await.unwrap();

        let hash = user.password.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(bcrypt::verify("correct horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn create_duplicate_email_conflicts() {
        let (svc, users, _, _) = service();

        svc.create(new_user()).await.unwrap();
        let res = svc.create(new_user()).await;

        assert!(matches!(res, Err(AppError::Conflict(_))));
        assert_eq!(users.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn block_and_unblock_round_trip() {
        let (svc, _, _, _) = service();
        let user = svc.create(new_user()).await.unwrap();

        assert!(svc.block(user.id).await.unwrap().blocked);
        assert!(!svc.unblock(user.id).await.unwrap().blocked);
    }

    #[tokio::test]
    async fn update_role_rejects_unknown_roles() {
        let (svc, _, _, _) = service();
        let user = svc.create(new_user()).await.unwrap();

        assert_eq!(svc.update_role(user.id, "admin").await.unwrap().role, Role::Admin);

        let res = svc.update_role(user.id, "superuser").await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn update_password_checks_old_and_confirmation() {
        let (svc, _, _, _) = service();
        let user = svc.create(new_user()).await.unwrap();

        let wrong_old = svc.update_password(user.id, "nope", "next", "next").await;
        assert!(matches!(wrong_old, Err(AppError::BadRequest(_))));

        let mismatch = svc
            .update_password(user.id, "correct horse", "next", "other")
            .await;
        assert!(matches!(mismatch, Err(AppError::BadRequest(_))));

        let updated = svc
            .update_password(user.id, "correct horse", "next", "next")
            .await
            .unwrap();
        assert!(bcrypt::verify("next", updated.password.as_deref().unwrap()).unwrap());
    }

    #[tokio::test]
    async fn update_with_avatar_routes_through_the_asset_store() {
        let (svc, _, assets, _) = service();
        let user = svc.create(new_user()).await.unwrap();

        let updated = svc
            .update(
                user.id,
                UpdateUser {
                    bio: Some("analyst".to_owned()),
                    avatar: Some("data:image/png;base64,xyz".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.profile.bio.as_deref(), Some("analyst"));
        assert!(updated.avatar.is_some());
        assert_eq!(assets.uploads.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_flow_requires_the_mailed_token() {
        let (svc, users, _, mailer) = service();
        let user = svc.create(new_user()).await.unwrap();

        svc.request_delete(user.id).await.unwrap();
        assert_eq!(mailer.sent.lock().await.len(), 1);

        let unknown = svc.confirm_delete("bogus", "ada").await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
        assert_eq!(users.find_all().await.unwrap().len(), 1);

        let stored = users.find(user.id).await.unwrap();
        let token = stored.destroy_token.unwrap();

        let deleted = svc.confirm_delete(&token, "ada").await.unwrap();
        assert_eq!(deleted.id, user.id);
        assert_eq!(users.find_all().await.unwrap().len(), 0);
    }
}
