use anyhow::anyhow;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::UserRepo;
use crate::entities::{Asset, Profile, Provider, Role, User};
use crate::error::{AppError, NotFoundAs};
use crate::providers::mail::Mails;
use crate::repositories::TokenKind;
use crate::tokens::{generate_token, TokenKeys};

/// Reset tokens die after this window.
const RESET_TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Verified profile as the OAuth provider hands it back.
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub provider: Provider,
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub avatar: Option<Asset>,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepo,
    mails: Mails,
    tokens: TokenKeys,
}

impl AuthService {
    pub fn new(users: UserRepo, mails: Mails, tokens: TokenKeys) -> Self {
        Self {
            users,
            mails,
            tokens,
        }
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<(User, String), AppError> {
        let conflict =
            || AppError::Conflict(format!("User with this {} email already exists", input.email));

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(conflict());
        }

        let confirm_token = generate_token();
        let hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(anyhow!(e)))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
            password: Some(hash),
            role: Role::User,
            blocked: false,
            avatar: None,
            provider: Provider::Local,
            google_id: None,
            github_id: None,
            confirm_token: Some(confirm_token.clone()),
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

        // The unique index backstops the lookup above against racing inserts.
        if !self.users.insert(user.clone()).await? {
            return Err(conflict());
        }

        self.mails
            .send_verification(&user.username, &user.email, &confirm_token)
            .await;

        let token = self.tokens.sign(&user)?;
        Ok((user, token))
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_owned()))?;

        let hash = user
            .password
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_owned()))?;

        let valid = bcrypt::verify(password, hash).map_err(|e| AppError::Internal(anyhow!(e)))?;
        if !valid {
            return Err(AppError::Unauthorized("Invalid password".to_owned()));
        }

        let token = self.tokens.sign(&user)?;
        Ok((user, token))
    }

    #[tracing::instrument(skip(self))]
    pub async fn confirm_account(&self, token: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_token(TokenKind::Confirm, token)
            .await
            .not_found_as(|| format!("User with token: {} not found", token))?;

        Ok(self.users.confirm_account(user.id).await?)
    }

    /// Upsert keyed by provider id or email. First sight creates the account
    /// without a password and mails the verification link; repeat sight only
    /// refreshes the provider linkage.
    #[tracing::instrument(skip(self, profile))]
    pub async fn social(&self, profile: SocialProfile) -> Result<(User, String), AppError> {
        let SocialProfile {
            provider,
            provider_id,
            email,
            name,
            username,
            avatar,
        } = profile;

        let existing = self.users.find_social(provider, &provider_id, &email).await?;

        if let Some(found) = existing {
            let avatar = found.avatar.clone().or(avatar);
            let user = self
                .users
                .link_provider(found.id, provider, &provider_id, avatar)
                .await?;

            let token = self.tokens.sign(&user)?;
            return Ok((user, token));
        }

        let confirm_token = generate_token();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            username,
            email,
            password: None,
            role: Role::User,
            blocked: false,
            avatar,
            provider,
            google_id: (provider == Provider::Google).then(|| provider_id.clone()),
            github_id: (provider == Provider::Github).then(|| provider_id.clone()),
            confirm_token: Some(confirm_token.clone()),
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

        self.mails
            .send_verification(&user.username, &user.email, &confirm_token)
            .await;

        let token = self.tokens.sign(&user)?;
        Ok((user, token))
    }

    /// Finishes an OAuth-created account by giving it a password.
    #[tracing::instrument(skip(self, password))]
    pub async fn set_password(&self, token: &str, password: &str) -> Result<(User, String), AppError> {
        let user = match self.users.find_by_token(TokenKind::Confirm, token).await {
            Ok(u) => u,
            Err(crate::repositories::RepositoryError::NotFound) => {
                return Err(AppError::Unauthorized("Invalid token".to_owned()))
            }
            Err(e) => return Err(e.into()),
        };

        let hash =
            bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AppError::Internal(anyhow!(e)))?;
        let user = self.users.set_password(user.id, &hash).await?;

        let token = self.tokens.sign(&user)?;
        Ok((user, token))
    }

    #[tracing::instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with email {} not found", email)))?;

        let reset_token = generate_token();
        let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        self.users
            .set_reset_token(user.id, &reset_token, expires)
            .await?;

        self.mails.send_forgot_password(&user.email, &reset_token).await;
        Ok(())
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AppError> {
        let stale = || AppError::Unauthorized("Invalid or expired token".to_owned());

        let user = match self.users.find_by_token(TokenKind::Reset, token).await {
            Ok(u) => u,
            Err(crate::repositories::RepositoryError::NotFound) => return Err(stale()),
            Err(e) => return Err(e.into()),
        };

        match user.reset_expires {
            Some(expires) if expires > Utc::now() => (),
            _ => return Err(stale()),
        }

        let hash =
            bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AppError::Internal(anyhow!(e)))?;
        self.users.reset_password(user.id, &hash).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::providers::mail::testing::RecordingMailer;
    use crate::repositories::mock::InMemoryRepository;
    use crate::repositories::UserRepository;

    fn service() -> (AuthService, Arc<InMemoryRepository<User>>, Arc<RecordingMailer>) {
        let users = Arc::new(InMemoryRepository::<User>::new());
        let mailer = Arc::new(RecordingMailer::default());
        let mails = Mails::new(mailer.clone(), "http://localhost:3000".to_owned());
        let tokens = TokenKeys::new(b"test-secret", Duration::hours(1));

        (
            AuthService::new(users.clone(), mails, tokens),
            users,
            mailer,
        )
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            name: "Ada Lovelace".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "correct horse".to_owned(),
        }
    }

    #[tokio::test]
    async fn register_issues_token_and_sends_one_verification_mail() {
        let (auth, users, mailer) = service();

        let (user, token) = auth.register(register_input()).await.unwrap();

        assert!(!token.is_empty());
        assert!(user.confirm_token.is_some());
        assert!(!user.confirmed);
        assert_eq!(users.find_all().await.unwrap().len(), 1);
        assert_eq!(mailer.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn register_twice_with_same_email_conflicts_without_second_document() {
        let (auth, users, _) = service();

        auth.register(register_input()).await.unwrap();
        let second = auth.register(register_input()).await;

        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(users.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_verifies_the_stored_hash() {
        let (auth, _, _) = service();
        auth.register(register_input()).await.unwrap();

        assert!(auth.login("ada@example.com", "correct horse").await.is_ok());

        let wrong = auth.login("ada@example.com", "wrong").await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

        let unknown = auth.login("nobody@example.com", "correct horse").await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn confirm_with_unknown_token_is_not_found_and_mutates_nothing() {
        let (auth, users, _) = service();
        let (registered, _) = auth.register(register_input()).await.unwrap();

        let res = auth.confirm_account("no-such-token").await;
        assert!(matches!(res, Err(AppError::NotFound(_))));

        let stored = users.find(registered.id).await.unwrap();
        assert!(!stored.confirmed);
        assert_eq!(stored.confirm_token, registered.confirm_token);
    }

    #[tokio::test]
    async fn confirm_sets_flag_and_clears_token() {
        let (auth, _, _) = service();
        let (registered, _) = auth.register(register_input()).await.unwrap();

        let confirmed = auth
            .confirm_account(registered.confirm_token.as_deref().unwrap())
            .await
            .unwrap();

        assert!(confirmed.confirmed);
        assert!(confirmed.confirm_token.is_none());
    }

    fn social_profile() -> SocialProfile {
        SocialProfile {
            provider: Provider::Github,
            provider_id: "gh-4242".to_owned(),
            email: "grace@example.com".to_owned(),
            name: "Grace Hopper".to_owned(),
            username: "grace".to_owned(),
            avatar: Some(Asset {
                public_id: "avatars/grace".to_owned(),
                url: "https://example.com/grace.png".to_owned(),
            }),
        }
    }

    #[tokio::test]
    async fn social_first_sight_creates_one_user_and_sends_one_mail() {
        let (auth, users, mailer) = service();

        let (user, token) = auth.social(social_profile()).await.unwrap();

        assert!(!token.is_empty());
        assert!(user.password.is_none());
        assert!(user.confirm_token.is_some());
        assert_eq!(user.github_id.as_deref(), Some("gh-4242"));
        assert_eq!(users.find_all().await.unwrap().len(), 1);
        assert_eq!(mailer.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn social_repeat_sight_updates_linkage_without_a_new_user_or_mail() {
        let (auth, users, mailer) = service();

        auth.social(social_profile()).await.unwrap();
        let (user, _) = auth.social(social_profile()).await.unwrap();

        assert_eq!(user.provider, Provider::Github);
        assert_eq!(users.find_all().await.unwrap().len(), 1);
        assert_eq!(mailer.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn social_matches_existing_local_account_by_email() {
        let (auth, users, _) = service();
        let (local, _) = auth.register(register_input()).await.unwrap();

        let mut profile = social_profile();
        profile.email = local.email.clone();

        let (linked, _) = auth.social(profile).await.unwrap();

        assert_eq!(linked.id, local.id);
        assert_eq!(linked.github_id.as_deref(), Some("gh-4242"));
        assert_eq!(users.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn forgot_then_reset_rotates_the_password() {
        let (auth, users, mailer) = service();
        let (user, _) = auth.register(register_input()).await.unwrap();

        auth.forgot_password(&user.email).await.unwrap();
        assert_eq!(mailer.sent.lock().await.len(), 2);

        let stored = users.find(user.id).await.unwrap();
        let reset_token = stored.reset_token.unwrap();
        assert!(stored.reset_expires.unwrap() > Utc::now());

        auth.reset_password(&reset_token, "new password").await.unwrap();

        assert!(auth.login(&user.email, "new password").await.is_ok());

        let cleared = users.find(user.id).await.unwrap();
        assert!(cleared.reset_token.is_none());
        assert!(cleared.reset_expires.is_none());
    }

    #[tokio::test]
    async fn reset_rejects_expired_tokens() {
        let (auth, users, _) = service();
        let (user, _) = auth.register(register_input()).await.unwrap();

        users
            .set_reset_token(user.id, "stale", Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        let res = auth.reset_password("stale", "new password").await;
        assert!(matches!(res, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn reset_rejects_unknown_tokens() {
        let (auth, _, _) = service();

        let res = auth.reset_password("missing", "new password").await;
        assert!(matches!(res, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn set_password_finishes_an_oauth_account() {
        let (auth, _, _) = service();
        let (user, _) = auth.social(social_profile()).await.unwrap();

        let (updated, token) = auth
            .set_password(user.confirm_token.as_deref().unwrap(), "first password")
            .await
            .unwrap();

        assert!(!token.is_empty());
        assert!(updated.password.is_some());
        assert!(auth.login(&user.email, "first password").await.is_ok());
    }
}
