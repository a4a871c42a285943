use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{Asset, Blog, Media, Provider, Role, Tag, User};

pub(crate) mod mock;
pub(crate) mod mongo;

type Result<T> = ::std::result::Result<T, RepositoryError>;

/// skip/limit window with optional multi-field sort, straight off the query
/// string.
#[derive(Debug, Clone)]
pub struct Page {
    pub skip: u64,
    pub limit: i64,
    pub sort: Vec<SortSpec>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 10,
            sort: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Closed set of user fields reachable through the single-value lookup
/// endpoint. Anything else is rejected before it gets near a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Username,
    Email,
}

impl UserField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "username" => Some(Self::Username),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Title,
    Slug,
    Category,
}

impl PostField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Self::Title),
            "slug" => Some(Self::Slug),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Slug => "slug",
            Self::Category => "category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Title,
    Color,
}

impl TagField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(Self::Title),
            "color" => Some(Self::Color),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Color => "color",
        }
    }
}

/// Which of the three one-shot user tokens to look a user up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Confirm,
    Destroy,
    Reset,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserMutation {
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
    pub avatar: Option<Asset>,
}

#[derive(Debug, Clone, Default)]
pub struct PostMutation {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_html: Option<String>,
    pub summary: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub asset: Option<Asset>,
}

#[derive(Debug, Clone, Default)]
pub struct TagMutation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image: Option<Asset>,
}

#[async_trait]
pub(crate) trait UserRepository {
    /// `false` when the unique email index rejected the insert.
    async fn insert(&self, item: User) -> Result<bool>;

    async fn find(&self, id: Uuid) -> Result<User>;
    async fn find_all(&self) -> Result<Vec<User>>;
    async fn find_by_field(&self, field: UserField, value: &str) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_token(&self, kind: TokenKind, token: &str) -> Result<User>;
    /// OAuth upsert lookup: matches the provider id or the email.
    async fn find_social(&self, provider: Provider, provider_id: &str, email: &str)
        -> Result<Option<User>>;

    async fn update(&self, id: Uuid, mutation: UserMutation) -> Result<User>;
    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<User>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<User>;
    async fn set_password(&self, id: Uuid, hash: &str) -> Result<User>;
    /// Marks the account confirmed and clears the confirm token.
    async fn confirm_account(&self, id: Uuid) -> Result<User>;
    async fn set_destroy_token(&self, id: Uuid, token: &str) -> Result<User>;
    async fn set_reset_token(&self, id: Uuid, token: &str, expires: DateTime<Utc>)
        -> Result<User>;
    /// Stores the new hash and clears the reset token and its expiry.
    async fn reset_password(&self, id: Uuid, hash: &str) -> Result<User>;
    async fn link_provider(
        &self,
        id: Uuid,
        provider: Provider,
        provider_id: &str,
        avatar: Option<Asset>,
    ) -> Result<User>;

    async fn is_saved(&self, id: Uuid, blog_id: Uuid) -> Result<bool>;
    async fn insert_saved(&self, id: Uuid, blog_id: Uuid) -> Result<User>;
    async fn delete_saved(&self, id: Uuid, blog_id: Uuid) -> Result<User>;

    async fn is_following(&self, id: Uuid, tag_id: Uuid) -> Result<bool>;
    async fn insert_following(&self, id: Uuid, tag_id: Uuid) -> Result<User>;
    async fn delete_following(&self, id: Uuid, tag_id: Uuid) -> Result<User>;

    async fn is_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<bool>;
    async fn insert_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<User>;
    async fn delete_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<User>;

    async fn delete(&self, id: Uuid) -> Result<User>;
}

#[async_trait]
pub(crate) trait BlogRepository {
    async fn insert(&self, item: Blog) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<Blog>;
    async fn find_all(&self, page: &Page) -> Result<Vec<Blog>>;
    async fn find_by_field(&self, field: PostField, value: &str) -> Result<Blog>;
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Blog>>;
    async fn find_by_category(&self, category: &str) -> Result<Vec<Blog>>;
    /// Case-insensitive regex over title/slug/category/content.
    async fn search(&self, query: &str) -> Result<Vec<Blog>>;

    async fn is_liked(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    /// Adds the like and pulls any dislike by the same user, one update.
    async fn insert_like(&self, id: Uuid, user_id: Uuid) -> Result<Blog>;
    async fn delete_like(&self, id: Uuid, user_id: Uuid) -> Result<Blog>;

    async fn is_disliked(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn insert_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Blog>;
    async fn delete_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Blog>;

    async fn update(&self, id: Uuid, mutation: PostMutation) -> Result<Blog>;
    async fn delete(&self, id: Uuid) -> Result<Blog>;
}

#[async_trait]
pub(crate) trait MediaRepository {
    async fn insert(&self, item: Media) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<Media>;
    async fn find_all(&self, page: &Page) -> Result<Vec<Media>>;
    async fn find_by_field(&self, field: PostField, value: &str) -> Result<Media>;
    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Media>>;
    async fn find_by_category(&self, category: &str) -> Result<Vec<Media>>;
    async fn search(&self, query: &str) -> Result<Vec<Media>>;

    async fn is_liked(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn insert_like(&self, id: Uuid, user_id: Uuid) -> Result<Media>;
    async fn delete_like(&self, id: Uuid, user_id: Uuid) -> Result<Media>;

    async fn is_disliked(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn insert_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Media>;
    async fn delete_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Media>;

    async fn update(&self, id: Uuid, mutation: PostMutation) -> Result<Media>;
    async fn delete(&self, id: Uuid) -> Result<Media>;
}

#[async_trait]
pub(crate) trait TagRepository {
    /// `false` when the unique title index rejected the insert.
    async fn insert(&self, item: Tag) -> Result<bool>;

    async fn find(&self, id: Uuid) -> Result<Tag>;
    async fn find_all(&self) -> Result<Vec<Tag>>;
    async fn find_by_field(&self, field: TagField, value: &str) -> Result<Tag>;
    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>>;
    /// Resolves an id set to tag documents; missing ids are skipped.
    async fn find_many(&self, ids: &HashSet<Uuid>) -> Result<Vec<Tag>>;
    /// Case-insensitive regex over title/description.
    async fn search(&self, query: &str) -> Result<Vec<Tag>>;

    /// `false` when no tag with that title exists.
    async fn increment_posts(&self, title: &str) -> Result<bool>;

    async fn update(&self, id: Uuid, mutation: TagMutation) -> Result<Tag>;
    async fn delete(&self, id: Uuid) -> Result<Tag>;
}

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    NoUnique { matched: u32 },
    Internal(anyhow::Error),
}

impl ::std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "cannot find object."),
            RepositoryError::NoUnique { matched } => write!(
                f,
                "expected unique object, found non-unique objects (matched: {})",
                matched
            ),
            RepositoryError::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl ::std::error::Error for RepositoryError {}
