use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference into the hosted asset service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Local,
    Google,
    Github,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash. Absent until an OAuth-created account sets one.
    pub password: Option<String>,
    pub role: Role,
    pub blocked: bool,
    pub avatar: Option<Asset>,
    pub provider: Provider,
    pub google_id: Option<String>,
    pub github_id: Option<String>,
    pub confirm_token: Option<String>,
    pub confirmed: bool,
    pub destroy_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_expires: Option<DateTime<Utc>>,
    pub saved_blogs: HashSet<Uuid>,
    pub following_tags: HashSet<Uuid>,
    pub hidden_tags: HashSet<Uuid>,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-form profile fields, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub bio: Option<String>,
    pub brand_color: Option<String>,
    pub education: Option<String>,
    pub projects: Option<String>,
    pub skills: Option<String>,
    pub learning: Option<String>,
    pub urls: Vec<String>,
    pub location: Option<String>,
    pub work: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub slug: String,
    pub category: String,
    /// Tag titles, not tag ids.
    pub tags: Vec<String>,
    pub image: Option<Asset>,
    pub author: Uuid,
    pub likes: HashSet<Uuid>,
    pub dislikes: HashSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub slug: String,
    pub category: String,
    pub tags: Vec<String>,
    pub video: Option<Asset>,
    pub author: Uuid,
    pub likes: HashSet<Uuid>,
    pub dislikes: HashSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub color: String,
    pub image: Option<Asset>,
    /// Denormalized counter, bumped on blog/media creation.
    pub posts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub const DEFAULT_COLOR: &'static str = "#222222";

    /// Bare tag as created implicitly when media names an unknown tag title.
    pub fn with_title(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            color: Self::DEFAULT_COLOR.to_owned(),
            image: None,
            posts: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
