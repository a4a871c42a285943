use std::collections::HashSet;

use crate::entities::{Provider, Role};

/// Stored document shapes. Ids and id sets are kept as strings; the entity
/// conversions in `type_convert` own the parsing.

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoAssetModel {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoProfileModel {
    pub bio: Option<String>,
    pub brand_color: Option<String>,
    pub education: Option<String>,
    pub projects: Option<String>,
    pub skills: Option<String>,
    pub learning: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    pub location: Option<String>,
    pub work: Option<String>,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoUserModel {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub blocked: bool,
    pub avatar: Option<MongoAssetModel>,
    pub provider: Provider,
    pub google_id: Option<String>,
    pub github_id: Option<String>,
    pub confirm_token: Option<String>,
    pub confirmed: bool,
    pub destroy_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_expires: Option<::chrono::DateTime<::chrono::Utc>>,
    #[serde(default)]
    pub saved_blogs: HashSet<String>,
    #[serde(default)]
    pub following_tags: HashSet<String>,
    #[serde(default)]
    pub hidden_tags: HashSet<String>,
    #[serde(default)]
    pub profile: MongoProfileModel,
    pub created_at: ::chrono::DateTime<::chrono::Utc>,
    pub updated_at: ::chrono::DateTime<::chrono::Utc>,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoBlogModel {
    pub id: String,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub slug: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<MongoAssetModel>,
    pub author: String,
    #[serde(default)]
    pub likes: HashSet<String>,
    #[serde(default)]
    pub dislikes: HashSet<String>,
    pub created_at: ::chrono::DateTime<::chrono::Utc>,
    pub updated_at: ::chrono::DateTime<::chrono::Utc>,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoMediaModel {
    pub id: String,
    pub title: String,
    pub content: String,
    pub content_html: String,
    pub summary: String,
    pub slug: String,
    pub category: String,
    pub tags: Vec<String>,
    pub video: Option<MongoAssetModel>,
    pub author: String,
    #[serde(default)]
    pub likes: HashSet<String>,
    #[serde(default)]
    pub dislikes: HashSet<String>,
    pub created_at: ::chrono::DateTime<::chrono::Utc>,
    pub updated_at: ::chrono::DateTime<::chrono::Utc>,
}

#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoTagModel {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub color: String,
    pub image: Option<MongoAssetModel>,
    pub posts: i64,
    pub created_at: ::chrono::DateTime<::chrono::Utc>,
    pub updated_at: ::chrono::DateTime<::chrono::Utc>,
}
