use std::collections::HashSet;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use uuid::Uuid;

use super::{
    BlogRepository, MediaRepository, Page, PostField, PostMutation, RepositoryError, Result,
    TagField, TagMutation, TagRepository, TokenKind, UserField, UserMutation, UserRepository,
};
use crate::entities::{Asset, Blog, Media, Provider, Role, Tag, User};

mod models;
mod type_convert;

pub(crate) use models::{
    MongoAssetModel, MongoBlogModel, MongoMediaModel, MongoProfileModel, MongoTagModel,
    MongoUserModel,
};

pub struct MongoUserRepository {
    coll: Collection<MongoUserModel>,
}

impl MongoUserRepository {
    pub async fn new_with(db: &Database) -> ::anyhow::Result<Self> {
        db.run_command(
            doc! {
                "createIndexes": "users",
                "indexes": [{
                    "name": "unique_id",
                    "key": { "id": 1 },
                    "unique": true
                }, {
                    "name": "unique_email",
                    "key": { "email": 1 },
                    "unique": true
                }],
            },
            None,
        )
        .await
        .map_err(::anyhow::Error::new)?;

        Ok(Self {
            coll: db.collection("users"),
        })
    }
}

pub struct MongoBlogRepository {
    coll: Collection<MongoBlogModel>,
}

impl MongoBlogRepository {
    pub async fn new_with(db: &Database) -> ::anyhow::Result<Self> {
        db.run_command(
            doc! {
                "createIndexes": "blogs",
                "indexes": [{
                    "name": "unique_id",
                    "key": { "id": 1 },
                    "unique": true
                }],
            },
            None,
        )
        .await
        .map_err(::anyhow::Error::new)?;

        Ok(Self {
            coll: db.collection("blogs"),
        })
    }
}

pub struct MongoMediaRepository {
    coll: Collection<MongoMediaModel>,
}

impl MongoMediaRepository {
    pub async fn new_with(db: &Database) -> ::anyhow::Result<Self> {
        db.run_command(
            doc! {
                "createIndexes": "media",
                "indexes": [{
                    "name": "unique_id",
                    "key": { "id": 1 },
                    "unique": true
                }],
            },
            None,
        )
        .await
        .map_err(::anyhow::Error::new)?;

        Ok(Self {
            coll: db.collection("media"),
        })
    }
}

pub struct MongoTagRepository {
    coll: Collection<MongoTagModel>,
}

impl MongoTagRepository {
    pub async fn new_with(db: &Database) -> ::anyhow::Result<Self> {
        db.run_command(
            doc! {
                "createIndexes": "tags",
                "indexes": [{
                    "name": "unique_id",
                    "key": { "id": 1 },
                    "unique": true
                }, {
                    "name": "unique_title",
                    "key": { "title": 1 },
                    "unique": true
                }],
            },
            None,
        )
        .await
        .map_err(::anyhow::Error::new)?;

        Ok(Self {
            coll: db.collection("tags"),
        })
    }
}

/// `findOneAndUpdate` options returning the post-update document.
fn after() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

fn id_filter(id: Uuid) -> Document {
    doc! { "id": id.to_string() }
}

fn field_eq(field: &str, value: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(field, value);
    filter
}

fn set_with_stamp(mut mutation: Document) -> Document {
    mutation.insert("updated_at", Utc::now().to_rfc3339());
    doc! { "$set": mutation }
}

fn regex_any(fields: &[&str], query: &str) -> Document {
    let alts = fields
        .iter()
        .map(|f| {
            let mut alt = Document::new();
            alt.insert(*f, doc! { "$regex": query, "$options": "i" });
            alt
        })
        .collect::<Vec<_>>();

    doc! { "$or": alts }
}

fn provider_str(provider: Provider) -> &'static str {
    match provider {
        Provider::Local => "local",
        Provider::Google => "google",
        Provider::Github => "github",
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Admin => "admin",
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: User) -> Result<bool> {
        let model: MongoUserModel = user.into();

        self.coll.insert_one(model, None).await.unique_check()
    }

    async fn find(&self, id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let res = self
            .coll
            .find(doc! {}, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn find_by_field(&self, field: UserField, value: &str) -> Result<User> {
        let user: User = self
            .coll
            .find_one(field_eq(field.as_str(), value), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .coll
            .find_one(doc! { "email": email }, None)
            .await
            .cvt()?
            .map(|m| m.into());

        Ok(user)
    }

    async fn find_by_token(&self, kind: TokenKind, token: &str) -> Result<User> {
        let field = match kind {
            TokenKind::Confirm => "confirm_token",
            TokenKind::Destroy => "destroy_token",
            TokenKind::Reset => "reset_token",
        };

        let user: User = self
            .coll
            .find_one(field_eq(field, token), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn find_social(
        &self,
        provider: Provider,
        provider_id: &str,
        email: &str,
    ) -> Result<Option<User>> {
        let id_field = match provider {
            Provider::Google => "google_id",
            Provider::Github => "github_id",
            Provider::Local => "email",
        };

        let user = self
            .coll
            .find_one(
                doc! { "$or": [ field_eq(id_field, provider_id), doc! { "email": email } ] },
                None,
            )
            .await
            .cvt()?
            .map(|m| m.into());

        Ok(user)
    }

    async fn update(&self, id: Uuid, mutation: UserMutation) -> Result<User> {
        let mutation_doc: Document = mutation.into();

        let user: User = self
            .coll
            .find_one_and_update(id_filter(id), set_with_stamp(mutation_doc), after())
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! { "blocked": blocked }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! { "role": role_str(role) }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn set_password(&self, id: Uuid, hash: &str) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! { "password": hash }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn confirm_account(&self, id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! { "confirmed": true, "confirm_token": Bson::Null }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn set_destroy_token(&self, id: Uuid, token: &str) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! { "destroy_token": token }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! {
                    "reset_token": token,
                    "reset_expires": expires.to_rfc3339(),
                }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn reset_password(&self, id: Uuid, hash: &str) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                set_with_stamp(doc! {
                    "password": hash,
                    "reset_token": Bson::Null,
                    "reset_expires": Bson::Null,
                }),
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn link_provider(
        &self,
        id: Uuid,
        provider: Provider,
        provider_id: &str,
        avatar: Option<Asset>,
    ) -> Result<User> {
        let id_field = match provider {
            Provider::Google => "google_id",
            Provider::Github => "github_id",
            Provider::Local => "email",
        };

        let mut mutation = doc! { "provider": provider_str(provider) };
        mutation.insert(id_field, provider_id);
        if let Some(Asset { public_id, url }) = avatar {
            mutation.insert("avatar", doc! { "public_id": public_id, "url": url });
        }

        let user: User = self
            .coll
            .find_one_and_update(id_filter(id), set_with_stamp(mutation), after())
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn is_saved(&self, id: Uuid, blog_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "saved_blogs": { "$in": [blog_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_saved(&self, id: Uuid, blog_id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$addToSet": { "saved_blogs": blog_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn delete_saved(&self, id: Uuid, blog_id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "saved_blogs": blog_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn is_following(&self, id: Uuid, tag_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "following_tags": { "$in": [tag_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_following(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$addToSet": { "following_tags": tag_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn delete_following(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "following_tags": tag_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn is_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "hidden_tags": { "$in": [tag_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$addToSet": { "hidden_tags": tag_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn delete_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "hidden_tags": tag_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<User> {
        let user: User = self
            .coll
            .find_one_and_delete(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(user)
    }
}

#[async_trait]
impl BlogRepository for MongoBlogRepository {
    async fn insert(&self, blog: Blog) -> Result<()> {
        let model: MongoBlogModel = blog.into();

        self.coll.insert_one(model, None).await.cvt()?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn find_all(&self, page: &Page) -> Result<Vec<Blog>> {
        let options = FindOptions::builder()
            .skip(page.skip)
            .limit(page.limit)
            .sort(page.sort_doc())
            .build();

        let res = self
            .coll
            .find(doc! {}, options)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn find_by_field(&self, field: PostField, value: &str) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one(field_eq(field.as_str(), value), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Blog>> {
        let res = self
            .coll
            .find(doc! { "tags": tag }, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Blog>> {
        let res = self
            .coll
            .find(doc! { "category": category }, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn search(&self, query: &str) -> Result<Vec<Blog>> {
        let res = self
            .coll
            .find(regex_any(&["title", "slug", "category", "content"], query), None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn is_liked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "likes": { "$in": [user_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_like(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! {
                    "$addToSet": { "likes": user_id.to_string() },
                    "$pull": { "dislikes": user_id.to_string() },
                },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn delete_like(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "likes": user_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn is_disliked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "dislikes": { "$in": [user_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! {
                    "$addToSet": { "dislikes": user_id.to_string() },
                    "$pull": { "likes": user_id.to_string() },
                },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn delete_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "dislikes": user_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn update(&self, id: Uuid, mutation: PostMutation) -> Result<Blog> {
        let asset = mutation.asset.clone();
        let mut mutation_doc: Document = mutation.into();
        if let Some(Asset { public_id, url }) = asset {
            mutation_doc.insert("image", doc! { "public_id": public_id, "url": url });
        }

        let blog: Blog = self
            .coll
            .find_one_and_update(id_filter(id), set_with_stamp(mutation_doc), after())
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }

    async fn delete(&self, id: Uuid) -> Result<Blog> {
        let blog: Blog = self
            .coll
            .find_one_and_delete(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(blog)
    }
}

#[async_trait]
impl MediaRepository for MongoMediaRepository {
    async fn insert(&self, media: Media) -> Result<()> {
        let model: MongoMediaModel = media.into();

        self.coll.insert_one(model, None).await.cvt()?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn find_all(&self, page: &Page) -> Result<Vec<Media>> {
        let options = FindOptions::builder()
            .skip(page.skip)
            .limit(page.limit)
            .sort(page.sort_doc())
            .build();

        let res = self
            .coll
            .find(doc! {}, options)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn find_by_field(&self, field: PostField, value: &str) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one(field_eq(field.as_str(), value), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Media>> {
        let res = self
            .coll
            .find(doc! { "tags": tag }, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Media>> {
        let res = self
            .coll
            .find(doc! { "category": category }, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn search(&self, query: &str) -> Result<Vec<Media>> {
        let res = self
            .coll
            .find(regex_any(&["title", "slug", "category", "content"], query), None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn is_liked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "likes": { "$in": [user_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_like(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! {
                    "$addToSet": { "likes": user_id.to_string() },
                    "$pull": { "dislikes": user_id.to_string() },
                },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn delete_like(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "likes": user_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn is_disliked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let res = self
            .coll
            .count_documents(
                doc! {
                    "id": id.to_string(),
                    "dislikes": { "$in": [user_id.to_string()] }
                },
                None,
            )
            .await
            .cvt()?
            .into_bool();

        Ok(res)
    }

    async fn insert_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! {
                    "$addToSet": { "dislikes": user_id.to_string() },
                    "$pull": { "likes": user_id.to_string() },
                },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn delete_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one_and_update(
                id_filter(id),
                doc! { "$pull": { "dislikes": user_id.to_string() } },
                after(),
            )
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn update(&self, id: Uuid, mutation: PostMutation) -> Result<Media> {
        let asset = mutation.asset.clone();
        let mut mutation_doc: Document = mutation.into();
        if let Some(Asset { public_id, url }) = asset {
            mutation_doc.insert("video", doc! { "public_id": public_id, "url": url });
        }

        let media: Media = self
            .coll
            .find_one_and_update(id_filter(id), set_with_stamp(mutation_doc), after())
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }

    async fn delete(&self, id: Uuid) -> Result<Media> {
        let media: Media = self
            .coll
            .find_one_and_delete(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(media)
    }
}

#[async_trait]
impl TagRepository for MongoTagRepository {
    async fn insert(&self, tag: Tag) -> Result<bool> {
        let model: MongoTagModel = tag.into();

        self.coll.insert_one(model, None).await.unique_check()
    }

    async fn find(&self, id: Uuid) -> Result<Tag> {
        let tag: Tag = self
            .coll
            .find_one(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(tag)
    }

    async fn find_all(&self) -> Result<Vec<Tag>> {
        let res = self
            .coll
            .find(doc! {}, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn find_by_field(&self, field: TagField, value: &str) -> Result<Tag> {
        let tag: Tag = self
            .coll
            .find_one(field_eq(field.as_str(), value), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(tag)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>> {
        let tag = self
            .coll
            .find_one(doc! { "title": title }, None)
            .await
            .cvt()?
            .map(|m| m.into());

        Ok(tag)
    }

    async fn find_many(&self, ids: &HashSet<Uuid>) -> Result<Vec<Tag>> {
        let ids = ids.iter().map(|i| i.to_string()).collect::<Vec<_>>();

        let res = self
            .coll
            .find(doc! { "id": { "$in": ids } }, None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn search(&self, query: &str) -> Result<Vec<Tag>> {
        let res = self
            .coll
            .find(regex_any(&["title", "description"], query), None)
            .await
            .cvt()?
            .try_collect::<Vec<_>>()
            .await
            .cvt()?
            .drain(..)
            .map(|m| m.into())
            .collect();

        Ok(res)
    }

    async fn increment_posts(&self, title: &str) -> Result<bool> {
        let res = self
            .coll
            .update_one(
                doc! { "title": title },
                doc! { "$inc": { "posts": 1 } },
                None,
            )
            .await
            .cvt()?;

        Ok(res.matched_count.into_bool())
    }

    async fn update(&self, id: Uuid, mutation: TagMutation) -> Result<Tag> {
        let mutation_doc: Document = mutation.into();

        let tag: Tag = self
            .coll
            .find_one_and_update(id_filter(id), set_with_stamp(mutation_doc), after())
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(tag)
    }

    async fn delete(&self, id: Uuid) -> Result<Tag> {
        let tag: Tag = self
            .coll
            .find_one_and_delete(id_filter(id), None)
            .await
            .cvt()?
            .opt_cvt()?
            .into();

        Ok(tag)
    }
}

trait Convert<T> {
    fn cvt(self) -> T;
}
impl<T, E: Sync + Send + ::std::error::Error + 'static> Convert<Result<T>>
    for ::std::result::Result<T, E>
{
    fn cvt(self) -> Result<T> {
        self.map_err(|e| RepositoryError::Internal(anyhow!(e)))
    }
}

trait OptToErr<T> {
    fn opt_cvt(self) -> Result<T>;
}
impl<T> OptToErr<T> for Option<T> {
    fn opt_cvt(self) -> Result<T> {
        match self {
            Some(o) => Ok(o),
            None => Err(RepositoryError::NotFound),
        }
    }
}

trait DetectUniqueErr {
    fn unique_check(self) -> Result<bool>;
}
impl<T> DetectUniqueErr for ::mongodb::error::Result<T> {
    fn unique_check(self) -> Result<bool> {
        match match match self {
            Ok(_) => return Ok(true),
            Err(e) => (*e.kind.clone(), e),
        } {
            (
                ::mongodb::error::ErrorKind::Write(::mongodb::error::WriteFailure::WriteError(e)),
                src,
            ) => (e.code, src),
            (_, src) => return Err(RepositoryError::Internal(anyhow!(src))),
        } {
            (11000, _) => Ok(false),
            (_, src) => Err(RepositoryError::Internal(anyhow!(src))),
        }
    }
}

trait NumToBool {
    fn into_bool(self) -> bool;
}
impl<N: ::core::convert::TryInto<i8> + ::core::fmt::Debug + Copy> NumToBool for N {
    fn into_bool(self) -> bool {
        match match ::core::convert::TryInto::<i8>::try_into(self) {
            Ok(n) => n,
            Err(_) => unreachable!("expected 0 or 1, found: {:?}", self),
        } {
            0 => false,
            1 => true,
            n => unreachable!("expected 0 or 1, found: {}", n),
        }
    }
}
