use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    BlogRepository, MediaRepository, Order, Page, PostField, PostMutation, RepositoryError,
    Result, SortSpec, TagField, TagMutation, TagRepository, TokenKind, UserField, UserMutation,
    UserRepository,
};
use crate::entities::{Asset, Blog, Media, Provider, Role, Tag, User};

/// Mutex-over-Vec stand-in for a collection. One instance per entity type,
/// same observable behavior as the Mongo repositories.
pub struct InMemoryRepository<T>(Mutex<Vec<T>>);

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self(Mutex::new(vec![]))
    }
}
impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn find_ref<T, P>(v: &[T], predicate: P) -> Result<&T>
where
    P: FnMut(&&T) -> bool,
{
    let mut res = v.iter().filter(predicate).collect::<Vec<_>>();

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

#[inline]
fn find_mut<T, P>(v: &mut Vec<T>, predicate: P) -> Result<&mut T>
where
    P: FnMut(&&mut T) -> bool,
{
    let mut res = v.iter_mut().filter(predicate).collect::<Vec<_>>();

    match res.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(res.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

fn case_insensitive(query: &str) -> Result<regex::Regex> {
    RegexBuilder::new(query)
        .case_insensitive(true)
        .build()
        .map_err(|e| RepositoryError::Internal(::anyhow::anyhow!(e)))
}

fn window<T: Clone>(items: Vec<&T>, page: &Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.skip as usize)
        .take(page.limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn insert(&self, item: User) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |u| u.email == item.email || u.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn find(&self, id: Uuid) -> Result<User> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |u| u.id == id)?.clone())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.0.lock().await.iter().cloned().collect())
    }

    async fn find_by_field(&self, field: UserField, value: &str) -> Result<User> {
        let guard = self.0.lock().await;

        let matches = |u: &&User| match field {
            UserField::Name => u.name == value,
            UserField::Username => u.username == value,
            UserField::Email => u.email == value,
        };

        Ok(find_ref(&guard, matches)?.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let guard = self.0.lock().await;

        match find_ref(&guard, |u| u.email == email) {
            Ok(u) => Ok(Some(u.clone())),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_by_token(&self, kind: TokenKind, token: &str) -> Result<User> {
        let guard = self.0.lock().await;

        let matches = |u: &&User| {
            let field = match kind {
                TokenKind::Confirm => &u.confirm_token,
                TokenKind::Destroy => &u.destroy_token,
                TokenKind::Reset => &u.reset_token,
            };
            field.as_deref() == Some(token)
        };

        Ok(find_ref(&guard, matches)?.clone())
    }

    async fn find_social(
        &self,
        provider: Provider,
        provider_id: &str,
        email: &str,
    ) -> Result<Option<User>> {
        let guard = self.0.lock().await;

        let matched = guard.iter().find(|u| {
            let linked = match provider {
                Provider::Google => u.google_id.as_deref() == Some(provider_id),
                Provider::Github => u.github_id.as_deref() == Some(provider_id),
                Provider::Local => false,
            };
            linked || u.email == email
        });

        Ok(matched.cloned())
    }

    async fn update(&self, id: Uuid, mutation: UserMutation) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        let UserMutation {
            name,
            username,
            bio,
            brand_color,
            education,
            projects,
            skills,
            learning,
            urls,
            location,
            work,
            avatar,
        } = mutation;

        if let Some(val) = name {
            item.name = val;
        }
        if let Some(val) = username {
            item.username = val;
        }
        if let Some(val) = bio {
            item.profile.bio = Some(val);
        }
        if let Some(val) = brand_color {
            item.profile.brand_color = Some(val);
        }
        if let Some(val) = education {
            item.profile.education = Some(val);
        }
        if let Some(val) = projects {
            item.profile.projects = Some(val);
        }
        if let Some(val) = skills {
            item.profile.skills = Some(val);
        }
        if let Some(val) = learning {
            item.profile.learning = Some(val);
        }
        if let Some(val) = urls {
            item.profile.urls = val;
        }
        if let Some(val) = location {
            item.profile.location = Some(val);
        }
        if let Some(val) = work {
            item.profile.work = Some(val);
        }
        if let Some(val) = avatar {
            item.avatar = Some(val);
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.blocked = blocked;
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.role = role;
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn set_password(&self, id: Uuid, hash: &str) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.password = Some(hash.to_owned());
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn confirm_account(&self, id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.confirmed = true;
        item.confirm_token = None;
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn set_destroy_token(&self, id: Uuid, token: &str) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.destroy_token = Some(token.to_owned());
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.reset_token = Some(token.to_owned());
        item.reset_expires = Some(expires);
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn reset_password(&self, id: Uuid, hash: &str) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.password = Some(hash.to_owned());
        item.reset_token = None;
        item.reset_expires = None;
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn link_provider(
        &self,
        id: Uuid,
        provider: Provider,
        provider_id: &str,
        avatar: Option<Asset>,
    ) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.provider = provider;
        match provider {
            Provider::Google => item.google_id = Some(provider_id.to_owned()),
            Provider::Github => item.github_id = Some(provider_id.to_owned()),
            Provider::Local => (),
        }
        if let Some(val) = avatar {
            item.avatar = Some(val);
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn is_saved(&self, id: Uuid, blog_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |u| u.id == id)?.saved_blogs.contains(&blog_id))
    }

    async fn insert_saved(&self, id: Uuid, blog_id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.saved_blogs.insert(blog_id);
        Ok(item.clone())
    }

    async fn delete_saved(&self, id: Uuid, blog_id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.saved_blogs.remove(&blog_id);
        Ok(item.clone())
    }

    async fn is_following(&self, id: Uuid, tag_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |u| u.id == id)?.following_tags.contains(&tag_id))
    }

    async fn insert_following(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.following_tags.insert(tag_id);
        Ok(item.clone())
    }

    async fn delete_following(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.following_tags.remove(&tag_id);
        Ok(item.clone())
    }

    async fn is_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |u| u.id == id)?.hidden_tags.contains(&tag_id))
    }

    async fn insert_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.hidden_tags.insert(tag_id);
        Ok(item.clone())
    }

    async fn delete_hidden(&self, id: Uuid, tag_id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |u| u.id == id)?;

        item.hidden_tags.remove(&tag_id);
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<User> {
        let mut guard = self.0.lock().await;
        let mut res = guard
            .iter()
            .enumerate()
            .filter(|(_, u)| u.id == id)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let index = match res.len() {
            0 => return Err(RepositoryError::NotFound),
            1 => res.remove(0),
            i => return Err(RepositoryError::NoUnique { matched: i as u32 }),
        };

        Ok(guard.remove(index))
    }
}

fn sort_in_place<T>(items: &mut [&T], sort: &[SortSpec], key: impl Fn(&T, &str) -> String) {
    for spec in sort.iter().rev() {
        items.sort_by(|a, b| {
            let ord = key(a, &spec.field).cmp(&key(b, &spec.field));
            match spec.order {
                Order::Asc => ord,
                Order::Desc => ord.reverse(),
            }
        });
    }
}

#[async_trait]
impl BlogRepository for InMemoryRepository<Blog> {
    async fn insert(&self, item: Blog) -> Result<()> {
        self.0.lock().await.push(item);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Blog> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |b| b.id == id)?.clone())
    }

    async fn find_all(&self, page: &Page) -> Result<Vec<Blog>> {
        let guard = self.0.lock().await;
        let mut items = guard.iter().collect::<Vec<_>>();

        sort_in_place(&mut items, &page.sort, |b, field| match field {
            "title" => b.title.clone(),
            "created_at" => b.created_at.to_rfc3339(),
            _ => String::new(),
        });

        Ok(window(items, page))
    }

    async fn find_by_field(&self, field: PostField, value: &str) -> Result<Blog> {
        let guard = self.0.lock().await;

        let matches = |b: &&Blog| match field {
            PostField::Title => b.title == value,
            PostField::Slug => b.slug == value,
            PostField::Category => b.category == value,
        };

        Ok(find_ref(&guard, matches)?.clone())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Blog>> {
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|b| b.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Blog>> {
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|b| b.category == category)
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Blog>> {
        let re = case_insensitive(query)?;
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|b| {
                re.is_match(&b.title)
                    || re.is_match(&b.slug)
                    || re.is_match(&b.category)
                    || re.is_match(&b.content)
            })
            .cloned()
            .collect())
    }

    async fn is_liked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |b| b.id == id)?.likes.contains(&user_id))
    }

    async fn insert_like(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |b| b.id == id)?;

        item.likes.insert(user_id);
        item.dislikes.remove(&user_id);
        Ok(item.clone())
    }

    async fn delete_like(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |b| b.id == id)?;

        item.likes.remove(&user_id);
        Ok(item.clone())
    }

    async fn is_disliked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |b| b.id == id)?.dislikes.contains(&user_id))
    }

    async fn insert_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |b| b.id == id)?;

        item.dislikes.insert(user_id);
        item.likes.remove(&user_id);
        Ok(item.clone())
    }

    async fn delete_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Blog> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |b| b.id == id)?;

        item.dislikes.remove(&user_id);
        Ok(item.clone())
    }

    async fn update(&self, id: Uuid, mutation: PostMutation) -> Result<Blog> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |b| b.id == id)?;

        let PostMutation {
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            asset,
        } = mutation;

        if let Some(val) = title {
            item.title = val;
        }
        if let Some(val) = content {
            item.content = val;
        }
        if let Some(val) = content_html {
            item.content_html = val;
        }
        if let Some(val) = summary {
            item.summary = val;
        }
        if let Some(val) = slug {
            item.slug = val;
        }
        if let Some(val) = category {
            item.category = val;
        }
        if let Some(val) = tags {
            item.tags = val;
        }
        if let Some(val) = asset {
            item.image = Some(val);
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Blog> {
        let mut guard = self.0.lock().await;
        let mut res = guard
            .iter()
            .enumerate()
            .filter(|(_, b)| b.id == id)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let index = match res.len() {
            0 => return Err(RepositoryError::NotFound),
            1 => res.remove(0),
            i => return Err(RepositoryError::NoUnique { matched: i as u32 }),
        };

        Ok(guard.remove(index))
    }
}

#[async_trait]
impl MediaRepository for InMemoryRepository<Media> {
    async fn insert(&self, item: Media) -> Result<()> {
        self.0.lock().await.push(item);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Media> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |m| m.id == id)?.clone())
    }

    async fn find_all(&self, page: &Page) -> Result<Vec<Media>> {
        let guard = self.0.lock().await;
        let mut items = guard.iter().collect::<Vec<_>>();

        sort_in_place(&mut items, &page.sort, |m, field| match field {
            "title" => m.title.clone(),
            "created_at" => m.created_at.to_rfc3339(),
            _ => String::new(),
        });

        Ok(window(items, page))
    }

    async fn find_by_field(&self, field: PostField, value: &str) -> Result<Media> {
        let guard = self.0.lock().await;

        let matches = |m: &&Media| match field {
            PostField::Title => m.title == value,
            PostField::Slug => m.slug == value,
            PostField::Category => m.category == value,
        };

        Ok(find_ref(&guard, matches)?.clone())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Vec<Media>> {
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|m| m.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Media>> {
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|m| m.category == category)
            .cloned()
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Media>> {
        let re = case_insensitive(query)?;
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|m| {
                re.is_match(&m.title)
                    || re.is_match(&m.slug)
                    || re.is_match(&m.category)
                    || re.is_match(&m.content)
            })
            .cloned()
            .collect())
    }

    async fn is_liked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |m| m.id == id)?.likes.contains(&user_id))
    }

    async fn insert_like(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |m| m.id == id)?;

        item.likes.insert(user_id);
        item.dislikes.remove(&user_id);
        Ok(item.clone())
    }

    async fn delete_like(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |m| m.id == id)?;

        item.likes.remove(&user_id);
        Ok(item.clone())
    }

    async fn is_disliked(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |m| m.id == id)?.dislikes.contains(&user_id))
    }

    async fn insert_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |m| m.id == id)?;

        item.dislikes.insert(user_id);
        item.likes.remove(&user_id);
        Ok(item.clone())
    }

    async fn delete_dislike(&self, id: Uuid, user_id: Uuid) -> Result<Media> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |m| m.id == id)?;

        item.dislikes.remove(&user_id);
        Ok(item.clone())
    }

    async fn update(&self, id: Uuid, mutation: PostMutation) -> Result<Media> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |m| m.id == id)?;

        let PostMutation {
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            asset,
        } = mutation;

        if let Some(val) = title {
            item.title = val;
        }
        if let Some(val) = content {
            item.content = val;
        }
        if let Some(val) = content_html {
            item.content_html = val;
        }
        if let Some(val) = summary {
            item.summary = val;
        }
        if let Some(val) = slug {
            item.slug = val;
        }
        if let Some(val) = category {
            item.category = val;
        }
        if let Some(val) = tags {
            item.tags = val;
        }
        if let Some(val) = asset {
            item.video = Some(val);
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Media> {
        let mut guard = self.0.lock().await;
        let mut res = guard
            .iter()
            .enumerate()
            .filter(|(_, m)| m.id == id)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let index = match res.len() {
            0 => return Err(RepositoryError::NotFound),
            1 => res.remove(0),
            i => return Err(RepositoryError::NoUnique { matched: i as u32 }),
        };

        Ok(guard.remove(index))
    }
}

#[async_trait]
impl TagRepository for InMemoryRepository<Tag> {
    async fn insert(&self, item: Tag) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_ref(&guard, |t| t.title == item.title || t.id == item.id) {
            Ok(_) => return Ok(false),
            Err(RepositoryError::NotFound) => (),
            Err(e) => return Err(e),
        }

        guard.push(item);
        Ok(true)
    }

    async fn find(&self, id: Uuid) -> Result<Tag> {
        let guard = self.0.lock().await;

        Ok(find_ref(&guard, |t| t.id == id)?.clone())
    }

    async fn find_all(&self) -> Result<Vec<Tag>> {
        Ok(self.0.lock().await.iter().cloned().collect())
    }

    async fn find_by_field(&self, field: TagField, value: &str) -> Result<Tag> {
        let guard = self.0.lock().await;

        let matches = |t: &&Tag| match field {
            TagField::Title => t.title == value,
            TagField::Color => t.color == value,
        };

        Ok(find_ref(&guard, matches)?.clone())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>> {
        let guard = self.0.lock().await;

        match find_ref(&guard, |t| t.title == title) {
            Ok(t) => Ok(Some(t.clone())),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_many(&self, ids: &HashSet<Uuid>) -> Result<Vec<Tag>> {
        let guard = self.0.lock().await;

        Ok(guard.iter().filter(|t| ids.contains(&t.id)).cloned().collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Tag>> {
        let re = case_insensitive(query)?;
        let guard = self.0.lock().await;

        Ok(guard
            .iter()
            .filter(|t| {
                re.is_match(&t.title)
                    || t.description.as_deref().map(|d| re.is_match(d)).unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn increment_posts(&self, title: &str) -> Result<bool> {
        let mut guard = self.0.lock().await;

        match find_mut(&mut guard, |t| t.title == title) {
            Ok(item) => {
                item.posts += 1;
                Ok(true)
            }
            Err(RepositoryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn update(&self, id: Uuid, mutation: TagMutation) -> Result<Tag> {
        let mut guard = self.0.lock().await;
        let item = find_mut(&mut guard, |t| t.id == id)?;

        let TagMutation {
            title,
            description,
            color,
            image,
        } = mutation;

        if let Some(val) = title {
            item.title = val;
        }
        if let Some(val) = description {
            item.description = Some(val);
        }
        if let Some(val) = color {
            item.color = val;
        }
        if let Some(val) = image {
            item.image = Some(val);
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Tag> {
        let mut guard = self.0.lock().await;
        let mut res = guard
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id == id)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let index = match res.len() {
            0 => return Err(RepositoryError::NotFound),
            1 => res.remove(0),
            i => return Err(RepositoryError::NoUnique { matched: i as u32 }),
        };

        Ok(guard.remove(index))
    }
}
