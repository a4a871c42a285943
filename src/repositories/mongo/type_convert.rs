use mongodb::bson::{doc, Document};

use super::{
    MongoAssetModel, MongoBlogModel, MongoMediaModel, MongoProfileModel, MongoTagModel,
    MongoUserModel,
};
use crate::entities::{Asset, Blog, Media, Profile, Tag, User};
use crate::repositories::{Order, Page, PostMutation, TagMutation, UserMutation};

impl From<MongoAssetModel> for Asset {
    fn from(MongoAssetModel { public_id, url }: MongoAssetModel) -> Self {
        Asset { public_id, url }
    }
}
impl From<Asset> for MongoAssetModel {
    fn from(Asset { public_id, url }: Asset) -> Self {
        MongoAssetModel { public_id, url }
    }
}

impl From<MongoProfileModel> for Profile {
    fn from(
        MongoProfileModel {
            bio,
            brand_color,
            education,
            projects,
            skills,
            learning,
            urls,
            location,
            work,
        }: MongoProfileModel,
    ) -> Self {
        Profile {
            bio,
            brand_color,
            education,
            projects,
            skills,
            learning,
            urls,
            location,
            work,
        }
    }
}
impl From<Profile> for MongoProfileModel {
    fn from(
        Profile {
            bio,
            brand_color,
            education,
            projects,
            skills,
            learning,
            urls,
            location,
            work,
        }: Profile,
    ) -> Self {
        MongoProfileModel {
            bio,
            brand_color,
            education,
            projects,
            skills,
            learning,
            urls,
            location,
            work,
        }
    }
}

impl From<MongoUserModel> for User {
    fn from(
        MongoUserModel {
            id,
            name,
            username,
            email,
            password,
            role,
            blocked,
            avatar,
            provider,
            google_id,
            github_id,
            confirm_token,
            confirmed,
            destroy_token,
            reset_token,
            reset_expires,
            mut saved_blogs,
            mut following_tags,
            mut hidden_tags,
            profile,
            created_at,
            updated_at,
        }: MongoUserModel,
    ) -> Self {
        User {
            id: id.parse().unwrap(),
            name,
            username,
            email,
            password,
            role,
            blocked,
            avatar: avatar.map(Into::into),
            provider,
            google_id,
            github_id,
            confirm_token,
            confirmed,
            destroy_token,
            reset_token,
            reset_expires,
            saved_blogs: saved_blogs.drain().map(|s| s.parse().unwrap()).collect(),
            following_tags: following_tags.drain().map(|s| s.parse().unwrap()).collect(),
            hidden_tags: hidden_tags.drain().map(|s| s.parse().unwrap()).collect(),
            profile: profile.into(),
            created_at,
            updated_at,
        }
    }
}
impl From<User> for MongoUserModel {
    fn from(
        User {
            id,
            name,
            username,
            email,
            password,
            role,
            blocked,
            avatar,
            provider,
            google_id,
            github_id,
            confirm_token,
            confirmed,
            destroy_token,
            reset_token,
            reset_expires,
            mut saved_blogs,
            mut following_tags,
            mut hidden_tags,
            profile,
            created_at,
            updated_at,
        }: User,
    ) -> Self {
        MongoUserModel {
            id: id.to_string(),
            name,
            username,
            email,
            password,
            role,
            blocked,
            avatar: avatar.map(Into::into),
            provider,
            google_id,
            github_id,
            confirm_token,
            confirmed,
            destroy_token,
            reset_token,
            reset_expires,
            saved_blogs: saved_blogs.drain().map(|u| u.to_string()).collect(),
            following_tags: following_tags.drain().map(|u| u.to_string()).collect(),
            hidden_tags: hidden_tags.drain().map(|u| u.to_string()).collect(),
            profile: profile.into(),
            created_at,
            updated_at,
        }
    }
}

impl From<MongoBlogModel> for Blog {
    fn from(
        MongoBlogModel {
            id,
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            image,
            author,
            mut likes,
            mut dislikes,
            created_at,
            updated_at,
        }: MongoBlogModel,
    ) -> Self {
        Blog {
            id: id.parse().unwrap(),
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            image: image.map(Into::into),
            author: author.parse().unwrap(),
            likes: likes.drain().map(|s| s.parse().unwrap()).collect(),
            dislikes: dislikes.drain().map(|s| s.parse().unwrap()).collect(),
            created_at,
            updated_at,
        }
    }
}
impl From<Blog> for MongoBlogModel {
    fn from(
        Blog {
            id,
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            image,
            author,
            mut likes,
            mut dislikes,
            created_at,
            updated_at,
        }: Blog,
    ) -> Self {
        MongoBlogModel {
            id: id.to_string(),
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            image: image.map(Into::into),
            author: author.to_string(),
            likes: likes.drain().map(|u| u.to_string()).collect(),
            dislikes: dislikes.drain().map(|u| u.to_string()).collect(),
            created_at,
            updated_at,
        }
    }
}

impl From<MongoMediaModel> for Media {
    fn from(
        MongoMediaModel {
            id,
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            video,
            author,
            mut likes,
            mut dislikes,
            created_at,
            updated_at,
        }: MongoMediaModel,
    ) -> Self {
        Media {
            id: id.parse().unwrap(),
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            video: video.map(Into::into),
            author: author.parse().unwrap(),
            likes: likes.drain().map(|s| s.parse().unwrap()).collect(),
            dislikes: dislikes.drain().map(|s| s.parse().unwrap()).collect(),
            created_at,
            updated_at,
        }
    }
}
impl From<Media> for MongoMediaModel {
    fn from(
        Media {
            id,
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            video,
            author,
            mut likes,
            mut dislikes,
            created_at,
            updated_at,
        }: Media,
    ) -> Self {
        MongoMediaModel {
            id: id.to_string(),
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            video: video.map(Into::into),
            author: author.to_string(),
            likes: likes.drain().map(|u| u.to_string()).collect(),
            dislikes: dislikes.drain().map(|u| u.to_string()).collect(),
            created_at,
            updated_at,
        }
    }
}

impl From<MongoTagModel> for Tag {
    fn from(
        MongoTagModel {
            id,
            title,
            description,
            color,
            image,
            posts,
            created_at,
            updated_at,
        }: MongoTagModel,
    ) -> Self {
        Tag {
            id: id.parse().unwrap(),
            title,
            description,
            color,
            image: image.map(Into::into),
            posts,
            created_at,
            updated_at,
        }
    }
}
impl From<Tag> for MongoTagModel {
    fn from(
        Tag {
            id,
            title,
            description,
            color,
            image,
            posts,
            created_at,
            updated_at,
        }: Tag,
    ) -> Self {
        MongoTagModel {
            id: id.to_string(),
            title,
            description,
            color,
            image: image.map(Into::into),
            posts,
            created_at,
            updated_at,
        }
    }
}

impl From<UserMutation> for Document {
    fn from(
        UserMutation {
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
        }: UserMutation,
    ) -> Self {
        let mut mutation = doc! {};

        if let Some(val) = name {
            mutation.insert("name", val);
        }
        if let Some(val) = username {
            mutation.insert("username", val);
        }
        if let Some(val) = bio {
            mutation.insert("profile.bio", val);
        }
        if let Some(val) = brand_color {
            mutation.insert("profile.brand_color", val);
        }
        if let Some(val) = education {
            mutation.insert("profile.education", val);
        }
        if let Some(val) = projects {
            mutation.insert("profile.projects", val);
        }
        if let Some(val) = skills {
            mutation.insert("profile.skills", val);
        }
        if let Some(val) = learning {
            mutation.insert("profile.learning", val);
        }
        if let Some(val) = urls {
            mutation.insert("profile.urls", val);
        }
        if let Some(val) = location {
            mutation.insert("profile.location", val);
        }
        if let Some(val) = work {
            mutation.insert("profile.work", val);
        }
        if let Some(val) = avatar {
            mutation.insert(
                "avatar",
                doc! { "public_id": val.public_id, "url": val.url },
            );
        }

        mutation
    }
}

impl From<PostMutation> for Document {
    fn from(
        PostMutation {
            title,
            content,
            content_html,
            summary,
            slug,
            category,
            tags,
            asset: _,
        }: PostMutation,
    ) -> Self {
        let mut mutation = doc! {};

        if let Some(val) = title {
            mutation.insert("title", val);
        }
        if let Some(val) = content {
            mutation.insert("content", val);
        }
        if let Some(val) = content_html {
            mutation.insert("content_html", val);
        }
        if let Some(val) = summary {
            mutation.insert("summary", val);
        }
        if let Some(val) = slug {
            mutation.insert("slug", val);
        }
        if let Some(val) = category {
            mutation.insert("category", val);
        }
        if let Some(val) = tags {
            mutation.insert("tags", val);
        }

        mutation
    }
}

impl From<TagMutation> for Document {
    fn from(
        TagMutation {
            title,
            description,
            color,
            image,
        }: TagMutation,
    ) -> Self {
        let mut mutation = doc! {};

        if let Some(val) = title {
            mutation.insert("title", val);
        }
        if let Some(val) = description {
            mutation.insert("description", val);
        }
        if let Some(val) = color {
            mutation.insert("color", val);
        }
        if let Some(val) = image {
            mutation.insert(
                "image",
                doc! { "public_id": val.public_id, "url": val.url },
            );
        }

        mutation
    }
}

impl Page {
    pub(super) fn sort_doc(&self) -> Option<Document> {
        if self.sort.is_empty() {
            return None;
        }

        let mut sort = doc! {};
        for spec in &self.sort {
            let dir = match spec.order {
                Order::Asc => 1,
                Order::Desc => -1,
            };
            sort.insert(spec.field.clone(), dir);
        }

        Some(sort)
    }
}
