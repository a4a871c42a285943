use std::sync::Arc;

use crate::providers::assets::AssetStore;
use crate::repositories::{BlogRepository, MediaRepository, TagRepository, UserRepository};

pub(crate) mod auth;
pub(crate) mod blogs;
pub(crate) mod media;
pub(crate) mod tags;
pub(crate) mod users;

pub(crate) type UserRepo = Arc<dyn UserRepository + Sync + Send>;
pub(crate) type BlogRepo = Arc<dyn BlogRepository + Sync + Send>;
pub(crate) type MediaRepo = Arc<dyn MediaRepository + Sync + Send>;
pub(crate) type TagRepo = Arc<dyn TagRepository + Sync + Send>;
pub(crate) type Assets = Arc<dyn AssetStore + Sync + Send>;
