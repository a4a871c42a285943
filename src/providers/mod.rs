pub(crate) mod assets;
pub(crate) mod cache;
pub(crate) mod mail;
