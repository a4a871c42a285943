use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::repositories::Page;

/// Thin pass-through to Redis with a fixed TTL. Invalidation is wholesale:
/// writes call [`CacheService::reset`].
#[derive(Clone)]
pub struct CacheService {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl CacheService {
    pub async fn connect(url: &str, ttl_seconds: u64) -> ::anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;

        Ok(Self { conn, ttl_seconds })
    }

    pub async fn get(&self, key: &str) -> ::anyhow::Result<Option<String>> {
        let mut conn = self.conn.clone();

        Ok(conn.get(key).await?)
    }

    pub async fn set(&self, key: &str, value: &str) -> ::anyhow::Result<()> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(key, value, self.ttl_seconds).await?;
        Ok(())
    }

    pub async fn del(&self, key: &str) -> ::anyhow::Result<()> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    pub async fn reset(&self) -> ::anyhow::Result<()> {
        let mut conn = self.conn.clone();

        redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await?;
        Ok(())
    }
}

/// One key per (resource, pagination window). Every path that touches a list
/// derives its key here so reads and writes can never disagree.
pub fn list_key(resource: &str, page: &Page) -> String {
    let mut key = format!("{}:all:{}:{}", resource, page.skip, page.limit);

    for spec in &page.sort {
        let dir = match spec.order {
            crate::repositories::Order::Asc => "asc",
            crate::repositories::Order::Desc => "desc",
        };
        key.push_str(&format!(":{}:{}", spec.field, dir));
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{Order, SortSpec};

    #[test]
    fn list_key_is_stable_for_equal_windows() {
        let page = Page::default();

        assert_eq!(list_key("blogs", &page), list_key("blogs", &page));
        assert_eq!(list_key("blogs", &page), "blogs:all:0:10");
    }

    #[test]
    fn list_key_distinguishes_sorts() {
        let mut sorted = Page::default();
        sorted.sort.push(SortSpec {
            field: "title".to_owned(),
            order: Order::Desc,
        });

        assert_ne!(list_key("blogs", &Page::default()), list_key("blogs", &sorted));
    }
}
