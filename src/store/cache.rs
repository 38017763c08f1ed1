// src/store/cache.rs

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use crate::error::CacheError;
use crate::models::question::PoolQuestion;
use crate::store::PoolCache;

/// Builds the cache key for a generated pool.
///
/// The key carries both the topic and the effective requested count (or the
/// `all` sentinel), so pools of different sizes never collide on one entry.
pub fn pool_cache_key(topic_id: i64, requested_count: Option<u32>) -> String {
    match requested_count {
        Some(count) => format!("topic_questions_{}_{}", topic_id, count),
        None => format!("topic_questions_{}_all", topic_id),
    }
}

#[derive(Clone)]
struct Entry {
    questions: Vec<PoolQuestion>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process pool cache with per-entry TTL expiry.
///
/// One instance is shared across all PoolGenerator invocations; entries are
/// never mutated in place, only inserted and expired.
#[derive(Clone)]
pub struct MemoryPoolCache {
    cache: Cache<String, Entry>,
}

impl MemoryPoolCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().expire_after(PerEntryTtl).build(),
        }
    }
}

impl Default for MemoryPoolCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolCache for MemoryPoolCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<PoolQuestion>>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.questions))
    }

    async fn set(
        &self,
        key: &str,
        pool: Vec<PoolQuestion>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.cache
            .insert(key.to_string(), Entry { questions: pool, ttl })
            .await;
        Ok(())
    }
}
