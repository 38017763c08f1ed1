// src/service/pool.rs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::{Rng, RngCore};

use crate::error::ExamError;
use crate::models::question::PoolQuestion;
use crate::store::cache::pool_cache_key;
use crate::store::{PoolCache, QuestionBank};

/// Produces the randomized question pool for a topic, cache-first.
///
/// A cache hit returns the stored pool verbatim, so a student refreshing
/// mid-exam keeps the same questions in the same order for the TTL window.
pub struct PoolGenerator {
    bank: Arc<dyn QuestionBank>,
    cache: Arc<dyn PoolCache>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    ttl: Duration,
}

impl PoolGenerator {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        cache: Arc<dyn PoolCache>,
        rng: Box<dyn RngCore + Send>,
        ttl: Duration,
    ) -> Self {
        Self {
            bank,
            cache,
            rng: Mutex::new(rng),
            ttl,
        }
    }

    /// Returns up to `requested_count` questions for the topic, shuffled.
    ///
    /// Falls back to the topic's configured count when no count is
    /// requested, and to the full bank when neither is set. An unknown or
    /// empty topic yields an empty pool; storage failures propagate.
    pub async fn generate_pool(
        &self,
        topic_id: i64,
        requested_count: Option<u32>,
    ) -> Result<Vec<PoolQuestion>, ExamError> {
        let key = pool_cache_key(topic_id, requested_count);

        match self.cache.get(&key).await {
            Ok(Some(pool)) => {
                tracing::debug!(topic_id, key = %key, "cache hit: using cached question pool");
                return Ok(pool);
            }
            Ok(None) => {
                tracing::debug!(topic_id, key = %key, "cache miss: generating question pool");
            }
            Err(err) => {
                // An unreachable cache degrades to a plain miss.
                tracing::warn!(topic_id, error = %err, "pool cache read failed, computing directly");
            }
        }

        let configured_count = self.bank.topic_question_count(topic_id).await?;

        let mut ids = self.bank.list_question_ids(topic_id).await?;
        if ids.is_empty() {
            // Unknown topic or empty bank; not worth a cache entry.
            return Ok(Vec::new());
        }

        self.shuffle(&mut ids);

        if let Some(limit) = requested_count.or(configured_count) {
            ids.truncate(limit as usize);
        }

        let questions = self.bank.fetch_questions_by_ids(&ids).await?;

        if let Err(err) = self.cache.set(&key, questions.clone(), self.ttl).await {
            tracing::warn!(topic_id, error = %err, "failed to cache question pool");
        }

        Ok(questions)
    }

    /// Fisher-Yates shuffle over the full id sequence.
    ///
    /// The whole sequence is permuted before the limit is applied;
    /// truncating a biased permutation would skew which questions appear.
    fn shuffle(&self, ids: &mut [i64]) {
        let mut rng = self.rng.lock().expect("pool rng lock poisoned");
        for i in (1..ids.len()).rev() {
            let j = rng.gen_range(0..=i);
            ids.swap(i, j);
        }
    }
}
