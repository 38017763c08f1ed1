// tests/common/mod.rs
//
// In-memory stand-ins for the production stores. The attempt store can be
// dialed to either storage schema generation (student vs legacy identity
// column, with or without a status column) to exercise the fallback paths.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use exam_core::error::{CacheError, StoreError};
use exam_core::models::exam::{AttemptRecord, ExamStatus};
use exam_core::models::question::PoolQuestion;
use exam_core::store::{AttemptIdentity, AttemptStore, PoolCache, QuestionBank};

fn storage_failure() -> StoreError {
    StoreError::Database(sqlx::Error::PoolClosed)
}

fn unknown_column(column: &str) -> StoreError {
    StoreError::UnknownColumn(format!("column \"{}\" does not exist", column))
}

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryQuestionBank {
    configured: HashMap<i64, u32>,
    questions: HashMap<i64, Vec<PoolQuestion>>,

    /// Trip switches for simulating storage failures.
    pub fail_count_lookup: AtomicBool,
    pub fail_listing: AtomicBool,

    pub list_calls: AtomicUsize,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic with `count` questions (ids `topic_id * 100 + 1..`)
    /// and an optional configured question count.
    pub fn with_topic(mut self, topic_id: i64, count: usize, configured: Option<u32>) -> Self {
        let questions: Vec<PoolQuestion> = (1..=count as i64)
            .map(|i| PoolQuestion {
                id: topic_id * 100 + i,
                content: format!("Question {}", i),
                is_multiple_choice: i % 3 == 0,
            })
            .collect();
        self.questions.insert(topic_id, questions);
        if let Some(configured) = configured {
            self.configured.insert(topic_id, configured);
        }
        self
    }

    pub fn question_ids(&self, topic_id: i64) -> Vec<i64> {
        self.questions
            .get(&topic_id)
            .map(|qs| qs.iter().map(|q| q.id).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionBank {
    async fn topic_question_count(&self, topic_id: i64) -> Result<Option<u32>, StoreError> {
        if self.fail_count_lookup.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        Ok(self.configured.get(&topic_id).copied())
    }

    async fn list_question_ids(&self, topic_id: i64) -> Result<Vec<i64>, StoreError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.question_ids(topic_id))
    }

    async fn fetch_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<PoolQuestion>, StoreError> {
        let by_id: HashMap<i64, &PoolQuestion> = self
            .questions
            .values()
            .flatten()
            .map(|q| (q.id, q))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|q| (*q).clone()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Attempt store
// ---------------------------------------------------------------------------

/// A raw attempt row, status kept as the stored string so tests can plant
/// values the application does not recognize.
#[derive(Debug, Clone)]
pub struct FakeAttempt {
    pub id: i64,
    pub student_id: Option<i64>,
    pub user_id: Option<i64>,
    pub topic_id: i64,
    pub status: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: Option<i64>,
}

pub struct InMemoryAttemptStore {
    /// Schema toggles: which columns the simulated database has.
    pub has_student_column: bool,
    pub has_legacy_column: bool,
    pub has_status_column: bool,

    pub fail_all: AtomicBool,

    next_id: AtomicI64,
    rows: Mutex<Vec<FakeAttempt>>,
}

impl InMemoryAttemptStore {
    /// Current-generation schema: student_id and status both present.
    pub fn current_schema() -> Self {
        Self {
            has_student_column: true,
            has_legacy_column: true,
            has_status_column: true,
            fail_all: AtomicBool::new(false),
            next_id: AtomicI64::new(1000),
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn without_student_column(mut self) -> Self {
        self.has_student_column = false;
        self
    }

    pub fn without_legacy_column(mut self) -> Self {
        self.has_legacy_column = false;
        self
    }

    pub fn without_status_column(mut self) -> Self {
        self.has_status_column = false;
        self
    }

    pub fn seed(&self, attempt: FakeAttempt) {
        self.rows.lock().unwrap().push(attempt);
    }

    pub fn row(&self, id: i64) -> Option<FakeAttempt> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_identity_column(&self, identity: AttemptIdentity) -> Result<(), StoreError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        match identity {
            AttemptIdentity::Student if !self.has_student_column => {
                Err(unknown_column("student_id"))
            }
            AttemptIdentity::LegacyUser if !self.has_legacy_column => {
                Err(unknown_column("user_id"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn find_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
    ) -> Result<Option<AttemptRecord>, StoreError> {
        self.check_identity_column(identity)?;

        let rows = self.rows.lock().unwrap();
        let found = rows.iter().find(|r| {
            let key = match identity {
                AttemptIdentity::Student => r.student_id,
                AttemptIdentity::LegacyUser => r.user_id,
            };
            key == Some(identity_value) && r.topic_id == topic_id
        });

        Ok(found.map(|r| AttemptRecord {
            id: r.id,
            status: if self.has_status_column {
                r.status.as_deref().and_then(ExamStatus::parse)
            } else {
                None
            },
            started_at: Some(r.start_time),
        }))
    }

    async fn insert_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
        status: Option<ExamStatus>,
    ) -> Result<i64, StoreError> {
        self.check_identity_column(identity)?;
        if status.is_some() && !self.has_status_column {
            return Err(unknown_column("status"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().push(FakeAttempt {
            id,
            student_id: (identity == AttemptIdentity::Student).then_some(identity_value),
            user_id: (identity == AttemptIdentity::LegacyUser).then_some(identity_value),
            topic_id,
            status: status.map(|s| s.as_str().to_string()),
            start_time: Utc::now(),
            end_time: None,
            score: None,
        });

        Ok(id)
    }

    async fn reset_attempt(
        &self,
        attempt_id: i64,
        status: Option<ExamStatus>,
    ) -> Result<(), StoreError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(storage_failure());
        }
        if status.is_some() && !self.has_status_column {
            return Err(unknown_column("status"));
        }

        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == attempt_id) {
            row.start_time = Utc::now();
            row.end_time = None;
            row.score = None;
            if let Some(status) = status {
                row.status = Some(status.as_str().to_string());
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pool caches
// ---------------------------------------------------------------------------

/// TTL-respecting in-memory cache with inspection helpers.
#[derive(Default)]
pub struct InMemoryPoolCache {
    entries: Mutex<HashMap<String, (Vec<PoolQuestion>, Instant)>>,
}

impl InMemoryPoolCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl PoolCache for InMemoryPoolCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<PoolQuestion>>, CacheError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).and_then(|(pool, deadline)| {
            (Instant::now() < *deadline).then(|| pool.clone())
        }))
    }

    async fn set(
        &self,
        key: &str,
        pool: Vec<PoolQuestion>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (pool, Instant::now() + ttl));
        Ok(())
    }
}

/// A cache whose backing store is unreachable.
pub struct FailingCache;

#[async_trait]
impl PoolCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<PoolQuestion>>, CacheError> {
        Err(CacheError("cache backend unreachable".to_string()))
    }

    async fn set(
        &self,
        _key: &str,
        _pool: Vec<PoolQuestion>,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError("cache backend unreachable".to_string()))
    }
}
