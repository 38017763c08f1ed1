// src/store/mod.rs

pub mod attempt;
pub mod cache;
pub mod question_bank;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CacheError, StoreError};
use crate::models::exam::{AttemptRecord, ExamStatus};
use crate::models::question::PoolQuestion;

pub use attempt::PgAttemptStore;
pub use cache::MemoryPoolCache;
pub use question_bank::PgQuestionBank;

/// Maps a sqlx error into the store error taxonomy.
/// SQLSTATE 42703 (undefined_column) is the schema-compatibility class.
pub(crate) fn classify_pg_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("42703") {
            return StoreError::UnknownColumn(db_err.message().to_string());
        }
    }
    StoreError::Database(err)
}

/// Which column identifies the owner of an attempt row.
///
/// Two schema versions coexist in the wild: the current one keys attempts
/// on `student_id`, the legacy one on `user_id`. The orchestrator picks one
/// per call and sticks with it for every statement in that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptIdentity {
    Student,
    LegacyUser,
}

impl AttemptIdentity {
    pub fn column(&self) -> &'static str {
        match self {
            AttemptIdentity::Student => "student_id",
            AttemptIdentity::LegacyUser => "user_id",
        }
    }
}

/// Read-only access to a topic's question bank.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// The topic's configured question count, `None` when the topic does
    /// not exist or has no limit configured.
    async fn topic_question_count(&self, topic_id: i64) -> Result<Option<u32>, StoreError>;

    /// All question ids belonging to the topic, ascending. This is the
    /// stable base order the shuffle permutes.
    async fn list_question_ids(&self, topic_id: i64) -> Result<Vec<i64>, StoreError>;

    /// Full records for exactly `ids`, returned in the order of `ids`.
    async fn fetch_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<PoolQuestion>, StoreError>;
}

/// Persistence for exam attempt rows.
///
/// Implementations must report a missing column as
/// `StoreError::UnknownColumn` so callers can drive the schema-fallback
/// paths on a typed variant.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn find_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
    ) -> Result<Option<AttemptRecord>, StoreError>;

    /// Inserts a fresh attempt with `start_time = now` and returns its id.
    /// `status = None` omits the status column entirely (legacy schema).
    async fn insert_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
        status: Option<ExamStatus>,
    ) -> Result<i64, StoreError>;

    /// Resets an attempt in place for a retake: `start_time = now`,
    /// `end_time = NULL`, `score = NULL`. `status = None` omits the status
    /// assignment (legacy schema).
    async fn reset_attempt(
        &self,
        attempt_id: i64,
        status: Option<ExamStatus>,
    ) -> Result<(), StoreError>;
}

/// Shared cache for generated question pools.
///
/// Entries are immutable once written; there is no delete, only TTL expiry
/// or overwrite on a fresh compute.
#[async_trait]
pub trait PoolCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<PoolQuestion>>, CacheError>;

    async fn set(
        &self,
        key: &str,
        pool: Vec<PoolQuestion>,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}
