// src/error.rs

use std::fmt;

/// Global error enum for the exam core.
/// Everything a caller of the session/pool services can see ends up here.
#[derive(Debug)]
pub enum ExamError {
    /// Persistence failure that no fallback path could recover.
    Storage(String),

    /// The storage schema is missing an expected column and no fallback
    /// identity/status path applied.
    SchemaCompatibility(String),
}

impl fmt::Display for ExamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamError::Storage(msg) => write!(f, "storage error: {}", msg),
            ExamError::SchemaCompatibility(msg) => {
                write!(f, "schema compatibility error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ExamError {}

/// Errors surfaced by the question-bank and attempt stores.
///
/// The "unknown column" class is kept distinct so the session orchestrator
/// can drive its schema-fallback paths on a typed variant instead of
/// inspecting message text.
#[derive(Debug)]
pub enum StoreError {
    /// The statement referenced a column the current schema does not have.
    UnknownColumn(String),

    /// Any other database failure.
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UnknownColumn(msg) => write!(f, "unknown column: {}", msg),
            StoreError::Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn is_unknown_column(&self) -> bool {
        matches!(self, StoreError::UnknownColumn(_))
    }
}

impl From<StoreError> for ExamError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownColumn(msg) => ExamError::SchemaCompatibility(msg),
            StoreError::Database(e) => ExamError::Storage(e.to_string()),
        }
    }
}

/// Error surfaced by the pool cache store.
/// Never fatal for a request: a failed read counts as a miss, a failed
/// write is logged and skipped.
#[derive(Debug)]
pub struct CacheError(pub String);

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache error: {}", self.0)
    }
}

impl std::error::Error for CacheError {}
