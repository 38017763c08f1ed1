// src/models/exam.rs

use serde::{Deserialize, Serialize};

use crate::models::question::PoolQuestion;

/// Lifecycle status of an exam attempt.
///
/// Stored as a plain string in the `exams` table. Only `IN_PROGRESS` blocks
/// a reset; every other (or unreadable) status is treated as retakeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamStatus {
    InProgress,
    Submitted,
    Reviewed,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::InProgress => "IN_PROGRESS",
            ExamStatus::Submitted => "SUBMITTED",
            ExamStatus::Reviewed => "REVIEWED",
        }
    }

    /// Decodes a stored status string. Unknown values yield `None`, which
    /// the state machine handles like any other non-IN_PROGRESS status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "IN_PROGRESS" => Some(ExamStatus::InProgress),
            "SUBMITTED" => Some(ExamStatus::Submitted),
            "REVIEWED" => Some(ExamStatus::Reviewed),
            _ => None,
        }
    }
}

/// The slice of an `exams` row the orchestrator works with.
///
/// `status` is `None` when the column is absent from the schema or holds a
/// value we do not recognize. `started_at` is carried so that callers can
/// observe that resuming an in-progress attempt leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub id: i64,
    pub status: Option<ExamStatus>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input contract for `SessionOrchestrator::create_or_resume_session`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    pub student_id: i64,
    pub topic_id: i64,

    /// Identity value for the legacy `user_id` schema, when the caller
    /// still has one. Only consulted when the primary column is missing
    /// or the primary lookup finds nothing.
    pub legacy_user_id: Option<i64>,

    /// Overrides the topic's configured question count when present.
    pub requested_count: Option<u32>,
}

/// Output contract: the resolved attempt plus its question pool.
#[derive(Debug, Clone, Serialize)]
pub struct ExamSession {
    pub attempt_id: i64,
    pub questions: Vec<PoolQuestion>,
}
