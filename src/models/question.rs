// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// One question as it appears inside a generated pool.
///
/// This is the client-facing shape: content and the multiple-choice flag
/// only, never the answer key (grading lives outside this core).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PoolQuestion {
    pub id: i64,

    /// The text content of the question.
    pub content: String,

    /// Whether more than one option is expected to be selected.
    pub is_multiple_choice: bool,
}
