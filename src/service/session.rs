// src/service/session.rs

use std::sync::Arc;

use crate::error::ExamError;
use crate::models::exam::{ExamSession, ExamStatus, SessionRequest};
use crate::service::pool::PoolGenerator;
use crate::store::{AttemptIdentity, AttemptStore, QuestionBank};

/// Resolves the exam attempt for a (student, topic) pair and hands back the
/// attempt together with its question pool.
///
/// * No attempt yet: insert a new `IN_PROGRESS` row.
/// * Attempt `IN_PROGRESS`: resume it untouched.
/// * Any other status: reset the row in place for a retake.
///
/// Two schema generations coexist: attempts keyed on `student_id` (current)
/// or `user_id` (legacy), with or without a `status` column. Missing-column
/// failures drive the fallback paths; every other storage error propagates.
pub struct SessionOrchestrator {
    attempts: Arc<dyn AttemptStore>,
    bank: Arc<dyn QuestionBank>,
    pools: Arc<PoolGenerator>,
}

impl SessionOrchestrator {
    pub fn new(
        attempts: Arc<dyn AttemptStore>,
        bank: Arc<dyn QuestionBank>,
        pools: Arc<PoolGenerator>,
    ) -> Self {
        Self {
            attempts,
            bank,
            pools,
        }
    }

    pub async fn create_or_resume_session(
        &self,
        req: SessionRequest,
    ) -> Result<ExamSession, ExamError> {
        let SessionRequest {
            student_id,
            topic_id,
            legacy_user_id,
            requested_count,
        } = req;

        // Identity used for an insert, should we need one. Switches to the
        // legacy column only when the primary column is missing.
        let mut insert_identity = (AttemptIdentity::Student, student_id);

        let mut existing = match self
            .attempts
            .find_attempt(AttemptIdentity::Student, student_id, topic_id)
            .await
        {
            Ok(row) => row,
            Err(err) if err.is_unknown_column() => match legacy_user_id {
                Some(user_id) => {
                    tracing::warn!(
                        student_id,
                        topic_id,
                        "student identity column missing, using legacy user identity"
                    );
                    insert_identity = (AttemptIdentity::LegacyUser, user_id);
                    None
                }
                // No fallback identity to try; surface the schema problem.
                None => return Err(err.into()),
            },
            Err(err) => return Err(err.into()),
        };

        // The primary lookup found nothing; an attempt may still exist
        // under the legacy identity column.
        if existing.is_none() {
            if let Some(user_id) = legacy_user_id {
                existing = match self
                    .attempts
                    .find_attempt(AttemptIdentity::LegacyUser, user_id, topic_id)
                    .await
                {
                    Ok(Some(row)) => {
                        insert_identity = (AttemptIdentity::LegacyUser, user_id);
                        Some(row)
                    }
                    Ok(None) => None,
                    // The legacy column being gone from the current schema
                    // just means there is nothing to find through it.
                    Err(err) if err.is_unknown_column() => None,
                    Err(err) => return Err(err.into()),
                };
            }
        }

        let attempt_id = match existing {
            Some(attempt) => match attempt.status {
                Some(ExamStatus::InProgress) => {
                    tracing::debug!(
                        attempt_id = attempt.id,
                        topic_id,
                        "continuing exam attempt in progress"
                    );
                    attempt.id
                }
                status => {
                    tracing::debug!(
                        attempt_id = attempt.id,
                        topic_id,
                        ?status,
                        "resetting exam attempt for retake"
                    );
                    self.reset_attempt(attempt.id).await?;
                    attempt.id
                }
            },
            None => {
                tracing::debug!(student_id, topic_id, "creating new exam attempt");
                let (identity, identity_value) = insert_identity;
                self.insert_attempt(identity, identity_value, topic_id).await?
            }
        };

        // Pool-size limit: an explicit request wins; otherwise read the
        // topic's configured count best-effort.
        let limit = match requested_count {
            Some(count) => Some(count),
            None => match self.bank.topic_question_count(topic_id).await {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(
                        topic_id,
                        error = %err,
                        "could not fetch topic question count, using all questions"
                    );
                    None
                }
            },
        };

        let questions = self.pools.generate_pool(topic_id, limit).await?;

        Ok(ExamSession {
            attempt_id,
            questions,
        })
    }

    /// Insert with the status-column fallback: a schema without `status`
    /// gets the row without one.
    async fn insert_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
    ) -> Result<i64, ExamError> {
        match self
            .attempts
            .insert_attempt(identity, identity_value, topic_id, Some(ExamStatus::InProgress))
            .await
        {
            Ok(id) => Ok(id),
            Err(err) if err.is_unknown_column() => {
                tracing::warn!(topic_id, "status column missing, inserting attempt without status");
                self.attempts
                    .insert_attempt(identity, identity_value, topic_id, None)
                    .await
                    .map_err(Into::into)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reset with the same status-column fallback as the insert path.
    async fn reset_attempt(&self, attempt_id: i64) -> Result<(), ExamError> {
        match self
            .attempts
            .reset_attempt(attempt_id, Some(ExamStatus::InProgress))
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_unknown_column() => {
                tracing::warn!(attempt_id, "status column missing, resetting attempt without status");
                self.attempts
                    .reset_attempt(attempt_id, None)
                    .await
                    .map_err(Into::into)
            }
            Err(err) => Err(err.into()),
        }
    }
}
