// src/store/attempt.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::exam::{AttemptRecord, ExamStatus};
use crate::store::{AttemptIdentity, AttemptStore, classify_pg_error};

/// Postgres-backed attempt store.
///
/// Statements name the identity column from the closed `AttemptIdentity`
/// enum, never from caller input. Missing columns surface as
/// `StoreError::UnknownColumn` via SQLSTATE 42703.
#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn find_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
    ) -> Result<Option<AttemptRecord>, StoreError> {
        let sql = format!(
            "SELECT id, status, start_time FROM exams WHERE {} = $1 AND topic_id = $2 LIMIT 1",
            identity.column()
        );

        let row: Option<(i64, Option<String>, Option<DateTime<Utc>>)> = sqlx::query_as(&sql)
            .bind(identity_value)
            .bind(topic_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_pg_error)?;

        Ok(row.map(|(id, status, started_at)| AttemptRecord {
            id,
            status: status.as_deref().and_then(ExamStatus::parse),
            started_at,
        }))
    }

    async fn insert_attempt(
        &self,
        identity: AttemptIdentity,
        identity_value: i64,
        topic_id: i64,
        status: Option<ExamStatus>,
    ) -> Result<i64, StoreError> {
        let id: i64 = match status {
            Some(status) => {
                let sql = format!(
                    "INSERT INTO exams ({}, topic_id, start_time, status) \
                     VALUES ($1, $2, NOW(), $3) RETURNING id",
                    identity.column()
                );
                sqlx::query_scalar(&sql)
                    .bind(identity_value)
                    .bind(topic_id)
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(classify_pg_error)?
            }
            // Legacy schema without a status column.
            None => {
                let sql = format!(
                    "INSERT INTO exams ({}, topic_id, start_time) \
                     VALUES ($1, $2, NOW()) RETURNING id",
                    identity.column()
                );
                sqlx::query_scalar(&sql)
                    .bind(identity_value)
                    .bind(topic_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(classify_pg_error)?
            }
        };

        Ok(id)
    }

    async fn reset_attempt(
        &self,
        attempt_id: i64,
        status: Option<ExamStatus>,
    ) -> Result<(), StoreError> {
        match status {
            Some(status) => {
                sqlx::query(
                    "UPDATE exams SET start_time = NOW(), end_time = NULL, score = NULL, \
                     status = $2 WHERE id = $1",
                )
                .bind(attempt_id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await
                .map_err(classify_pg_error)?;
            }
            None => {
                sqlx::query(
                    "UPDATE exams SET start_time = NOW(), end_time = NULL, score = NULL \
                     WHERE id = $1",
                )
                .bind(attempt_id)
                .execute(&self.pool)
                .await
                .map_err(classify_pg_error)?;
            }
        }

        Ok(())
    }
}
