// src/store/question_bank.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::StoreError;
use crate::models::question::PoolQuestion;
use crate::store::{QuestionBank, classify_pg_error};

/// Postgres-backed question bank.
#[derive(Clone)]
pub struct PgQuestionBank {
    pool: PgPool,
}

impl PgQuestionBank {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionBank for PgQuestionBank {
    async fn topic_question_count(&self, topic_id: i64) -> Result<Option<u32>, StoreError> {
        let count: Option<Option<i32>> =
            sqlx::query_scalar("SELECT question_count FROM topics WHERE id = $1")
                .bind(topic_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(classify_pg_error)?;

        // A missing topic and an unconfigured (or zero) count both mean
        // "no limit" to callers.
        Ok(count.flatten().filter(|c| *c > 0).map(|c| c as u32))
    }

    async fn list_question_ids(&self, topic_id: i64) -> Result<Vec<i64>, StoreError> {
        sqlx::query_scalar("SELECT id FROM questions WHERE topic_id = $1 ORDER BY id ASC")
            .bind(topic_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify_pg_error)
    }

    async fn fetch_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<PoolQuestion>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Use QueryBuilder for dynamic IN clause
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "SELECT id, content, is_multiple_choice FROM questions WHERE id IN (",
        );

        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<PoolQuestion> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(classify_pg_error)?;

        // The database returns rows in storage order; reassemble them in
        // the order the caller asked for.
        let mut by_id: HashMap<i64, PoolQuestion> =
            rows.into_iter().map(|q| (q.id, q)).collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
