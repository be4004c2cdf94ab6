use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Session, SessionError, SessionStore, SessionStorePtr};

pub fn create_postgres_session_store(pool: PgPool) -> SessionStorePtr {
    // ---
    Arc::new(PostgresSessionStore::new(pool))
}

/// `user_sessions` table: unique on `user_id` and on `token`.
pub struct PostgresSessionStore {
    // ---
    pool: PgPool,
}

impl PostgresSessionStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionStore for PostgresSessionStore {
    // ---
    async fn set_session(&self, user_id: Uuid, token: &str) -> Result<(), SessionError> {
        // ---
        let session = Session::new(user_id, token.to_string());

        // Upsert: at most one row per user.
        sqlx::query(
            "INSERT INTO user_sessions (id, user_id, token, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id)
             DO UPDATE SET token = EXCLUDED.token, created_at = EXCLUDED.created_at",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%user_id, "Session stored");
        Ok(())
    }

    async fn update_session(&self, user_id: Uuid, token: &str) -> Result<(), SessionError> {
        // ---
        let result = sqlx::query("UPDATE user_sessions SET token = $1 WHERE user_id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound);
        }
        Ok(())
    }

    async fn get_user_id_by_token(&self, token: &str) -> Result<Uuid, SessionError> {
        // ---
        sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM user_sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(SessionError::NotFound)
    }

    async fn get_session_id(&self, user_id: Uuid) -> Result<Uuid, SessionError> {
        // ---
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(SessionError::NotFound)
    }

    async fn delete_session(&self, user_id: Uuid) -> Result<(), SessionError> {
        // ---
        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_sessions_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        // ---
        let result = sqlx::query("DELETE FROM user_sessions WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
