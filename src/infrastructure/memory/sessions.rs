use crate::domain::{Session, SessionError, SessionStore};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    by_user: HashMap<Uuid, Session>,
    /// token -> user_id
    by_token: HashMap<String, Uuid>,
}

/// Session store with the same uniqueness rules as `user_sessions`.
#[derive(Default)]
pub struct MemorySessionStore {
    tables: RwLock<Tables>,
}

impl MemorySessionStore {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully-formed session, replacing any existing one for the user.
    ///
    /// Lets callers seed sessions with an arbitrary `created_at`.
    pub fn insert_session(&self, session: Session) {
        // ---
        let mut tables = self.tables.write();
        if let Some(old) = tables.by_user.remove(&session.user_id) {
            tables.by_token.remove(&old.token);
        }
        tables.by_token.insert(session.token.clone(), session.user_id);
        tables.by_user.insert(session.user_id, session);
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Same rule as the `token UNIQUE` column: a token binds at most one user.
fn ensure_token_free(
    by_token: &HashMap<String, Uuid>,
    user_id: Uuid,
    token: &str,
) -> Result<(), SessionError> {
    // ---
    match by_token.get(token) {
        Some(owner) if *owner != user_id => Err(SessionError::Storage(anyhow::anyhow!(
            "token is already bound to another session"
        ))),
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    // ---
    async fn set_session(&self, user_id: Uuid, token: &str) -> Result<(), SessionError> {
        // ---
        let mut tables = self.tables.write();
        let Tables { by_user, by_token } = &mut *tables;
        ensure_token_free(by_token, user_id, token)?;

        match by_user.get_mut(&user_id) {
            Some(existing) => {
                by_token.remove(&existing.token);
                existing.token = token.to_string();
                existing.created_at = Utc::now();
            }
            None => {
                by_user.insert(user_id, Session::new(user_id, token.to_string()));
            }
        }
        by_token.insert(token.to_string(), user_id);
        Ok(())
    }

    async fn update_session(&self, user_id: Uuid, token: &str) -> Result<(), SessionError> {
        // ---
        let mut tables = self.tables.write();
        let Tables { by_user, by_token } = &mut *tables;

        let existing = by_user.get_mut(&user_id).ok_or(SessionError::NotFound)?;
        ensure_token_free(by_token, user_id, token)?;
        by_token.remove(&existing.token);
        existing.token = token.to_string();
        by_token.insert(token.to_string(), user_id);
        Ok(())
    }

    async fn get_user_id_by_token(&self, token: &str) -> Result<Uuid, SessionError> {
        // ---
        self.tables
            .read()
            .by_token
            .get(token)
            .copied()
            .ok_or(SessionError::NotFound)
    }

    async fn get_session_id(&self, user_id: Uuid) -> Result<Uuid, SessionError> {
        // ---
        self.tables
            .read()
            .by_user
            .get(&user_id)
            .map(|session| session.id)
            .ok_or(SessionError::NotFound)
    }

    async fn delete_session(&self, user_id: Uuid) -> Result<(), SessionError> {
        // ---
        let mut tables = self.tables.write();
        if let Some(old) = tables.by_user.remove(&user_id) {
            tables.by_token.remove(&old.token);
        }
        Ok(())
    }

    async fn delete_sessions_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, SessionError> {
        // ---
        let mut tables = self.tables.write();
        let Tables { by_user, by_token } = &mut *tables;

        let before = by_user.len();
        by_user.retain(|_, session| {
            let keep = session.created_at >= cutoff;
            if !keep {
                by_token.remove(&session.token);
            }
            keep
        });
        Ok((before - by_user.len()) as u64)
    }
}
