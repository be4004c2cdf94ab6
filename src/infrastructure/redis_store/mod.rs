//! Redis-backed challenge and credential storage.
//!
//! Keys:
//! - `webauthn:reg:{user_id}` / `webauthn:auth:{user_id}`: ceremony state, expires after the TTL
//! - `webauthn:cred:{user_id}`: the user's passkey, no expiry

use crate::domain::{CeremonyKind, ChallengeError, ChallengeStore, ChallengeStorePtr};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub fn create_redis_challenge_store(client: Client, challenge_ttl: Duration) -> ChallengeStorePtr {
    // ---
    Arc::new(RedisChallengeStore::new(client, challenge_ttl))
}

pub struct RedisChallengeStore {
    // ---
    client: Client,
    challenge_ttl: Duration,
}

impl RedisChallengeStore {
    // ---
    pub fn new(client: Client, challenge_ttl: Duration) -> Self {
        // ---
        Self {
            client,
            challenge_ttl,
        }
    }

    async fn conn(&self) -> Result<MultiplexedConnection, ChallengeError> {
        // ---
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| {
                tracing::error!("Failed to connect to Redis: {:?}", err);
                ChallengeError::from(err)
            })
    }

    fn challenge_key(kind: CeremonyKind, user_id: Uuid) -> String {
        format!("webauthn:{}:{}", kind.key_segment(), user_id)
    }

    fn credential_key(user_id: Uuid) -> String {
        format!("webauthn:cred:{user_id}")
    }
}

#[async_trait::async_trait]
impl ChallengeStore for RedisChallengeStore {
    // ---
    async fn ping(&self) -> Result<(), ChallengeError> {
        // ---
        let mut conn = self.conn().await?;
        let _: String = conn.ping().await?;
        Ok(())
    }

    async fn put_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
        challenge: &[u8],
    ) -> Result<(), ChallengeError> {
        // ---
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(
            Self::challenge_key(kind, user_id),
            challenge,
            self.challenge_ttl.as_secs().max(1),
        )
        .await?;

        tracing::debug!(%user_id, %kind, "Challenge stored");
        Ok(())
    }

    async fn get_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
    ) -> Result<Vec<u8>, ChallengeError> {
        // ---
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(Self::challenge_key(kind, user_id)).await?;
        value.ok_or(ChallengeError::NotFound)
    }

    async fn take_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
    ) -> Result<Vec<u8>, ChallengeError> {
        // ---
        // GETDEL makes the read and the delete one atomic step.
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get_del(Self::challenge_key(kind, user_id)).await?;
        value.ok_or(ChallengeError::NotFound)
    }

    async fn put_credential(&self, user_id: Uuid, credential: &[u8]) -> Result<(), ChallengeError> {
        // ---
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(Self::credential_key(user_id), credential)
            .await?;
        Ok(())
    }

    async fn get_credential(&self, user_id: Uuid) -> Result<Vec<u8>, ChallengeError> {
        // ---
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(Self::credential_key(user_id)).await?;
        value.ok_or(ChallengeError::NotFound)
    }

    async fn delete_credential(&self, user_id: Uuid) -> Result<(), ChallengeError> {
        // ---
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(Self::credential_key(user_id)).await?;
        Ok(())
    }
}
