use crate::domain::{CeremonyKind, ChallengeError, ChallengeStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Challenge store mirroring the Redis key semantics, including expiry.
pub struct MemoryChallengeStore {
    challenge_ttl: Duration,
    challenges: RwLock<HashMap<(CeremonyKind, Uuid), Entry>>,
    credentials: RwLock<HashMap<Uuid, Vec<u8>>>,
}

impl MemoryChallengeStore {
    // ---
    pub fn new(challenge_ttl: Duration) -> Self {
        // ---
        Self {
            challenge_ttl,
            challenges: RwLock::new(HashMap::new()),
            credentials: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl ChallengeStore for MemoryChallengeStore {
    // ---
    async fn ping(&self) -> Result<(), ChallengeError> {
        Ok(())
    }

    async fn put_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
        challenge: &[u8],
    ) -> Result<(), ChallengeError> {
        // ---
        let entry = Entry {
            value: challenge.to_vec(),
            expires_at: Instant::now() + self.challenge_ttl,
        };
        self.challenges.write().insert((kind, user_id), entry);
        Ok(())
    }

    async fn get_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
    ) -> Result<Vec<u8>, ChallengeError> {
        // ---
        self.challenges
            .read()
            .get(&(kind, user_id))
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
            .ok_or(ChallengeError::NotFound)
    }

    async fn take_challenge(
        &self,
        kind: CeremonyKind,
        user_id: Uuid,
    ) -> Result<Vec<u8>, ChallengeError> {
        // ---
        self.challenges
            .write()
            .remove(&(kind, user_id))
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value)
            .ok_or(ChallengeError::NotFound)
    }

    async fn put_credential(&self, user_id: Uuid, credential: &[u8]) -> Result<(), ChallengeError> {
        // ---
        self.credentials.write().insert(user_id, credential.to_vec());
        Ok(())
    }

    async fn get_credential(&self, user_id: Uuid) -> Result<Vec<u8>, ChallengeError> {
        // ---
        self.credentials
            .read()
            .get(&user_id)
            .cloned()
            .ok_or(ChallengeError::NotFound)
    }

    async fn delete_credential(&self, user_id: Uuid) -> Result<(), ChallengeError> {
        self.credentials.write().remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn challenges_are_scoped_by_kind() {
        // ---
        let store = MemoryChallengeStore::new(Duration::from_secs(60));
        let user_id = Uuid::new_v4();

        store
            .put_challenge(CeremonyKind::Registration, user_id, b"reg")
            .await
            .unwrap();

        assert!(matches!(
            store.get_challenge(CeremonyKind::Login, user_id).await,
            Err(ChallengeError::NotFound)
        ));
        assert_eq!(
            store.get_challenge(CeremonyKind::Registration, user_id).await.unwrap(),
            b"reg"
        );
    }

    #[tokio::test]
    async fn put_overwrites_and_take_consumes() {
        // ---
        let store = MemoryChallengeStore::new(Duration::from_secs(60));
        let user_id = Uuid::new_v4();

        store.put_challenge(CeremonyKind::Login, user_id, b"first").await.unwrap();
        store.put_challenge(CeremonyKind::Login, user_id, b"second").await.unwrap();

        assert_eq!(store.take_challenge(CeremonyKind::Login, user_id).await.unwrap(), b"second");
        assert!(matches!(
            store.take_challenge(CeremonyKind::Login, user_id).await,
            Err(ChallengeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn expired_challenge_is_not_found() {
        // ---
        let store = MemoryChallengeStore::new(Duration::ZERO);
        let user_id = Uuid::new_v4();

        store.put_challenge(CeremonyKind::Login, user_id, b"stale").await.unwrap();
        assert!(matches!(
            store.take_challenge(CeremonyKind::Login, user_id).await,
            Err(ChallengeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn credentials_persist_until_overwritten() {
        // ---
        let store = MemoryChallengeStore::new(Duration::ZERO);
        let user_id = Uuid::new_v4();

        assert!(matches!(store.get_credential(user_id).await, Err(ChallengeError::NotFound)));
        store.put_credential(user_id, b"v1").await.unwrap();
        store.put_credential(user_id, b"v2").await.unwrap();
        assert_eq!(store.get_credential(user_id).await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn delete_credential_is_idempotent() {
        // ---
        let store = MemoryChallengeStore::new(Duration::ZERO);
        let user_id = Uuid::new_v4();

        store.delete_credential(user_id).await.unwrap();
        store.put_credential(user_id, b"v1").await.unwrap();
        store.delete_credential(user_id).await.unwrap();
        assert!(matches!(store.get_credential(user_id).await, Err(ChallengeError::NotFound)));
    }
}
