//! In-process backends for development and tests.
//!
//! Selected with `EXPTR_STORAGE_TYPE=memory`. Nothing survives a restart.

mod challenges;
mod repository;
mod sessions;

pub use challenges::MemoryChallengeStore;
pub use repository::MemoryRepository;
pub use sessions::MemorySessionStore;

use crate::domain::{ChallengeStorePtr, RepositoryPtr, SessionStorePtr};
use std::sync::Arc;
use std::time::Duration;

pub fn create_memory_repository() -> RepositoryPtr {
    Arc::new(MemoryRepository::new())
}

pub fn create_memory_session_store() -> SessionStorePtr {
    Arc::new(MemorySessionStore::new())
}

pub fn create_memory_challenge_store(challenge_ttl: Duration) -> ChallengeStorePtr {
    Arc::new(MemoryChallengeStore::new(challenge_ttl))
}
