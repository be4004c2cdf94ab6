mod database;
pub mod memory;
pub mod metrics;
mod redis_store;
mod sweeper;
mod webauthn;

// Re-export the factory functions for easy access
pub use database::{connect_with_retry, create_postgres_repository, create_postgres_session_store};
pub use memory::{
    create_memory_challenge_store, create_memory_repository, create_memory_session_store,
    MemoryChallengeStore, MemoryRepository, MemorySessionStore,
};
pub use self::metrics::{create_noop_metrics, create_prom_metrics};
pub use redis_store::create_redis_challenge_store;
pub use sweeper::{spawn_session_sweeper, sweep_once};
pub use webauthn::{create_webauthn, create_webauthn_verifier, WebauthnVerifier};
