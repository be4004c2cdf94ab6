mod ceremony;
mod challenge;
mod metrics;
mod models;
mod repository;
mod session;
mod token;

// Publicly expose the Metrics abstraction
pub use self::metrics::{Metrics, MetricsPtr};

// Persistence abstractions
pub use models::{Category, CategoryInput, EntryKind, Operation, OperationInput, User};
pub use repository::{Repository, RepositoryPtr};
pub use session::{Session, SessionError, SessionStore, SessionStorePtr};

// Authentication abstractions
pub use ceremony::{CeremonyError, CeremonyStart, PasskeyVerifier, PasskeyVerifierPtr};
pub use challenge::{CeremonyKind, ChallengeError, ChallengeStore, ChallengeStorePtr};
pub use token::{TokenCodec, TokenCodecPtr, TokenError};
