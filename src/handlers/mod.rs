// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod categories;
mod health;
mod metrics;
mod operations;
mod root;
mod shared_types;
mod users;
mod webauthn_authenticate;
mod webauthn_register;

// Core handlers
pub use health::health_check;
pub use self::metrics::{metrics_handler, track_http_metrics};
pub use root::root_handler;

// Shared response types
pub use shared_types::{ApiResponse, ErrorResponse};

// Account handlers
pub use users::{login, logout, signup};

// WebAuthn registration handlers
pub use webauthn_register::{passkey_signup_begin, passkey_signup_finish};

// WebAuthn authentication handlers
pub use webauthn_authenticate::{passkey_login_begin, passkey_login_finish};

// Finance data handlers
pub use categories::{create_category, delete_category, list_categories, update_category};
pub use operations::{create_operation, delete_operation, list_operations, update_operation};
