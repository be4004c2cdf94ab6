//! Argon2id password hashing.

use anyhow::{anyhow, Result};
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use std::sync::OnceLock;

/// Hashes a password into a PHC string (salt and parameters embedded).
pub fn hash_password(password: &str) -> Result<String> {
    // ---
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {e}"))
}

/// Returns `false` for a mismatch and for an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    // ---
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

/// A hash of a random password, built with the same parameters as real ones.
///
/// Checked against when there is no stored hash, so unknown emails and
/// passkey-only accounts cost as much as a wrong password.
fn dummy_hash() -> Option<&'static str> {
    // ---
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let throwaway = SaltString::generate(&mut OsRng);
            hash_password(throwaway.as_str())
                .map_err(|e| tracing::error!("Failed to build dummy password hash: {e}"))
                .ok()
        })
        .as_deref()
}

/// Verifies a login attempt against an account's stored hash, if any.
///
/// Without a stored hash the password is still run through Argon2 and the
/// result is always `false`.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> bool {
    // ---
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = dummy_hash() {
                verify_password(password, dummy);
            }
            false
        }
    }
}
