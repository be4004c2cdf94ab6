use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Wrapper type for successful API responses.
///
/// Encapsulates the data payload and prepares it for JSON serialization.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection type shared by all JSON handlers.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    // ---
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

pub fn internal_error() -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Loose structural check: one `@`, a dot in the domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    // ---
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// ISO-4217 style three-letter uppercase code.
pub fn is_valid_currency(code: &str) -> bool {
    // ---
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        // ---
        assert!(is_valid_email("a@b.io"));
        assert!(is_valid_email("first.last+tag@example.com"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("space @example.com"));
        assert!(!is_valid_email("user@localhost"));
    }

    #[test]
    fn currency_validation() {
        // ---
        assert!(is_valid_currency("USD"));
        assert!(!is_valid_currency("usd"));
        assert!(!is_valid_currency("EURO"));
    }
}
