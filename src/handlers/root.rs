use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Expense tracker API
Version: {version}

Public endpoints:
  - POST   /api/v1/users/signup                  - Create a password account
  - POST   /api/v1/users/login                   - Exchange email/password for a token
  - POST   /api/v1/users/webauthn/signup/begin   - Start passkey signup
  - POST   /api/v1/users/webauthn/signup/finish  - Finish passkey signup
  - POST   /api/v1/users/webauthn/login/begin    - Start passkey login
  - POST   /api/v1/users/webauthn/login/finish   - Finish passkey login
  - GET    /health                               - Light health check
  - GET    /health?mode=full                     - Full health check (includes backends)
  - GET    /metrics                              - Prometheus metrics

Authenticated endpoints (Authorization: Bearer <token>):
  - POST   /api/v1/users/logout
  - GET    /api/v1/categories
  - POST   /api/v1/categories/new
  - PUT    /api/v1/categories/{{id}}
  - DELETE /api/v1/categories/{{id}}
  - GET    /api/v1/operations
  - POST   /api/v1/operations/new
  - PUT    /api/v1/operations/{{id}}
  - DELETE /api/v1/operations/{{id}}
"#
    )
}
