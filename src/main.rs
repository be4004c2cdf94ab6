use anyhow::Result;
use exptr_api::{init_tracing, serve, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; real environment variables take precedence.
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    serve(config).await
}
