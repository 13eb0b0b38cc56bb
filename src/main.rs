use gemini_relay::{AppContext, RetentionSweeper, create_app};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let ctx = AppContext::from_env()
        .map_err(|e| std::io::Error::other(format!("Failed to start: {e}")))?;

    // Daily retention sweep runs for the lifetime of the process.
    RetentionSweeper::spawn(ctx.sweeper.clone());

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    tracing::info!(
        address = %bind_address,
        provider = %ctx.gemini.config().provider,
        model = %ctx.gemini.config().model,
        "Starting gemini-relay server"
    );

    let server_ctx = ctx.clone();
    actix_web::HttpServer::new(move || create_app(&server_ctx))
        .bind(&bind_address)?
        .run()
        .await
}
