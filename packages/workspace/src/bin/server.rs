use anyhow::Context;
use clap::Parser;
use folio_editor::{Registry, Schema};
use folio_workspace::{router, AppState, Args, PersistenceGateway};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Registry paths that drifted from the schema would deep-link nowhere
    Registry::site()
        .check(Schema::site())
        .context("section registry does not match the content schema")?;

    let store = args.build_store()?;
    let gateway = Arc::new(PersistenceGateway::new(
        store,
        Arc::new(args.rate_limiter()),
        args.gateway_config(),
    ));

    tracing::info!(
        mode = ?args.mode,
        content_dir = ?args.content_dir,
        listen = %args.listen,
        "Starting folio server"
    );

    let app = router(AppState { gateway }).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
