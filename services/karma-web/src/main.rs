//! Karma Web Server
//!
//! Serves the onboarding wizard under `/dashboard` and the static marketing
//! pages (landing, agent quick-start) from the static directory.

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use karma_sdk::Config;
use karma_web::{router, AppState};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Karma Web Server - onboarding wizard and marketing pages
#[derive(Parser, Debug)]
#[command(name = "karma-web")]
#[command(about = "Karma agent card onboarding wizard and website")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "KARMA_WEB_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, env = "KARMA_WEB_PORT", default_value = "3090")]
    port: u16,

    /// Static files directory
    #[arg(long, env = "KARMA_WEB_STATIC_DIR", default_value = "static")]
    static_dir: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse CLI arguments
    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let config = Config::from_env();
    info!("Karma API: {}", config.base_url);
    let state = Arc::new(AppState::new(config));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .fallback_service(
            ServeDir::new(&args.static_dir)
                .append_index_html_on_directories(true)
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Starting Karma Web Server");
    info!("Listening on http://{}", addr);
    info!("Static files: {}", args.static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
