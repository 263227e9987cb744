use repo_templates::{CollectorConfig, FsRepositoryHost, TemplateCollector};
use repo_templates_server::{
    AppState,
    config::ServerConfig,
    create_router,
    error::{ApiError, Result},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "repo_templates_server=debug,repo_templates=info,tower_http=debug".to_string()
        }))
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!(
        "Starting Repository Templates Server on {}:{}",
        config.host, config.port
    );

    if !config.repository_root.is_dir() {
        warn!(
            "Repository root {} is not a directory, listings will be empty",
            config.repository_root.display()
        );
    }

    let host = FsRepositoryHost::new(&config.repository_root);
    let collector = TemplateCollector::new(Arc::new(host.clone()), Arc::new(host)).with_config(
        CollectorConfig {
            concurrency: config.scan_concurrency,
        },
    );

    let state = AppState {
        collector: Arc::new(collector),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ApiError::Config(format!("Invalid HOST value: {}", config.host)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
