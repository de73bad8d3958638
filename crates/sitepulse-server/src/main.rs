use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use sitepulse_server::state::AppState;

/// `sitepulse health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$SITEPULSE_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("SITEPULSE_PORT").unwrap_or_else(|_| "5555".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sitepulse=info".parse()?),
        )
        .json()
        .init();

    let cfg = sitepulse_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.data_dir)?;
    let db_path = format!("{}/sitepulse.db", cfg.data_dir);
    let db = sitepulse_duckdb::DuckDbBackend::open(&db_path, &cfg.duckdb_memory_limit)?;

    match &cfg.allowed_site {
        Some(site) => info!(site = %site, "Accepting events for a single site"),
        None => tracing::warn!("SITEPULSE_ALLOWED_SITE unset; accepting events for any site"),
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let port = cfg.port;
    let timezone = cfg.timezone;
    let state = Arc::new(AppState::new(db, cfg));
    let app = sitepulse_server::app::build_app(state);

    info!(port, timezone = %timezone, "SitePulse listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
