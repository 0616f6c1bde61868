// SME Analytics - Web Server
// Serves the dashboard page and the JSON API

use anyhow::{Context, Result};
use sme_analytics::api::{router, AppState};
use sme_analytics::{load_config, logging, source_from_config, validate};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    logging::init(&config.logging.filter)?;

    println!("🌐 SME Analytics - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let source = source_from_config(&config)?;

    // Fail fast on a broken source instead of serving 500s
    let data = source.load().context("Initial dashboard load failed")?;
    let report = validate(&data);
    tracing::info!(source = source.name(), "startup validation: {}", report.summary());

    let state = AppState::new(Arc::from(source));
    let app = router(state);

    let addr = config.server.bind.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/dashboard", addr);
    println!("   UI:  http://{}", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
