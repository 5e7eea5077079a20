use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use urbanfix_common::Config;
use urbanfix_grouping::{GroupingEngine, GroupingService, JsonFileIssueSource};

mod rest;

pub struct AppState {
    pub service: GroupingService,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("urbanfix=info".parse()?))
        .init();

    let config = Config::from_env()?;
    config.log_redacted();

    let source = JsonFileIssueSource::new(config.require_issues_path()?);
    let engine = GroupingEngine::from_config(&config);
    let state = Arc::new(AppState {
        service: GroupingService::new(Arc::new(source), engine),
    });

    let app = rest::router(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("UrbanFix risk API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
