//! Notion Pages - renders a Notion workspace as a small portfolio site.

mod blocks;
mod config;
mod error;
mod layout;
mod links;
mod notion;
mod renderer;
mod rich_text;
mod service;
mod site;
mod synced;

use config::SiteConfig;
use notion::NotionClient;
use renderer::Renderer;
use service::ContentService;
use site::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "notion_pages=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SiteConfig::from_env()?;
    info!(
        "Catalog database {}, fetch timeout {:?}, sync depth {}",
        config.notion.database_id, config.render.fetch_timeout, config.render.max_depth
    );

    let service: Arc<dyn ContentService> = Arc::new(NotionClient::new(config.notion.clone())?);
    info!("Notion client initialized");

    let state = AppState {
        renderer: Arc::new(Renderer::new(service.clone(), config.render.clone())),
        service,
        about_page_id: config.about_page_id.clone(),
        contact_page_id: config.contact_page_id.clone(),
    };

    let app = site::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
