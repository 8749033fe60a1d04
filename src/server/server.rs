use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::feed::PostFeed;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes as metrics_routes;
use crate::server::routes;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<PostFeed>,
    pub metrics: Arc<Metrics>,
    pub admin_secret: Arc<str>,
}

impl AppState {
    pub async fn new(feed: PostFeed, admin_secret: &str) -> Self {
        Self {
            feed: Arc::new(feed),
            metrics: get_metrics().await.clone(),
            admin_secret: Arc::from(admin_secret),
        }
    }
}

pub fn router(state: AppState, settings: &SettingsConfig) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/reddit-posts", get(routes::reddit_posts))
        .route("/posts", get(routes::posts))
        .route("/admin/status", get(routes::admin_status))
        .merge(metrics_routes::router(&settings.metrics))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn start(settings: &SettingsConfig, state: AppState) -> Result<()> {
    let app = router(state.clone(), settings);

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on {}", bind_addr);
    state.metrics.up.set(1);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    state.metrics.up.set(0);
    Ok(())
}
