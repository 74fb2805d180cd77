//! HTTP surface: one page at `/`.
//!
//! The two text inputs travel as the `user_id` and `product_id` query
//! parameters. Pipeline work is CPU-bound, so it runs on the blocking pool.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use pipeline::{PageInputs, RatingPipeline};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::render;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RatingPipeline>,
}

impl AppState {
    pub fn new(pipeline: RatingPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    Query(inputs): Query<PageInputs>,
) -> Result<Html<String>> {
    let pipeline = Arc::clone(&state.pipeline);
    let view = tokio::task::spawn_blocking(move || pipeline.render(&inputs))
        .await
        .context("Render task failed")??;

    Ok(Html(render::page(&view)))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(RatingPipeline::new(config.data_path.clone()));
    let app = router(state);

    let addr = config.bind_addr();
    info!("Serving {} on http://{}", config.data_path.display(), addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
