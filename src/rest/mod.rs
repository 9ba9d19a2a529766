// rest/mod.rs — HTTP surface for the browser client.
//
// Axum server bridging the form to the dispatcher/parser core.
//
// Endpoints:
//   GET  /                        embedded query form
//   POST /api/v1/consultations    run one batch, return parsed results
//   GET  /api/v1/health           status/version/uptime

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;

const INDEX_HTML: &str = include_str!("index.html");

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("consultation service listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route(
            "/api/v1/consultations",
            post(routes::consultations::create_consultation),
        )
        .route("/api/v1/health", get(routes::health::health))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
