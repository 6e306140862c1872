//! Map Notes Server
//!
//! Axum backend with the notes API and SPA serving.
//! Static files are embedded in the binary via rust-embed.

use anyhow::Context;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clap::Parser;
use http::header;
use rust_embed::Embed;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Config,
    handler::AppState,
    service::database::Database,
};

mod config;
mod handler;
mod service;

/// Embedded static files from dist/ directory
#[derive(Embed)]
#[folder = "../../dist/"]
struct Assets;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let database = match &config.data_file {
        Some(path) => Database::open(path)
            .with_context(|| format!("opening note table {}", path.display()))?,
        None => {
            tracing::warn!("no data file configured, notes are kept in memory only");
            Database::new()
        }
    };
    let state = AppState {
        database,
        list_limit: config.list_limit(),
    };

    let app = handler::with_logging(
        handler::router(state)
            .fallback(serve_embedded)
            .layer(handler::cors()),
    );

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    let addr = listener.local_addr()?;

    tracing::info!("Server listening on {addr}");
    tracing::info!("  - Notes API: http://{addr}/notes");
    tracing::info!("  - SPA (embedded): http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve embedded static files with SPA fallback
async fn serve_embedded(uri: axum::http::Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    let (path, content) = match Assets::get(path) {
        Some(content) => (path, content),
        // SPA fallback
        None => match Assets::get("index.html") {
            Some(content) => ("index.html", content),
            None => return StatusCode::NOT_FOUND.into_response(),
        },
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        [(header::CONTENT_TYPE, mime.as_ref())],
        content.data.into_owned(),
    )
        .into_response()
}
