use std::net::SocketAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    services::ServeFile,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, error, info};

use super::{services, site, state::AppState};
use crate::config::Config;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the full router around `state`.
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.uploads.max_upload_size.as_u64()).unwrap_or(usize::MAX);
    let favicon = ServeFile::new(state.config.server.static_dir.join("favicon.ico"));

    Router::new()
        .route("/", get(site::index))
        .route("/how-to-use", get(site::how_to_use))
        .route("/robots.txt", get(site::robots))
        .route("/sitemap.xml", get(site::sitemap))
        .route("/health", get(site::health))
        .route_service("/favicon.ico", favicon)
        .route(
            "/tool/{tool_id}",
            get(services::tool_page).post(services::submit_tool),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Serve until Ctrl+C or SIGTERM. `address` overrides `server.bind_addr`.
pub async fn run(config: Config, address: Option<SocketAddr>) -> Result<(), AnyError> {
    let address = address.unwrap_or(config.server.bind_addr);

    tokio::fs::create_dir_all(&config.uploads.upload_dir)
        .await
        .map_err(|e| {
            format!(
                "Failed to create upload dir {}: {e}",
                config.uploads.upload_dir.display()
            )
        })?;
    info!(
        upload_dir = %config.uploads.upload_dir.display(),
        max_upload_size = %config.uploads.max_upload_size,
        "Upload directory ready"
    );

    let state = AppState::new(config);
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "PDFvert listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
