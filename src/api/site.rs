//! Site and meta routes: home, guide, robots.txt, sitemap.xml, health.

use axum::{
    Json,
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};

use super::{error::ApiError, models::HealthResponse, pages, state::AppState};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    pages::index(&state.config, state.catalog.iter())
}

pub async fn how_to_use(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    pages::how_to_use(&state.config)
}

pub async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    let body = [
        "User-agent: *".to_string(),
        "Allow: /".to_string(),
        format!("Sitemap: {}/sitemap.xml", state.config.site.base_url()),
    ]
    .join("\n");

    ([(header::CONTENT_TYPE, "text/plain")], body)
}

pub async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let base = state.config.site.base_url();
    let paths = ["/".to_string(), "/how-to-use".to_string()]
        .into_iter()
        .chain(state.catalog.iter().map(|tool| tool.path()));

    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#.to_string(),
    ];
    lines.extend(paths.map(|path| format!("<url><loc>{base}{path}</loc></url>")));
    lines.push("</urlset>".to_string());

    ([(header::CONTENT_TYPE, "application/xml")], lines.join("\n"))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(state.metrics.snapshot()))
}
