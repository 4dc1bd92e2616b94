//! HTML pages rendered with askama templates from `templates/`.

use askama::Template;
use axum::response::Html;
use chrono::Datelike;

use super::error::ApiError;
use crate::config::{AdsConfig, Config};
use crate::tools::ToolDescriptor;

/// Values every page's `base.html` needs.
pub struct Layout {
    pub title: String,
    pub description: String,
    pub site_name: String,
    pub canonical: String,
    pub ads: AdsConfig,
    pub year: i32,
}

impl Layout {
    fn new(config: &Config, title: String, description: String, path: &str) -> Self {
        Self {
            title,
            description,
            site_name: config.site.name.clone(),
            canonical: format!("{}{path}", config.site.base_url()),
            ads: config.ads.clone(),
            year: chrono::Utc::now().year(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    layout: Layout,
    tools: Vec<&'a ToolDescriptor>,
}

#[derive(Template)]
#[template(path = "how_to_use.html")]
struct HowToUseTemplate {
    layout: Layout,
}

#[derive(Template)]
#[template(path = "tool.html")]
struct ToolTemplate<'a> {
    layout: Layout,
    tool: &'a ToolDescriptor,
    max_megabytes: u64,
}

pub fn index<'a>(
    config: &Config,
    tools: impl Iterator<Item = &'a ToolDescriptor>,
) -> Result<Html<String>, ApiError> {
    let site = &config.site.name;
    let page = IndexTemplate {
        layout: Layout::new(
            config,
            format!("{site} – Free Online File Converter Tools"),
            format!(
                "Convert PDF, PNG, JPG, and MP4 with {site} — free, fast, and no login required. \
                 Compress PDFs, merge files, convert images and videos online."
            ),
            "/",
        ),
        tools: tools.collect(),
    };
    Ok(Html(page.render()?))
}

pub fn how_to_use(config: &Config) -> Result<Html<String>, ApiError> {
    let site = &config.site.name;
    let page = HowToUseTemplate {
        layout: Layout::new(
            config,
            format!("How to Use {site} – Quick Guide"),
            format!(
                "Learn how to convert and compress files with {site}. \
                 Free online tools for PDF, image, and video with no sign-up."
            ),
            "/how-to-use",
        ),
    };
    Ok(Html(page.render()?))
}

pub fn tool(config: &Config, tool: &ToolDescriptor) -> Result<Html<String>, ApiError> {
    let site = &config.site.name;
    let page = ToolTemplate {
        layout: Layout::new(
            config,
            format!("{} Online – Free & Fast | {site}", tool.title),
            format!(
                "Use {site} to {} online. Free, secure, and no sign‑up. \
                 Upload your file and download instantly.",
                tool.title.to_lowercase()
            ),
            &tool.path(),
        ),
        tool,
        max_megabytes: config.uploads.max_upload_size.as_megabytes(),
    };
    Ok(Html(page.render()?))
}
