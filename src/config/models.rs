use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub external: ExternalToolsConfig,
    #[serde(default)]
    pub ads: AdsConfig,
}

/// Public identity of the site, used in page titles, robots.txt and the sitemap
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Public base URL; a trailing slash is tolerated
    #[serde(default = "default_site_url")]
    pub url: String,
}

impl SiteConfig {
    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            url: default_site_url(),
        }
    }
}

fn default_site_name() -> String {
    "PDFvert".to_string()
}

fn default_site_url() -> String {
    "https://pdfvert.com".to_string()
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Directory holding `favicon.ico`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

/// Upload intake limits and locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Maximum total request body size
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: ByteSize,
    /// Where uploaded files live for the duration of one request
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Where converters place their scratch outputs (system temp dir when unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl UploadConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            upload_dir: default_upload_dir(),
            scratch_dir: None,
        }
    }
}

fn default_max_upload_size() -> ByteSize {
    ByteSize::mebibytes(50)
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

/// Programs the media and background-removal converters shell out to
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExternalToolsConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    #[serde(default = "default_rembg")]
    pub rembg: PathBuf,
}

impl Default for ExternalToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            rembg: default_rembg(),
        }
    }
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_rembg() -> PathBuf {
    PathBuf::from("rembg")
}

/// AdSense placement. Only affects page markup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub slot_top: String,
    #[serde(default)]
    pub slot_bottom: String,
    #[serde(default)]
    pub slot_interstitial: String,
}
