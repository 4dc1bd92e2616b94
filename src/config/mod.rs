//! Service settings for PDFvert.
//!
//! Values are merged from, lowest to highest precedence: struct defaults, the
//! TOML file, a `.env` file, then process environment. The file path is
//! `$PDFVERT_CONFIG` when set and `config/pdfvert.toml` otherwise; a missing
//! file is not an error.
//!
//! Environment keys are `PDFVERT__<SECTION>__<KEY>`, for example
//! `PDFVERT__UPLOADS__MAX_UPLOAD_SIZE=100MB` or `PDFVERT__SITE__URL=https://convert.example`.
//!
//! ```no_run
//! use pdfvert::config::Config;
//!
//! let config = Config::load().expect("config");
//! assert!(config.uploads.max_upload_size.as_u64() > 0);
//! ```

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    AdsConfig, Config, ExternalToolsConfig, ServerConfig, SiteConfig, UploadConfig,
};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Merge every source and validate the result.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Same as [`Config::load`] but reading the TOML file at `path`.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[site]\nname = \"Mini\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.site.name, "Mini");
        assert_eq!(config.uploads.max_upload_size.as_megabytes(), 50);
    }

    #[test]
    fn test_validation_runs_after_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[ads]
enabled = true
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::MissingAdsClient)
        ));
    }

    #[test]
    fn test_malformed_size_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[uploads]\nmax_upload_size = \"lots\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::LoadError(_)));
    }
}
