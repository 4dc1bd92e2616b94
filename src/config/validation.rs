use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("site.name must not be empty")]
    EmptySiteName,

    #[error("site.url '{url}' must start with http:// or https://")]
    InvalidSiteUrl { url: String },

    #[error("uploads.max_upload_size must be positive")]
    ZeroUploadLimit,

    #[error("ads are enabled but ads.client is empty")]
    MissingAdsClient,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_site(config)?;
    validate_uploads(config)?;
    validate_ads(config)?;
    Ok(())
}

fn validate_site(config: &Config) -> Result<(), ValidationError> {
    if config.site.name.trim().is_empty() {
        return Err(ValidationError::EmptySiteName);
    }

    let url = &config.site.url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidSiteUrl { url: url.clone() });
    }

    Ok(())
}

fn validate_uploads(config: &Config) -> Result<(), ValidationError> {
    if config.uploads.max_upload_size.as_u64() == 0 {
        return Err(ValidationError::ZeroUploadLimit);
    }
    Ok(())
}

fn validate_ads(config: &Config) -> Result<(), ValidationError> {
    if config.ads.enabled && config.ads.client.trim().is_empty() {
        return Err(ValidationError::MissingAdsClient);
    }
    Ok(())
}
