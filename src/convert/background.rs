use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;

use super::media::run_program;
use super::scratch;
use super::traits::{ConversionError, ConversionResult, Converter, single_input};

/// `remove-bg`: delegates segmentation to the `rembg` CLI.
pub struct RemoveBackground {
    rembg: PathBuf,
    scratch_dir: PathBuf,
}

impl RemoveBackground {
    pub fn new(rembg: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            rembg: rembg.into(),
            scratch_dir: scratch_dir.into(),
        }
    }
}

#[async_trait]
impl Converter for RemoveBackground {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        let output = scratch::reserve(&self.scratch_dir, ".png").await?;

        let args: Vec<OsString> = vec!["i".into(), input.into(), output.to_path_buf().into()];
        run_program(&self.rembg, &args).await?;

        let bytes = scratch::take(output).await?;
        Ok(ConversionResult::new(bytes, mime::IMAGE_PNG, "no-bg.png"))
    }
}
