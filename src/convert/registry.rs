use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::background::RemoveBackground;
use super::document::WordToPdf;
use super::media::{CompressVideo, ExtractAudio, VideoToGif};
use super::pdf::{CompressPdf, ImagesToPdf, MergePdf};
use super::raster::{JpegReencode, PngReencode};
use super::traits::{ConversionError, ConversionResult, Converter};
use crate::config::ExternalToolsConfig;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("converter not found: {0}")]
    NotFound(String),
}

impl From<RegistryError> for ConversionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => ConversionError::UnsupportedTool(id),
        }
    }
}

/// Registry mapping tool ids to converter instances.
///
/// Built once at startup and shared read-only; adding a tool means one more
/// `register` call.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: BTreeMap<String, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            converters: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool_id: impl Into<String>, converter: Arc<dyn Converter>) {
        self.converters.insert(tool_id.into(), converter);
    }

    pub fn get(&self, tool_id: &str) -> Result<Arc<dyn Converter>, RegistryError> {
        self.converters
            .get(tool_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(tool_id.to_string()))
    }

    pub fn has_converter(&self, tool_id: &str) -> bool {
        self.converters.contains_key(tool_id)
    }

    pub fn tool_ids(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    /// Look up the tool's converter and run it once. No retries.
    pub async fn convert(
        &self,
        tool_id: &str,
        inputs: &[PathBuf],
    ) -> Result<ConversionResult, ConversionError> {
        let converter = self.get(tool_id)?;
        converter.convert(inputs).await
    }

    /// Registry with every built-in tool.
    pub fn with_defaults(external: &ExternalToolsConfig, scratch_dir: &Path) -> Self {
        let mut registry = Self::new();

        registry.register("compress-pdf", Arc::new(CompressPdf));
        registry.register("merge-pdf", Arc::new(MergePdf));
        registry.register("word-to-pdf", Arc::new(WordToPdf));
        registry.register("png-to-pdf", Arc::new(ImagesToPdf));
        registry.register(
            "png-to-jpg",
            Arc::new(JpegReencode {
                quality: 85,
                download_name: "image.jpg",
            }),
        );
        registry.register("jpg-to-png", Arc::new(PngReencode));
        registry.register(
            "image-compressor",
            Arc::new(JpegReencode {
                quality: 60,
                download_name: "compressed.jpg",
            }),
        );
        registry.register(
            "remove-bg",
            Arc::new(RemoveBackground::new(&external.rembg, scratch_dir)),
        );
        registry.register(
            "mp4-to-mp3",
            Arc::new(ExtractAudio::new(&external.ffmpeg, scratch_dir)),
        );
        registry.register(
            "video-compressor",
            Arc::new(CompressVideo::new(&external.ffmpeg, scratch_dir)),
        );
        registry.register(
            "video-to-gif",
            Arc::new(VideoToGif::new(&external.ffmpeg, scratch_dir)),
        );

        registry
    }
}
