//! Conversion dispatch: one [`Converter`] per tool id.
//!
//! PDF, image and DOCX work runs in-process on the blocking pool. Video and
//! background removal run as external processes (`ffmpeg`, `rembg`) writing to
//! scratch files that are deleted before `convert` returns.

mod background;
mod document;
mod media;
mod pdf;
mod raster;
mod registry;
mod scratch;
mod traits;

pub use background::RemoveBackground;
pub use document::{WordToPdf, docx_paragraphs, paragraphs_to_pdf};
pub use media::{CompressVideo, ExtractAudio, GIF_FPS, GIF_MAX_SECONDS, VideoToGif};
pub use pdf::{CompressPdf, ImagesToPdf, MergePdf, compress_pdf, images_to_pdf, merge_pdfs};
pub use raster::{JpegReencode, PngReencode, encode_jpeg, encode_png_rgba, flatten_on_white};
pub use registry::{ConverterRegistry, RegistryError};
pub use traits::{ConversionError, ConversionResult, Converter};
