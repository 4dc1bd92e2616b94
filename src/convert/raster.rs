//! Raster re-encoders: PNG/JPEG in, JPEG or PNG out.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};

use super::traits::{ConversionError, ConversionResult, Converter, run_blocking, single_input};

fn decode(path: &Path) -> Result<DynamicImage, ConversionError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Composite onto a white background, dropping the alpha channel.
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ConversionError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(image)?;
    Ok(out)
}

pub fn encode_png_rgba(image: &DynamicImage) -> Result<Vec<u8>, ConversionError> {
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    let mut out = Cursor::new(Vec::new());
    rgba.write_with_encoder(PngEncoder::new_with_quality(
        &mut out,
        CompressionType::Best,
        FilterType::Adaptive,
    ))?;
    Ok(out.into_inner())
}

/// Re-encode any decodable raster as JPEG at a fixed quality.
///
/// Registered twice: `png-to-jpg` at 85 and `image-compressor` at 60.
pub struct JpegReencode {
    pub quality: u8,
    pub download_name: &'static str,
}

#[async_trait]
impl Converter for JpegReencode {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        let (quality, name) = (self.quality, self.download_name);
        run_blocking(move || {
            let flattened = flatten_on_white(&decode(&input)?);
            let bytes = encode_jpeg(&flattened, quality)?;
            Ok(ConversionResult::new(bytes, mime::IMAGE_JPEG, name))
        })
        .await
    }
}

/// Lossless PNG with an alpha channel.
pub struct PngReencode;

#[async_trait]
impl Converter for PngReencode {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        run_blocking(move || {
            let bytes = encode_png_rgba(&decode(&input)?)?;
            Ok(ConversionResult::new(bytes, mime::IMAGE_PNG, "image.png"))
        })
        .await
    }
}
