//! Audio/video converters that shell out to ffmpeg.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::scratch;
use super::traits::{ConversionError, ConversionResult, Converter, media_type, single_input};

/// Longest excerpt turned into a GIF, in seconds.
pub const GIF_MAX_SECONDS: u32 = 10;
pub const GIF_FPS: u32 = 10;

/// Run an external program to completion, turning a non-zero exit into an error.
pub(crate) async fn run_program(program: &Path, args: &[OsString]) -> Result<(), ConversionError> {
    let name = program.display().to_string();
    debug!(program = %name, ?args, "Running external tool");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ConversionError::ExternalTool {
            program: name.clone(),
            detail: format!("failed to start: {e}"),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: Vec<&str> = stderr.trim().lines().rev().take(5).collect();
    Err(ConversionError::ExternalTool {
        program: name,
        detail: format!(
            "exit code {}: {}",
            output
                .status
                .code()
                .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
            tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
        ),
    })
}

/// ffmpeg invocation writing to a scratch file that never outlives the call.
#[derive(Debug, Clone)]
struct FfmpegJob {
    ffmpeg: PathBuf,
    scratch_dir: PathBuf,
}

impl FfmpegJob {
    async fn run(
        &self,
        input: &Path,
        input_opts: &[&str],
        output_opts: &[&str],
        suffix: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        let output = scratch::reserve(&self.scratch_dir, suffix).await?;

        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
        args.extend(input_opts.iter().map(OsString::from));
        args.push("-i".into());
        args.push(input.into());
        args.extend(output_opts.iter().map(OsString::from));
        args.push("-y".into());
        args.push(output.to_path_buf().into());

        run_program(&self.ffmpeg, &args).await?;
        Ok(scratch::take(output).await?)
    }
}

/// `mp4-to-mp3`: audio track only, 44.1 kHz at 192 kbit/s.
pub struct ExtractAudio {
    job: FfmpegJob,
}

impl ExtractAudio {
    pub fn new(ffmpeg: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            job: FfmpegJob {
                ffmpeg: ffmpeg.into(),
                scratch_dir: scratch_dir.into(),
            },
        }
    }
}

#[async_trait]
impl Converter for ExtractAudio {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        let bytes = self
            .job
            .run(
                &input,
                &[],
                &["-vn", "-acodec", "libmp3lame", "-ar", "44100", "-b:a", "192k"],
                ".mp3",
            )
            .await?;
        Ok(ConversionResult::new(bytes, media_type("audio/mpeg"), "audio.mp3"))
    }
}

/// `video-compressor`: H.264 at 900 kbit/s, AAC audio.
pub struct CompressVideo {
    job: FfmpegJob,
}

impl CompressVideo {
    pub fn new(ffmpeg: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            job: FfmpegJob {
                ffmpeg: ffmpeg.into(),
                scratch_dir: scratch_dir.into(),
            },
        }
    }
}

#[async_trait]
impl Converter for CompressVideo {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        let bytes = self
            .job
            .run(
                &input,
                &[],
                &[
                    "-c:v", "libx264", "-b:v", "900k", "-preset", "medium", "-c:a", "aac",
                    "-movflags", "+faststart",
                ],
                ".mp4",
            )
            .await?;
        Ok(ConversionResult::new(bytes, media_type("video/mp4"), "compressed.mp4"))
    }
}

/// `video-to-gif`: first ten seconds at 10 fps, looping forever.
pub struct VideoToGif {
    job: FfmpegJob,
}

impl VideoToGif {
    pub fn new(ffmpeg: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            job: FfmpegJob {
                ffmpeg: ffmpeg.into(),
                scratch_dir: scratch_dir.into(),
            },
        }
    }
}

#[async_trait]
impl Converter for VideoToGif {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        let duration = GIF_MAX_SECONDS.to_string();
        let filter = format!("fps={GIF_FPS}");
        let bytes = self
            .job
            .run(
                &input,
                &["-t", &duration],
                &["-vf", &filter, "-loop", "0"],
                ".gif",
            )
            .await?;
        Ok(ConversionResult::new(bytes, mime::IMAGE_GIF, "clip.gif"))
    }
}
