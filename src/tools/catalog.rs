use std::collections::HashMap;
use thiserror::Error;

/// Display and intake metadata for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Value of the upload form's `accept` attribute, e.g. `.jpg,.jpeg` or `video/*`
    pub accepted_extensions: &'static [&'static str],
    pub allows_multiple_files: bool,
    pub description: &'static str,
}

impl ToolDescriptor {
    /// Comma-joined form of [`Self::accepted_extensions`], as HTML `accept` expects.
    pub fn accept_attr(&self) -> String {
        self.accepted_extensions.join(",")
    }

    pub fn path(&self) -> String {
        format!("/tool/{}", self.id)
    }
}

#[derive(Debug, Error)]
#[error("tool not found: {0}")]
pub struct NotFound(pub String);

const BUILTIN_TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        id: "compress-pdf",
        title: "Compress PDF",
        accepted_extensions: &[".pdf"],
        allows_multiple_files: false,
        description: "Reduce PDF size by optimizing content and structure. Perfect for email or uploads.",
    },
    ToolDescriptor {
        id: "merge-pdf",
        title: "Merge PDF",
        accepted_extensions: &[".pdf"],
        allows_multiple_files: true,
        description: "Combine multiple PDF files into one in the order you upload them.",
    },
    ToolDescriptor {
        id: "word-to-pdf",
        title: "Word → PDF",
        accepted_extensions: &[".docx"],
        allows_multiple_files: false,
        description: "Convert DOCX into a simple, shareable PDF.",
    },
    ToolDescriptor {
        id: "png-to-pdf",
        title: "PNG → PDF",
        accepted_extensions: &[".png"],
        allows_multiple_files: true,
        description: "Convert one or multiple PNG images into a single PDF document.",
    },
    ToolDescriptor {
        id: "png-to-jpg",
        title: "PNG → JPG",
        accepted_extensions: &[".png"],
        allows_multiple_files: false,
        description: "Convert transparent PNG into JPG for smaller file size.",
    },
    ToolDescriptor {
        id: "jpg-to-png",
        title: "JPG → PNG",
        accepted_extensions: &[".jpg", ".jpeg"],
        allows_multiple_files: false,
        description: "Convert JPG to PNG (supports transparency).",
    },
    ToolDescriptor {
        id: "image-compressor",
        title: "Image Compressor",
        accepted_extensions: &[".jpg", ".jpeg", ".png"],
        allows_multiple_files: false,
        description: "Compress images to reduce size with minimal quality loss.",
    },
    ToolDescriptor {
        id: "remove-bg",
        title: "Background Remover",
        accepted_extensions: &[".jpg", ".jpeg", ".png"],
        allows_multiple_files: false,
        description: "Remove background from photos using AI.",
    },
    ToolDescriptor {
        id: "mp4-to-mp3",
        title: "MP4 → MP3",
        accepted_extensions: &[".mp4"],
        allows_multiple_files: false,
        description: "Extract audio from video into MP3 format.",
    },
    ToolDescriptor {
        id: "video-compressor",
        title: "Video Compressor",
        accepted_extensions: &["video/*"],
        allows_multiple_files: false,
        description: "Compress video to a shareable size with good quality.",
    },
    ToolDescriptor {
        id: "video-to-gif",
        title: "Video → GIF",
        accepted_extensions: &["video/*"],
        allows_multiple_files: false,
        description: "Create a short animated GIF from your video.",
    },
];

/// Immutable tool table, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    by_id: HashMap<&'static str, usize>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        let by_id = tools
            .iter()
            .enumerate()
            .map(|(index, tool)| (tool.id, index))
            .collect();
        Self { tools, by_id }
    }

    /// Catalog of every tool this service ships.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_TOOLS.to_vec())
    }

    pub fn lookup(&self, id: &str) -> Result<&ToolDescriptor, NotFound> {
        self.by_id
            .get(id)
            .map(|&index| &self.tools[index])
            .ok_or_else(|| NotFound(id.to_string()))
    }

    /// Tools in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
