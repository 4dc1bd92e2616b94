//! PDF converters built on lopdf: compress, merge and raster-to-PDF.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageReader;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use super::traits::{ConversionError, ConversionResult, Converter, run_blocking, single_input};

/// Incrementally assembles a flat single-level page tree.
pub(crate) struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub(crate) fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    pub(crate) fn add_page(
        &mut self,
        width: f32,
        height: f32,
        content: Content,
        resources: Dictionary,
    ) -> Result<(), ConversionError> {
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    pub(crate) fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub(crate) fn finish(mut self) -> Result<Vec<u8>, ConversionError> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        save(&mut self.doc)
    }
}

fn save(doc: &mut Document) -> Result<Vec<u8>, ConversionError> {
    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Value of an object's `/Type` entry, if it is a dictionary that has one.
fn type_name(object: &Object) -> Option<&[u8]> {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|value| value.as_name().ok())
}

/// Rewrite a PDF without unreferenced objects and with every stream deflated.
///
/// Never returns something larger than the input: if optimizing does not
/// help, the original bytes come back unchanged.
pub fn compress_pdf(path: &Path) -> Result<Vec<u8>, ConversionError> {
    let original = std::fs::read(path)?;
    let mut doc = Document::load_mem(&original)?;

    let pruned = doc.prune_objects();
    let emptied = doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();
    let optimized = save(&mut doc)?;

    debug!(
        pruned = pruned.len(),
        emptied = emptied.len(),
        before = original.len(),
        after = optimized.len(),
        "Optimized PDF"
    );

    Ok(if optimized.len() < original.len() {
        optimized
    } else {
        original
    })
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITED_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Bound on the `Parent` walk, in case a malformed tree loops.
const MAX_TREE_DEPTH: usize = 64;

/// Copy attributes the page inherits from its page-tree ancestors onto the
/// page itself, so it keeps its size and fonts once reparented.
fn pin_inherited(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        for key in INHERITED_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }

        depth += 1;
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}

/// Concatenate PDFs page by page in the given order.
///
/// Every page is hung off a single new `Pages` root. The first input's
/// catalog is kept without its outlines.
pub fn merge_pdfs(paths: &[PathBuf]) -> Result<Vec<u8>, ConversionError> {
    if paths.is_empty() {
        return Err(ConversionError::MissingInput);
    }

    let mut merged = Document::with_version("1.5");
    let mut next_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut catalog: Option<(ObjectId, Dictionary)> = None;

    for path in paths {
        let mut doc = Document::load(path)?;
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        // get_pages is keyed by page number, so this keeps reading order.
        for page_id in doc.get_pages().into_values() {
            let mut page = doc.get_dictionary(page_id)?.clone();
            pin_inherited(&doc, &mut page);
            pages.push((page_id, page));
        }

        for (object_id, object) in doc.objects {
            let kind = type_name(&object).map(<[u8]>::to_vec);
            match kind.as_deref() {
                Some(b"Catalog") => {
                    if catalog.is_none() {
                        catalog = Some((object_id, object.as_dict()?.clone()));
                    }
                }
                Some(b"Pages") | Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
                _ => {
                    merged.objects.insert(object_id, object);
                }
            }
        }
    }

    if pages.is_empty() {
        return Err(ConversionError::Document("inputs contain no pages".into()));
    }
    let (catalog_id, mut catalog_dict) =
        catalog.ok_or_else(|| ConversionError::Document("input has no catalog".into()))?;

    let pages_id = (next_id, 0);
    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let page_count = pages.len();

    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        merged.objects.insert(page_id, Object::Dictionary(page));
    }
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );

    catalog_dict.set("Pages", pages_id);
    catalog_dict.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog_dict));

    merged.trailer.set("Root", catalog_id);
    merged.max_id = next_id;
    merged.renumber_objects();
    merged.compress();

    debug!(inputs = paths.len(), pages = page_count, "Merged PDFs");
    save(&mut merged)
}

/// Place each image on its own page, sized 1pt per pixel.
pub fn images_to_pdf(paths: &[PathBuf]) -> Result<Vec<u8>, ConversionError> {
    if paths.is_empty() {
        return Err(ConversionError::MissingInput);
    }

    let mut builder = PdfBuilder::new();

    for path in paths {
        let rgb = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .to_rgb8();
        let (width, height) = rgb.dimensions();

        let image_id = builder.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb.into_raw(),
        ));

        let (w, h) = (width as f32, height as f32);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        };

        builder.add_page(w, h, content, resources)?;
    }

    debug!(pages = builder.page_count(), "Embedded images into PDF");
    builder.finish()
}

pub struct CompressPdf;

#[async_trait]
impl Converter for CompressPdf {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        run_blocking(move || {
            let bytes = compress_pdf(&input)?;
            Ok(ConversionResult::new(bytes, mime::APPLICATION_PDF, "compressed.pdf"))
        })
        .await
    }
}

pub struct MergePdf;

#[async_trait]
impl Converter for MergePdf {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let inputs = inputs.to_vec();
        run_blocking(move || {
            let bytes = merge_pdfs(&inputs)?;
            Ok(ConversionResult::new(bytes, mime::APPLICATION_PDF, "merged.pdf"))
        })
        .await
    }
}

pub struct ImagesToPdf;

#[async_trait]
impl Converter for ImagesToPdf {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let inputs = inputs.to_vec();
        run_blocking(move || {
            let bytes = images_to_pdf(&inputs)?;
            Ok(ConversionResult::new(bytes, mime::APPLICATION_PDF, "images.pdf"))
        })
        .await
    }
}
