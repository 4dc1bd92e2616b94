//! DOCX to PDF as a plain text dump: paragraph text only, no styling.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Object, dictionary};
use quick_xml::Reader;
use quick_xml::events::Event;

use super::pdf::PdfBuilder;
use super::traits::{ConversionError, ConversionResult, Converter, run_blocking, single_input};

const PAGE_WIDTH: f32 = 595.2756;
const PAGE_HEIGHT: f32 = 841.8898;
const LEFT: f32 = 40.0;
const TOP_MARGIN: f32 = 40.0;
const BOTTOM_LIMIT: f32 = 60.0;
const LEADING: f32 = 14.0;
const FONT_SIZE: i64 = 12;
const MAX_LINE_CHARS: usize = 110;

/// Paragraph texts of a DOCX body, in document order.
///
/// Tabs come back as `\t` and soft line breaks as `\n`.
pub fn docx_paragraphs(path: &Path) -> Result<Vec<String>, ConversionError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ConversionError::Document(format!("not a DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ConversionError::Document(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)?;

    parse_paragraphs(&xml)
}

/// Collects only paragraphs that sit directly under `w:body`. Table cells
/// and text boxes nested inside a paragraph are skipped.
fn parse_paragraphs(xml: &str) -> Result<Vec<String>, ConversionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    let mut paragraph_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ConversionError::Document(format!("bad document.xml: {e}")))?;

        match event {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"w:p" => {
                        if paragraph_depth == 0 && under_body(&open) {
                            current = Some(String::new());
                        }
                        paragraph_depth += 1;
                    }
                    b"w:t" => in_text = paragraph_depth == 1,
                    _ => {}
                }
                open.push(name);
            }
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if paragraph_depth == 0 && under_body(&open) => {
                    paragraphs.push(String::new())
                }
                b"w:tab" if paragraph_depth == 1 => push_char(&mut current, '\t'),
                b"w:br" | b"w:cr" if paragraph_depth == 1 => push_char(&mut current, '\n'),
                _ => {}
            },
            Event::Text(text) if in_text => {
                let text = text
                    .unescape()
                    .map_err(|e| ConversionError::Document(format!("bad text run: {e}")))?;
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => {
                open.pop();
                match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:p" => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0 {
                            paragraphs.extend(current.take());
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn under_body(open: &[Vec<u8>]) -> bool {
    open.last().is_some_and(|name| name.as_slice() == b"w:body")
}

fn push_char(current: &mut Option<String>, c: char) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push(c);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    y: f32,
    text: String,
}

/// Flow paragraphs onto A4 pages, one line per paragraph line.
fn layout(paragraphs: &[String]) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT - TOP_MARGIN;
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = top;

    let mut advance = |page: &mut Vec<PlacedLine>, y: &mut f32| {
        *y -= LEADING;
        if *y < BOTTOM_LIMIT {
            pages.push(std::mem::take(page));
            *y = top;
        }
    };

    for paragraph in paragraphs {
        let text = paragraph.trim();
        if text.is_empty() {
            advance(&mut page, &mut y);
            continue;
        }
        for line in text.split('\n') {
            let line: String = line
                .replace('\t', "    ")
                .chars()
                .take(MAX_LINE_CHARS)
                .collect();
            page.push(PlacedLine { y, text: line });
            advance(&mut page, &mut y);
        }
    }

    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }
    pages
}

/// Characters WinAnsiEncoding places at 0x80..=0x9F; `None` marks unused codes.
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Encode for Helvetica's WinAnsi encoding; characters it lacks become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => WIN_ANSI_HIGH
                .iter()
                .position(|&slot| slot == Some(c))
                .map_or(b'?', |offset| 0x80 + offset as u8),
        })
        .collect()
}

pub fn paragraphs_to_pdf(paragraphs: &[String]) -> Result<Vec<u8>, ConversionError> {
    let mut builder = PdfBuilder::new();
    let font_id = builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    for lines in layout(paragraphs) {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new("Td", vec![LEFT.into(), line.y.into()]),
                Operation::new("Tj", vec![Object::string_literal(win_ansi(&line.text))]),
                Operation::new("ET", vec![]),
            ]);
        }
        let resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };
        builder.add_page(PAGE_WIDTH, PAGE_HEIGHT, Content { operations }, resources)?;
    }

    builder.finish()
}

pub struct WordToPdf;

#[async_trait]
impl Converter for WordToPdf {
    async fn convert(&self, inputs: &[PathBuf]) -> Result<ConversionResult, ConversionError> {
        let input = single_input(inputs)?;
        run_blocking(move || {
            let paragraphs = docx_paragraphs(&input)?;
            let bytes = paragraphs_to_pdf(&paragraphs)?;
            Ok(ConversionResult::new(bytes, mime::APPLICATION_PDF, "document.pdf"))
        })
        .await
    }
}
