use std::io::Cursor;
use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use image::{GenericImageView, ImageFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

use pdfvert::api::models::HealthResponse;
use pdfvert::api::{AppState, CONVERSION_FAILED_MESSAGE, router};
use pdfvert::config::{ByteSize, Config};
use pdfvert::tools::ToolCatalog;

const BOUNDARY: &str = "pdfvert-test-boundary";

struct TestApp {
    app: Router,
    state: AppState,
    uploads: TempDir,
    _scratch: TempDir,
}

impl TestApp {
    fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }

    fn leftover_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

/// Builds a test app with its own upload and scratch dirs
fn build_test_app_with_limit(limit: ByteSize) -> TestApp {
    let uploads = TempDir::new().expect("Failed to create upload dir");
    let scratch = TempDir::new().expect("Failed to create scratch dir");

    let mut config = Config::default();
    config.uploads.max_upload_size = limit;
    config.uploads.upload_dir = uploads.path().to_path_buf();
    config.uploads.scratch_dir = Some(scratch.path().to_path_buf());
    config.server.static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");

    let state = AppState::new(config);
    TestApp {
        app: router(state.clone()),
        state,
        uploads,
        _scratch: scratch,
    }
}

fn build_test_app() -> TestApp {
    build_test_app_with_limit(ByteSize::mebibytes(50))
}

/// Multipart body with one `file` part per entry.
fn multipart_body(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_files(tool_id: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .uri(format!("/tool/{tool_id}"))
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn png_bytes(image: RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Uncompressed PDF whose pages each draw their label, e.g. "A1", "A2".
fn labelled_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label}{n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
}

#[tokio::test]
async fn test_tool_page_for_every_known_tool() {
    let test = build_test_app();

    for tool in ToolCatalog::builtin().iter() {
        let response = test.send(get(&tool.path())).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", tool.id);

        let html = body_text(response).await;
        assert!(html.contains(&format!("accept=\"{}\"", tool.accept_attr())), "{}", tool.id);
        assert_eq!(
            html.contains("multiple required"),
            tool.allows_multiple_files,
            "{}",
            tool.id
        );
    }
}

#[tokio::test]
async fn test_unknown_tool_is_404() {
    let test = build_test_app();

    let response = test.send(get("/tool/pdf-to-word")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test
        .send(post_files("pdf-to-word", &[("a.pdf", b"%PDF")]))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(test.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_empty_selection_redirects_to_form() {
    let test = build_test_app();

    for tool in ToolCatalog::builtin().iter() {
        let response = test.send(post_files(tool.id, &[("", b"")])).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", tool.id);
        assert_eq!(
            response.headers()[header::LOCATION],
            tool.path().as_str(),
            "{}",
            tool.id
        );
    }

    // A form with no file parts at all behaves the same way.
    let response = test.send(post_files("merge-pdf", &[])).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // So does a POST without a multipart body.
    let request = Request::builder()
        .uri("/tool/merge-pdf")
        .method("POST")
        .body(Body::empty())
        .unwrap();
    let response = test.send(request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/tool/merge-pdf");
}

#[tokio::test]
async fn test_oversized_declared_length_is_413_and_writes_nothing() {
    let test = build_test_app_with_limit(ByteSize::mebibytes(1));
    let big = vec![7u8; 2 * 1024 * 1024];
    let body = multipart_body(&[("big.pdf", &big)]);

    let request = Request::builder()
        .uri("/tool/compress-pdf")
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = test.send(request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_text(response).await, "File too large. Max is 1 MB");
    assert_eq!(test.leftover_uploads(), 0);
    assert_eq!(test.state.metrics.snapshot().uploads_rejected, 1);
}

#[tokio::test]
async fn test_oversized_streamed_body_is_413_and_writes_nothing() {
    let test = build_test_app_with_limit(ByteSize::mebibytes(1));
    let small = vec![1u8; 1024];
    let big = vec![7u8; 2 * 1024 * 1024];

    // The first part fits; the second pushes the body over the limit.
    let response = test
        .send(post_files("merge-pdf", &[("a.pdf", &small), ("b.pdf", &big)]))
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_text(response).await.contains("Max is 1 MB"));
    assert_eq!(test.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_png_to_jpg_scenario() {
    let test = build_test_app();
    let png = png_bytes(RgbaImage::from_pixel(100, 100, Rgba([20, 120, 220, 90])));

    let response = test.send(post_files("png-to-jpg", &[("logo.png", &png)])).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"image.jpg\""
    );

    let jpeg = image::load_from_memory_with_format(&body_bytes(response).await, ImageFormat::Jpeg)
        .unwrap();
    assert_eq!(jpeg.dimensions(), (100, 100));
    assert!(!jpeg.color().has_alpha());

    assert_eq!(test.leftover_uploads(), 0);
    assert_eq!(test.state.metrics.snapshot().conversions_succeeded, 1);
}

#[tokio::test]
async fn test_single_file_tool_uses_first_part_only() {
    let test = build_test_app();
    let first = png_bytes(RgbaImage::from_pixel(30, 20, Rgba([0, 0, 0, 255])));
    let second = png_bytes(RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255])));

    let response = test
        .send(post_files("jpg-to-png", &[("a.png", &first), ("b.png", &second)]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let png = image::load_from_memory_with_format(&body_bytes(response).await, ImageFormat::Png)
        .unwrap();
    assert_eq!(png.dimensions(), (30, 20));
    assert_eq!(test.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_merge_pdf_scenario() {
    let test = build_test_app();
    let a = labelled_pdf("A", 2);
    let b = labelled_pdf("B", 3);

    let response = test
        .send(post_files("merge-pdf", &[("a.pdf", &a), ("b.pdf", &b)]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"merged.pdf\""
    );

    let merged = Document::load_mem(&body_bytes(response).await).unwrap();
    let pages = merged.get_pages();
    assert_eq!(pages.len(), 5);

    for ((_, page_id), label) in pages.into_iter().zip(["A1", "A2", "B1", "B2", "B3"]) {
        let content = merged.get_page_content(page_id).unwrap();
        assert!(contains(&content, label), "expected {label} on this page");
    }
    assert_eq!(test.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_png_to_pdf_keeps_pixel_dimensions() {
    let test = build_test_app();
    let wide = png_bytes(RgbaImage::from_pixel(120, 40, Rgba([200, 0, 0, 255])));
    let tall = png_bytes(RgbaImage::from_pixel(25, 75, Rgba([0, 200, 0, 128])));

    let response = test
        .send(post_files("png-to-pdf", &[("wide.png", &wide), ("tall.png", &tall)]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = Document::load_mem(&body_bytes(response).await).unwrap();
    let mut sizes = Vec::new();
    for page_id in doc.get_pages().into_values() {
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        sizes.push((width.round() as u32, height.round() as u32));
    }
    assert_eq!(sizes, vec![(120, 40), (25, 75)]);
    assert_eq!(test.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_conversion_failure_is_500_and_cleans_up() {
    let test = build_test_app();

    let response = test
        .send(post_files("compress-pdf", &[("broken.pdf", b"this is not a pdf")]))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, CONVERSION_FAILED_MESSAGE);
    assert_eq!(test.leftover_uploads(), 0);

    let snapshot = test.state.metrics.snapshot();
    assert_eq!(snapshot.conversions_failed, 1);
    assert_eq!(snapshot.conversions_succeeded, 0);
}

#[tokio::test]
async fn test_word_to_pdf_rejects_non_docx() {
    let test = build_test_app();

    let response = test
        .send(post_files("word-to-pdf", &[("notes.docx", b"plain text, no zip")]))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(test.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_hostile_filename_stays_inside_upload_dir() {
    let test = build_test_app();
    let png = png_bytes(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));

    let response = test
        .send(post_files("png-to-jpg", &[("../../etc/passwd.png", &png)]))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test.leftover_uploads(), 0);
    assert!(!test.upload_dir().parent().unwrap().join("etc").exists());
}

#[tokio::test]
async fn test_index_and_guide_pages() {
    let test = build_test_app();

    let response = test.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("PDFvert – Free Online File Converter Tools"));
    for tool in ToolCatalog::builtin().iter() {
        assert!(html.contains(&tool.path()), "{}", tool.id);
    }

    let response = test.send(get("/how-to-use")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("How to Use PDFvert – Quick Guide"));
}

#[tokio::test]
async fn test_robots_txt() {
    let test = build_test_app();

    let response = test.send(get("/robots.txt")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        body_text(response).await,
        "User-agent: *\nAllow: /\nSitemap: https://pdfvert.com/sitemap.xml"
    );
}

#[tokio::test]
async fn test_sitemap_lists_home_guide_and_tools() {
    let test = build_test_app();

    let response = test.send(get("/sitemap.xml")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");

    let xml = body_text(response).await;
    let locs: Vec<&str> = xml
        .lines()
        .filter_map(|line| line.strip_prefix("<url><loc>"))
        .filter_map(|line| line.strip_suffix("</loc></url>"))
        .collect();

    let mut expected = vec![
        "https://pdfvert.com/".to_string(),
        "https://pdfvert.com/how-to-use".to_string(),
    ];
    expected.extend(
        ToolCatalog::builtin()
            .iter()
            .map(|tool| format!("https://pdfvert.com/tool/{}", tool.id)),
    );
    assert_eq!(locs, expected);
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}

#[tokio::test]
async fn test_favicon_is_served() {
    let test = build_test_app();

    let response = test.send(get("/favicon.ico")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let test = build_test_app();

    let response = test.send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.conversions_succeeded, 0);
    assert_eq!(health.conversions_failed, 0);
    assert_eq!(health.uploads_rejected, 0);
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn test_video_to_gif_keeps_first_ten_seconds() {
    use image::AnimationDecoder;
    use image::codecs::gif::GifDecoder;

    let test = build_test_app();
    let work = TempDir::new().unwrap();
    let video = work.path().join("source.mp4");

    let status = std::process::Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-f", "lavfi", "-i"])
        .arg("testsrc=duration=30:size=64x48:rate=10")
        .args(["-pix_fmt", "yuv420p", "-y"])
        .arg(&video)
        .status()
        .unwrap();
    assert!(status.success());
    let data = std::fs::read(&video).unwrap();

    let response = test.send(post_files("video-to-gif", &[("source.mp4", &data)])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/gif");

    let gif = body_bytes(response).await;
    let frames = GifDecoder::new(Cursor::new(gif))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();

    let total_ms: u32 = frames
        .iter()
        .map(|frame| {
            let (num, den) = frame.delay().numer_denom_ms();
            num / den.max(1)
        })
        .sum();
    assert!(frames.len() > 1);
    assert!(total_ms <= 10_100, "gif spans {total_ms} ms");
    assert_eq!(test.leftover_uploads(), 0);
}
