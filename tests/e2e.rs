//! End-to-end tests against a real pdfium library.
//!
//! Gated behind the `E2E_ENABLED` environment variable because they need
//! libpdfium on the loader path (or `PDFIUM_LIB_PATH`).
//!
//! Run with:
//!   E2E_ENABLED=1 DYLD_LIBRARY_PATH=. cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_round_trip -- --nocapture

use futures::StreamExt;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Read};
use std::sync::Arc;
use toolbox_pdf::{
    images_to_pdf_file, images_to_pdf_tool, inspect, pdf_to_images_file, pdf_to_images_tool,
    rasterize_stream, Artifact, ConversionConfig, NoticeLevel, PageSize, RecordingNotifier,
    SourceFile, ToolState, RENDER_SCALE,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Solid-colour PNG of the given size.
fn png(name: &str, w: u32, h: u32) -> SourceFile {
    png_filled(name, w, h, [200, 40, 90])
}

fn png_filled(name: &str, w: u32, h: u32, rgb: [u8; 3]) -> SourceFile {
    let img = RgbImage::from_pixel(w, h, Rgb(rgb));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    SourceFile::from_bytes(name, buf.into_inner())
}

/// Build a PDF with `pages` pages through the Image→PDF tool.
async fn make_pdf(pages: usize) -> SourceFile {
    let mut tool = images_to_pdf_tool(ConversionConfig::default(), Arc::new(RecordingNotifier::new()));
    let images = (1..=pages).map(|n| png(&format!("p{n}.png"), 300, 400)).collect();
    tool.select_files(images).await;
    let pdf = tool.convert().await.unwrap();
    SourceFile::from_bytes("made.pdf", pdf.document.bytes().to_vec())
}

fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

// ── Image → PDF ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_three_images_make_three_pages() {
    e2e_skip_unless_enabled!();

    let rec = Arc::new(RecordingNotifier::new());
    let mut tool = images_to_pdf_tool(ConversionConfig::default(), rec.clone());
    tool.select_files(vec![
        png("landscape.png", 400, 300),
        png("tall.png", 1000, 2000),
        png("tiny.png", 50, 50),
    ])
    .await;

    let pdf = tool.convert().await.unwrap();
    assert_eq!(pdf.page_count, 3);
    assert!(pdf.skipped.is_empty());
    assert!(pdf.document.bytes().starts_with(b"%PDF"));
    assert_eq!(pdf.download_name(), "images-to-pdf.pdf");
    assert!(pdf.data_uri().starts_with("data:application/pdf;base64,"));
    let bytes = pdf.document.bytes().to_vec();
    assert_eq!(tool.state(), ToolState::Complete);

    assert_eq!(inspect_bytes(&bytes).await, 3);
    assert_eq!(rec.of_level(NoticeLevel::Success).len(), 1);
}

async fn inspect_bytes(bytes: &[u8]) -> usize {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probe.pdf");
    std::fs::write(&path, bytes).unwrap();
    inspect(path.to_str().unwrap(), &ConversionConfig::default())
        .await
        .unwrap()
        .page_count
}

#[tokio::test]
async fn test_pages_follow_input_order() {
    e2e_skip_unless_enabled!();

    let colours = [[220, 30, 30], [30, 200, 30], [30, 30, 220]];
    let mut tool = images_to_pdf_tool(ConversionConfig::default(), Arc::new(RecordingNotifier::new()));
    tool.select_files(vec![
        png_filled("red.png", 400, 300, colours[0]),
        png_filled("green.png", 1000, 2000, colours[1]),
        png_filled("blue.png", 50, 50, colours[2]),
    ])
    .await;
    let pdf = tool.convert().await.unwrap();
    let pdf = SourceFile::from_bytes("ordered.pdf", pdf.document.bytes().to_vec());

    let mut tool = pdf_to_images_tool(ConversionConfig::default(), Arc::new(RecordingNotifier::new()));
    tool.select_files(vec![pdf]).await;
    let images = tool.convert().await.unwrap();
    assert_eq!(images.pages.len(), 3);

    for (page, expected) in images.pages.iter().zip(colours) {
        let rendered = image::load_from_memory(page.handle.bytes()).unwrap().to_rgb8();
        let centre = rendered.get_pixel(rendered.width() / 2, rendered.height() / 2);
        for (got, want) in centre.0.iter().zip(expected) {
            assert!(
                got.abs_diff(want) <= 12,
                "page {}: centre pixel {:?}, expected {:?}",
                page.page_num,
                centre.0,
                expected
            );
        }
    }
}

#[tokio::test]
async fn test_bad_image_is_skipped() {
    e2e_skip_unless_enabled!();

    let rec = Arc::new(RecordingNotifier::new());
    let mut tool = images_to_pdf_tool(ConversionConfig::default(), rec.clone());
    tool.select_files(vec![
        png("a.png", 200, 200),
        SourceFile::with_mime("broken.png", b"not really a png".to_vec(), "image/png"),
        png("c.png", 200, 200),
    ])
    .await;

    let pdf = tool.convert().await.unwrap();
    assert_eq!(pdf.page_count, 2);
    assert_eq!(pdf.skipped.len(), 1);
    assert_eq!(pdf.skipped[0].position, 2);
    assert_eq!(pdf.stats().skipped_count, 1);

    let warnings = rec.of_level(NoticeLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("broken.png"));
}

#[tokio::test]
async fn test_letter_pages() {
    e2e_skip_unless_enabled!();

    let config = ConversionConfig::builder()
        .page_size(PageSize::Letter)
        .margin_pts(36.0)
        .build()
        .unwrap();
    let mut tool = images_to_pdf_tool(config, Arc::new(RecordingNotifier::new()));
    tool.select_files(vec![png("a.png", 640, 480)]).await;
    let pdf = SourceFile::from_bytes("letter.pdf", tool.convert().await.unwrap().document.bytes().to_vec());

    // 612pt wide at 2x scale.
    let mut tool = pdf_to_images_tool(ConversionConfig::default(), Arc::new(RecordingNotifier::new()));
    tool.select_files(vec![pdf]).await;
    let images = tool.convert().await.unwrap();
    assert_eq!(images.pages[0].width, (612.0 * RENDER_SCALE).round() as u32);
}

// ── PDF → Images ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_round_trip_previews_and_archive() {
    e2e_skip_unless_enabled!();

    let pdf = make_pdf(3).await;
    let rec = Arc::new(RecordingNotifier::new());
    let mut tool = pdf_to_images_tool(ConversionConfig::default(), rec.clone());
    assert_eq!(tool.select_files(vec![pdf]).await, 1);
    assert_eq!(tool.inputs()[0].summary.page_count, Some(3));

    let images = tool.convert().await.unwrap();
    assert_eq!(images.pages.len(), 3);
    let nums: Vec<usize> = images.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(nums, vec![1, 2, 3]);
    for page in &images.pages {
        assert!(page.handle.bytes().starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(page.handle.mime(), "image/png");
    }

    assert_eq!(images.download_name(), "pdf-to-images.zip");
    assert_eq!(
        zip_entries(images.archive.bytes()),
        vec!["page-1.png", "page-2.png", "page-3.png"]
    );

    // Archive entries match the previews byte for byte.
    let mut archive = zip::ZipArchive::new(Cursor::new(images.archive.bytes())).unwrap();
    let mut first = Vec::new();
    archive
        .by_name("page-1.png")
        .unwrap()
        .read_to_end(&mut first)
        .unwrap();
    assert_eq!(first, images.pages[0].handle.bytes());

    // Three previews, one archive, one input preview.
    assert_eq!(tool.registry().live_count(), 5);
}

#[tokio::test]
async fn test_status_message_counts_pages() {
    e2e_skip_unless_enabled!();

    let pdf = make_pdf(5).await;
    let rec = Arc::new(RecordingNotifier::new());
    let mut tool = pdf_to_images_tool(ConversionConfig::default(), rec.clone());
    tool.select_files(vec![pdf]).await;
    tool.convert().await.unwrap();

    let info = rec.of_level(NoticeLevel::Info);
    assert_eq!(info[0].message, "Converting PDF to images... (5 pages)");
}

#[tokio::test]
async fn test_stream_yields_pages_in_order() {
    e2e_skip_unless_enabled!();

    let pdf = make_pdf(4).await;
    let mut stream = rasterize_stream(&pdf, &ConversionConfig::default()).unwrap();
    let mut seen = Vec::new();
    while let Some(page) = stream.next().await {
        seen.push(page.unwrap().page_num);
    }
    assert_eq!(seen, vec![1, 2, 3, 4]);
}

// ── File entry points ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_file_entry_points() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let mut inputs = Vec::new();
    for (i, (w, h)) in [(320, 240), (240, 320)].into_iter().enumerate() {
        let path = dir.path().join(format!("img{i}.png"));
        std::fs::write(&path, png("x.png", w, h).bytes()).unwrap();
        inputs.push(path.to_string_lossy().into_owned());
    }

    let config = ConversionConfig::default();
    let stats = images_to_pdf_file(&inputs[..], dir.path(), &config).await.unwrap();
    assert_eq!(stats.output_count, 2);
    let pdf_path = dir.path().join("images-to-pdf.pdf");
    assert!(pdf_path.exists());

    let stats = pdf_to_images_file(pdf_path.to_str().unwrap(), dir.path(), &config)
        .await
        .unwrap();
    assert_eq!(stats.output_count, 2);
    let zip_bytes = std::fs::read(dir.path().join("pdf-to-images.zip")).unwrap();
    assert_eq!(zip_entries(&zip_bytes), vec!["page-1.png", "page-2.png"]);
}
