//! Lifecycle tests for `ToolController`.
//!
//! A stub converter stands in for the pdfium pipeline, so these run
//! everywhere:
//!
//!   cargo test --test lifecycle

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use toolbox_pdf::{
    AcceptList, Artifact, Blob, ConversionStats, Converter, HandleRegistry, InputSummary,
    NoticeLevel, Notifier, PreviewHandle, RecordingNotifier, SelectedInput, SourceFile,
    ToolController, ToolState, ToolboxError,
};

// ── Stub converter ───────────────────────────────────────────────────────────

/// One output handle per input plus a bundle handle.
#[derive(Debug)]
struct StubOutput {
    items: Vec<PreviewHandle>,
    bundle: PreviewHandle,
    stats: ConversionStats,
}

impl Artifact for StubOutput {
    fn download_name(&self) -> &str {
        "stub.bin"
    }

    fn download(&self) -> &PreviewHandle {
        &self.bundle
    }

    fn handle_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.items.iter().map(|h| h.url()).collect();
        urls.push(self.bundle.url());
        urls
    }

    fn stats(&self) -> &ConversionStats {
        &self.stats
    }
}

struct StubConverter {
    accept: AcceptList,
    max_inputs: Option<usize>,
    fail_next: AtomicBool,
    runs: AtomicUsize,
}

impl StubConverter {
    fn multi() -> Self {
        Self {
            accept: AcceptList::images(),
            max_inputs: None,
            fail_next: AtomicBool::new(false),
            runs: AtomicUsize::new(0),
        }
    }

    fn single() -> Self {
        Self {
            max_inputs: Some(1),
            ..Self::multi()
        }
    }
}

impl Converter for StubConverter {
    type Pending = Vec<Vec<u8>>;
    type Output = StubOutput;

    fn name(&self) -> &'static str {
        "stub"
    }

    fn accept(&self) -> &AcceptList {
        &self.accept
    }

    fn max_inputs(&self) -> Option<usize> {
        self.max_inputs
    }

    fn empty_hint(&self) -> &'static str {
        "Please upload at least one image"
    }

    async fn inspect(&self, file: &SourceFile) -> Result<InputSummary, ToolboxError> {
        if file.name().starts_with("bad") {
            return Err(ToolboxError::CorruptPdf {
                name: file.name().to_string(),
                detail: "unreadable".to_string(),
            });
        }
        Ok(InputSummary {
            page_count: Some(file.size()),
        })
    }

    async fn convert(
        &self,
        inputs: &[SourceFile],
        _notifier: &dyn Notifier,
    ) -> Result<Vec<Vec<u8>>, ToolboxError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ToolboxError::Internal("stub failure".to_string()));
        }
        Ok(inputs.iter().map(|f| f.bytes().to_vec()).collect())
    }

    fn publish(
        &self,
        pending: Vec<Vec<u8>>,
        registry: &HandleRegistry,
        input_count: usize,
        duration_ms: u64,
    ) -> StubOutput {
        let bundle: Vec<u8> = pending.concat();
        let stats = ConversionStats {
            input_count,
            output_count: pending.len(),
            skipped_count: 0,
            output_bytes: bundle.len(),
            duration_ms,
        };
        StubOutput {
            items: pending
                .into_iter()
                .map(|b| registry.create(Blob::new(b, "image/png")))
                .collect(),
            bundle: registry.create(Blob::new(bundle, "application/zip")),
            stats,
        }
    }

    fn progress_message(&self, inputs: &[SelectedInput]) -> String {
        format!("Converting {} item(s)...", inputs.len())
    }

    fn success_message(&self, output: &StubOutput) -> String {
        format!("Done: {} item(s)", output.items.len())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn png(name: &str) -> SourceFile {
    SourceFile::with_mime(name, name.as_bytes().to_vec(), "image/png")
}

fn tool(converter: StubConverter) -> (ToolController<StubConverter>, Arc<RecordingNotifier>) {
    let rec = Arc::new(RecordingNotifier::new());
    (ToolController::new(converter, rec.clone()), rec)
}

fn owned_urls(output: &StubOutput) -> Vec<String> {
    output.handle_urls().into_iter().map(String::from).collect()
}

// ── State transitions ────────────────────────────────────────────────────────

#[tokio::test]
async fn starts_idle_and_becomes_ready_on_selection() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    assert_eq!(tool.state(), ToolState::Idle);
    assert!(tool.status_message().is_none());

    let accepted = tool.select_files(vec![png("a.png"), png("b.png")]).await;
    assert_eq!(accepted, 2);
    assert_eq!(tool.state(), ToolState::Ready);
    assert_eq!(tool.inputs().len(), 2);
    // One preview per selected input.
    assert_eq!(tool.registry().live_count(), 2);
}

#[tokio::test]
async fn convert_reaches_complete_with_notices() {
    let (mut tool, rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png"), png("b.png"), png("c.png")])
        .await;

    let output = tool.convert().await.unwrap();
    assert_eq!(output.items.len(), 3);
    assert_eq!(output.stats().input_count, 3);
    assert_eq!(tool.state(), ToolState::Complete);

    let info = rec.of_level(NoticeLevel::Info);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].message, "Converting 3 item(s)...");
    let success = rec.of_level(NoticeLevel::Success);
    assert_eq!(success.len(), 1);
    assert_eq!(success[0].message, "Done: 3 item(s)");
}

#[tokio::test]
async fn output_preserves_input_order() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("first.png"), png("second.png"), png("third.png")])
        .await;

    let output = tool.convert().await.unwrap();
    let bodies: Vec<&[u8]> = output.items.iter().map(|h| h.bytes()).collect();
    assert_eq!(
        bodies,
        vec![&b"first.png"[..], &b"second.png"[..], &b"third.png"[..]]
    );
}

#[tokio::test]
async fn empty_convert_is_refused_without_running() {
    let (mut tool, rec) = tool(StubConverter::multi());

    let err = tool.convert().await.unwrap_err();
    assert!(matches!(err, ToolboxError::EmptySelection { .. }));
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.converter().runs.load(Ordering::SeqCst), 0);

    let errors = rec.of_level(NoticeLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Please upload at least one image");
}

// ── Rejection ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_type_is_rejected_with_error_notice() {
    let (mut tool, rec) = tool(StubConverter::multi());

    let accepted = tool
        .select_files(vec![
            png("ok.png"),
            SourceFile::with_mime("notes.txt", b"text".to_vec(), "text/plain"),
        ])
        .await;
    assert_eq!(accepted, 1);
    assert_eq!(tool.inputs().len(), 1);
    assert_eq!(tool.registry().live_count(), 1);

    let errors = rec.of_level(NoticeLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("notes.txt"));
}

#[tokio::test]
async fn failed_inspection_on_single_input_tool_resets_to_idle() {
    let (mut tool, rec) = tool(StubConverter::single());
    tool.select_files(vec![png("good.png")]).await;
    tool.convert().await.unwrap();
    assert_eq!(tool.state(), ToolState::Complete);

    let accepted = tool.select_files(vec![png("bad.png")]).await;
    assert_eq!(accepted, 0);
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.registry().live_count(), 0);
    assert_eq!(rec.of_level(NoticeLevel::Error).len(), 1);
}

#[tokio::test]
async fn single_input_count_reflects_reset_in_same_batch() {
    let (mut tool, rec) = tool(StubConverter::single());

    let accepted = tool.select_files(vec![png("good.png"), png("bad.png")]).await;
    assert_eq!(accepted, 0);
    assert_eq!(tool.inputs().len(), 0);
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.registry().live_count(), 0);
    assert_eq!(rec.of_level(NoticeLevel::Error).len(), 1);
}

#[tokio::test]
async fn single_input_count_is_at_most_one() {
    let (mut tool, _rec) = tool(StubConverter::single());

    let accepted = tool.select_files(vec![png("one.png"), png("two.png")]).await;
    assert_eq!(accepted, 1);
    assert_eq!(tool.inputs().len(), 1);
    assert_eq!(tool.inputs()[0].file.name(), "two.png");

    // A bad file before a good one leaves the good one selected.
    let accepted = tool.select_files(vec![png("bad.png"), png("three.png")]).await;
    assert_eq!(accepted, 1);
    assert_eq!(tool.inputs()[0].file.name(), "three.png");
    assert_eq!(tool.state(), ToolState::Ready);
}

#[tokio::test]
async fn single_input_tool_replaces_selection() {
    let (mut tool, _rec) = tool(StubConverter::single());
    tool.select_files(vec![png("one.png")]).await;
    let first_preview = tool.inputs()[0].preview.url().to_string();

    tool.select_files(vec![png("two.png")]).await;
    assert_eq!(tool.inputs().len(), 1);
    assert_eq!(tool.inputs()[0].file.name(), "two.png");
    assert!(!tool.registry().is_live(&first_preview));
    assert_eq!(tool.registry().live_count(), 1);
}

// ── Handle hygiene ───────────────────────────────────────────────────────────

#[tokio::test]
async fn second_conversion_revokes_every_previous_url() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png"), png("b.png")]).await;

    let first = owned_urls(tool.convert().await.unwrap());
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|u| tool.registry().is_live(u)));

    let second = owned_urls(tool.convert().await.unwrap());
    assert!(first.iter().all(|u| !tool.registry().is_live(u)));
    assert!(second.iter().all(|u| tool.registry().is_live(u)));
    assert!(first.iter().all(|u| !second.contains(u)));

    // Two input previews plus the current output.
    assert_eq!(tool.registry().live_count(), 2 + second.len());
}

#[tokio::test]
async fn failed_conversion_keeps_previous_output() {
    let (mut tool, rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png")]).await;
    let kept = owned_urls(tool.convert().await.unwrap());

    tool.converter().fail_next.store(true, Ordering::SeqCst);
    let err = tool.convert().await.unwrap_err();
    assert!(matches!(err, ToolboxError::Internal(_)));

    assert_eq!(tool.state(), ToolState::Complete);
    assert!(kept.iter().all(|u| tool.registry().is_live(u)));
    let errors = rec.of_level(NoticeLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("stub failure"));
}

#[tokio::test]
async fn failed_first_conversion_returns_to_ready() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png")]).await;
    tool.converter().fail_next.store(true, Ordering::SeqCst);

    assert!(tool.convert().await.is_err());
    assert_eq!(tool.state(), ToolState::Ready);
    assert!(tool.output().is_none());
}

#[tokio::test]
async fn selecting_more_files_invalidates_output() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png")]).await;
    let urls = owned_urls(tool.convert().await.unwrap());

    tool.select_files(vec![png("b.png")]).await;
    assert_eq!(tool.state(), ToolState::Ready);
    assert!(urls.iter().all(|u| !tool.registry().is_live(u)));
    assert_eq!(tool.inputs().len(), 2);
}

#[tokio::test]
async fn remove_revokes_preview_and_output() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png"), png("b.png")]).await;
    let removed_preview = tool.inputs()[0].preview.url().to_string();
    let urls = owned_urls(tool.convert().await.unwrap());

    tool.remove_file(0).unwrap();
    assert_eq!(tool.state(), ToolState::Ready);
    assert!(!tool.registry().is_live(&removed_preview));
    assert!(urls.iter().all(|u| !tool.registry().is_live(u)));
    assert_eq!(tool.registry().live_count(), 1);

    let err = tool.remove_file(5).unwrap_err();
    assert!(matches!(err, ToolboxError::InvalidState(_)));

    tool.remove_file(0).unwrap();
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.registry().live_count(), 0);
}

#[tokio::test]
async fn clear_releases_everything() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png"), png("b.png")]).await;
    tool.convert().await.unwrap();
    assert!(tool.registry().live_count() > 0);

    tool.clear();
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.registry().live_count(), 0);

    let stats = tool.registry().stats();
    assert_eq!(stats.created, stats.revoked);
}

#[tokio::test]
async fn take_output_hands_over_handles() {
    let (mut tool, _rec) = tool(StubConverter::multi());
    tool.select_files(vec![png("a.png")]).await;
    tool.convert().await.unwrap();

    let output = tool.take_output().unwrap();
    assert_eq!(tool.state(), ToolState::Ready);
    let urls = owned_urls(&output);
    assert!(urls.iter().all(|u| tool.registry().is_live(u)));

    drop(output);
    assert!(urls.iter().all(|u| !tool.registry().is_live(u)));
}

#[tokio::test]
async fn tools_sharing_a_registry_do_not_interfere() {
    let registry = HandleRegistry::new();
    let rec = Arc::new(RecordingNotifier::new());
    let mut left = ToolController::with_registry(StubConverter::multi(), rec.clone(), registry.clone());
    let mut right = ToolController::with_registry(StubConverter::single(), rec, registry.clone());

    left.select_files(vec![png("l.png")]).await;
    right.select_files(vec![png("r.png")]).await;
    left.convert().await.unwrap();
    let right_urls = owned_urls(right.convert().await.unwrap());

    left.clear();
    assert!(right_urls.iter().all(|u| registry.is_live(u)));
    assert_eq!(left.state(), ToolState::Idle);
    assert_eq!(right.state(), ToolState::Complete);
}
