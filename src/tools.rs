//! The two conversion tools: Image→PDF and PDF→Images.
//!
//! Each is a [`Converter`] wiring the pipeline stages to a
//! [`ToolController`]. The type aliases at the bottom give the ready-made
//! controllers.

use crate::config::ConversionConfig;
use crate::controller::{Converter, InputSummary, SelectedInput, ToolController};
use crate::error::ToolboxError;
use crate::handles::HandleRegistry;
use crate::notify::{Notice, Notifier};
use crate::output::{ImageSetArtifact, PdfArtifact};
use crate::pipeline::assemble::{assemble_pdf, AssembledPdf};
use crate::pipeline::package::package_pages_async;
use crate::pipeline::render::{probe_page_count, rasterize_pages, RenderedPage};
use crate::source::{AcceptList, SourceFile};
use std::sync::Arc;

// ── Image → PDF ──────────────────────────────────────────────────────────

/// Many images in, one PDF out.
pub struct ImagesToPdf {
    config: ConversionConfig,
    accept: AcceptList,
}

impl ImagesToPdf {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            accept: AcceptList::images(),
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}

impl Converter for ImagesToPdf {
    type Pending = AssembledPdf;
    type Output = PdfArtifact;

    fn name(&self) -> &'static str {
        "images-to-pdf"
    }

    fn accept(&self) -> &AcceptList {
        &self.accept
    }

    fn max_inputs(&self) -> Option<usize> {
        None
    }

    fn empty_hint(&self) -> &'static str {
        "Please upload at least one image"
    }

    async fn inspect(&self, _file: &SourceFile) -> Result<InputSummary, ToolboxError> {
        Ok(InputSummary::default())
    }

    async fn convert(
        &self,
        inputs: &[SourceFile],
        notifier: &dyn Notifier,
    ) -> Result<AssembledPdf, ToolboxError> {
        let pdf = assemble_pdf(inputs, &self.config).await?;
        for skipped in &pdf.skipped {
            notifier.notify(Notice::warning(skipped.to_string()));
        }
        Ok(pdf)
    }

    fn publish(
        &self,
        pending: AssembledPdf,
        registry: &HandleRegistry,
        input_count: usize,
        duration_ms: u64,
    ) -> PdfArtifact {
        PdfArtifact::publish(pending, registry, input_count, duration_ms)
    }

    fn progress_message(&self, inputs: &[SelectedInput]) -> String {
        match inputs.len() {
            1 => "Converting 1 image to PDF...".to_string(),
            n => format!("Converting {n} images to PDF..."),
        }
    }

    fn success_message(&self, output: &PdfArtifact) -> String {
        if output.skipped.is_empty() {
            format!("PDF created with {} page(s)", output.page_count)
        } else {
            format!(
                "PDF created with {} page(s); {} image(s) could not be loaded",
                output.page_count,
                output.skipped.len()
            )
        }
    }
}

// ── PDF → Images ─────────────────────────────────────────────────────────

/// One PDF in, one PNG per page plus a ZIP out.
pub struct PdfToImages {
    config: ConversionConfig,
    accept: AcceptList,
}

impl PdfToImages {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            accept: AcceptList::pdf(),
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}

impl Converter for PdfToImages {
    type Pending = (Vec<RenderedPage>, Vec<u8>);
    type Output = ImageSetArtifact;

    fn name(&self) -> &'static str {
        "pdf-to-images"
    }

    fn accept(&self) -> &AcceptList {
        &self.accept
    }

    fn max_inputs(&self) -> Option<usize> {
        Some(1)
    }

    fn empty_hint(&self) -> &'static str {
        "Please select a PDF file"
    }

    async fn inspect(&self, file: &SourceFile) -> Result<InputSummary, ToolboxError> {
        let pages = probe_page_count(file, self.config.password.as_deref()).await?;
        Ok(InputSummary {
            page_count: Some(pages),
        })
    }

    async fn convert(
        &self,
        inputs: &[SourceFile],
        _notifier: &dyn Notifier,
    ) -> Result<(Vec<RenderedPage>, Vec<u8>), ToolboxError> {
        let pdf = inputs.first().ok_or_else(|| ToolboxError::EmptySelection {
            hint: self.empty_hint().to_string(),
        })?;
        let pages = rasterize_pages(pdf, &self.config).await?;
        package_pages_async(pages, self.config.compression).await
    }

    /// `input_count` is always one PDF here; the stats count its pages instead.
    fn publish(
        &self,
        (pages, archive): (Vec<RenderedPage>, Vec<u8>),
        registry: &HandleRegistry,
        _input_count: usize,
        duration_ms: u64,
    ) -> ImageSetArtifact {
        ImageSetArtifact::publish(pages, archive, registry, duration_ms)
    }

    fn progress_message(&self, inputs: &[SelectedInput]) -> String {
        match inputs.first().and_then(|i| i.summary.page_count) {
            Some(n) => format!("Converting PDF to images... ({n} pages)"),
            None => "Converting PDF to images...".to_string(),
        }
    }

    fn success_message(&self, output: &ImageSetArtifact) -> String {
        format!("Converted {} page(s) to PNG", output.pages.len())
    }
}

/// Controller for the Image→PDF tool.
pub type ImagesToPdfTool = ToolController<ImagesToPdf>;

/// Controller for the PDF→Images tool.
pub type PdfToImagesTool = ToolController<PdfToImages>;

/// Image→PDF tool reporting to `notifier`.
pub fn images_to_pdf_tool(config: ConversionConfig, notifier: Arc<dyn Notifier>) -> ImagesToPdfTool {
    ToolController::new(ImagesToPdf::new(config), notifier)
}

/// PDF→Images tool reporting to `notifier`.
pub fn pdf_to_images_tool(config: ConversionConfig, notifier: Arc<dyn Notifier>) -> PdfToImagesTool {
    ToolController::new(PdfToImages::new(config), notifier)
}
