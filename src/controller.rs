//! Per-tool conversion lifecycle.
//!
//! ```text
//!            select                convert              ok
//!   Idle ───────────▶ Ready ─────────────▶ Converting ───────▶ Complete
//!    ▲                 ▲  ▲                    │ err               │
//!    │ clear           │  └────────────────────┘                   │
//!    └─────────────────┴──────────── select / remove ◀─────────────┘
//! ```
//!
//! A [`ToolController`] owns the selected inputs, their preview handles, and
//! the last successful artifact. Every transition is caused by a caller
//! action; there is no retry and no timeout. User-visible messages go to the
//! injected [`Notifier`].

use crate::error::ToolboxError;
use crate::handles::{Blob, HandleRegistry, PreviewHandle};
use crate::notify::{Notice, Notifier};
use crate::output::Artifact;
use crate::source::{AcceptList, SourceFile};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// UI-visible state of one tool instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolState {
    /// Nothing selected.
    Idle,
    /// Inputs present, no current output.
    Ready,
    /// A job is in flight.
    Converting,
    /// Output present for the current inputs.
    Complete,
}

/// What was learned about an input when it was selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSummary {
    /// Page count, for PDF inputs.
    pub page_count: Option<usize>,
}

/// One selected input together with its preview.
#[derive(Debug)]
pub struct SelectedInput {
    pub file: SourceFile,
    pub preview: PreviewHandle,
    pub summary: InputSummary,
}

/// A conversion direction plugged into a [`ToolController`].
pub trait Converter: Send + Sync {
    /// Raw job output, not yet registered as handles.
    type Pending: Send;
    /// Published result owning its handles.
    type Output: Artifact;

    /// Short tool name for logs.
    fn name(&self) -> &'static str;

    /// Allowed input types.
    fn accept(&self) -> &AcceptList;

    /// `None` for unlimited; single-input tools replace on selection.
    fn max_inputs(&self) -> Option<usize>;

    /// Message shown when converting with nothing selected.
    fn empty_hint(&self) -> &'static str;

    /// Eager inspection on selection. An error rejects the file.
    fn inspect(
        &self,
        file: &SourceFile,
    ) -> impl Future<Output = Result<InputSummary, ToolboxError>> + Send;

    /// Run the job. Inputs are never empty.
    fn convert(
        &self,
        inputs: &[SourceFile],
        notifier: &dyn Notifier,
    ) -> impl Future<Output = Result<Self::Pending, ToolboxError>> + Send;

    /// Register the job output as handles.
    fn publish(
        &self,
        pending: Self::Pending,
        registry: &HandleRegistry,
        input_count: usize,
        duration_ms: u64,
    ) -> Self::Output;

    /// Status line while converting.
    fn progress_message(&self, inputs: &[SelectedInput]) -> String;

    /// Toast after a successful job.
    fn success_message(&self, output: &Self::Output) -> String;
}

/// State machine for one tool instance.
pub struct ToolController<C: Converter> {
    converter: C,
    registry: HandleRegistry,
    notifier: Arc<dyn Notifier>,
    inputs: Vec<SelectedInput>,
    output: Option<C::Output>,
    converting: bool,
}

impl<C: Converter> ToolController<C> {
    pub fn new(converter: C, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_registry(converter, notifier, HandleRegistry::new())
    }

    /// Use a caller-supplied registry, e.g. one shared by several tools.
    pub fn with_registry(converter: C, notifier: Arc<dyn Notifier>, registry: HandleRegistry) -> Self {
        Self {
            converter,
            registry,
            notifier,
            inputs: Vec::new(),
            output: None,
            converting: false,
        }
    }

    pub fn state(&self) -> ToolState {
        if self.converting {
            ToolState::Converting
        } else if self.output.is_some() {
            ToolState::Complete
        } else if self.inputs.is_empty() {
            ToolState::Idle
        } else {
            ToolState::Ready
        }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    pub fn inputs(&self) -> &[SelectedInput] {
        &self.inputs
    }

    pub fn output(&self) -> Option<&C::Output> {
        self.output.as_ref()
    }

    /// Status line for the current state, if any.
    pub fn status_message(&self) -> Option<String> {
        match self.state() {
            ToolState::Converting => Some(self.converter.progress_message(&self.inputs)),
            _ => None,
        }
    }

    /// Add files from a picker or drop. Returns how many accepted files are
    /// still selected when the call returns.
    ///
    /// Files failing the accept list or inspection are rejected with an
    /// error notice each. Any accepted file invalidates the current output.
    /// For single-input tools the last accepted file replaces the selection;
    /// if inspection of that file fails the tool resets to `Idle`.
    pub async fn select_files(&mut self, files: Vec<SourceFile>) -> usize {
        self.converting = false;
        let single = self.converter.max_inputs() == Some(1);
        let mut accepted = 0;

        for file in files {
            if let Err(e) = self.converter.accept().check(&file) {
                warn!("{}: rejected '{}': {}", self.converter.name(), file.name(), e);
                self.notifier.notify(Notice::error(e.to_string()));
                continue;
            }

            let summary = match self.converter.inspect(&file).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("{}: could not read '{}': {}", self.converter.name(), file.name(), e);
                    self.notifier.notify(Notice::error(e.to_string()));
                    if single {
                        // The earlier pick is gone too, so nothing counts as accepted.
                        self.reset();
                        accepted = 0;
                    }
                    continue;
                }
            };

            if let Some(max) = self.converter.max_inputs() {
                if single {
                    self.inputs.clear();
                    accepted = 0;
                } else if self.inputs.len() >= max {
                    let e = ToolboxError::TooManyFiles {
                        max,
                        got: self.inputs.len() + 1,
                    };
                    self.notifier.notify(Notice::error(e.to_string()));
                    continue;
                }
            }

            let preview = self
                .registry
                .create(Blob::new(file.shared_bytes(), file.mime()));
            debug!(
                "{}: selected '{}' ({} bytes) as {}",
                self.converter.name(),
                file.name(),
                file.size(),
                preview.url()
            );
            self.inputs.push(SelectedInput {
                file,
                preview,
                summary,
            });
            accepted += 1;
        }

        if accepted > 0 {
            self.output = None;
        }
        accepted
    }

    /// Remove one input by position, revoking its preview and the output.
    pub fn remove_file(&mut self, index: usize) -> Result<(), ToolboxError> {
        if index >= self.inputs.len() {
            return Err(ToolboxError::InvalidState(format!(
                "no input at position {} (have {})",
                index,
                self.inputs.len()
            )));
        }
        let removed = self.inputs.remove(index);
        debug!("{}: removed '{}'", self.converter.name(), removed.file.name());
        self.output = None;
        self.converting = false;
        Ok(())
    }

    /// Drop everything and return to `Idle`.
    pub fn clear(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.inputs.clear();
        self.output = None;
        self.converting = false;
    }

    /// Run a job over the current inputs.
    ///
    /// On success the previous output's handles are revoked before the new
    /// ones are registered. On failure the previous output, if any, is kept.
    pub async fn convert(&mut self) -> Result<&C::Output, ToolboxError> {
        if self.inputs.is_empty() {
            let e = ToolboxError::EmptySelection {
                hint: self.converter.empty_hint().to_string(),
            };
            self.notifier.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        self.converting = true;
        let message = self.converter.progress_message(&self.inputs);
        info!("{}: {}", self.converter.name(), message);
        self.notifier.notify(Notice::info(message));

        let start = Instant::now();
        let files: Vec<SourceFile> = self.inputs.iter().map(|i| i.file.clone()).collect();
        let result = self.converter.convert(&files, self.notifier.as_ref()).await;
        self.converting = false;

        match result {
            Ok(pending) => {
                // Revoke the superseded result before registering the new one.
                self.output = None;
                let duration_ms = start.elapsed().as_millis() as u64;
                let output = self
                    .converter
                    .publish(pending, &self.registry, files.len(), duration_ms);
                self.notifier
                    .notify(Notice::success(self.converter.success_message(&output)));
                info!("{}: complete in {}ms", self.converter.name(), duration_ms);
                Ok(self.output.insert(output))
            }
            Err(e) => {
                warn!("{}: conversion failed: {}", self.converter.name(), e);
                self.notifier.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Hand the current output to the caller, leaving the tool `Ready`.
    pub fn take_output(&mut self) -> Option<C::Output> {
        self.output.take()
    }
}
