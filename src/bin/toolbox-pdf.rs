//! CLI binary for toolbox-pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, drives one tool controller, and saves its download.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use toolbox_pdf::pipeline::input;
use toolbox_pdf::{
    images_to_pdf_tool, inspect, pdf_to_images_tool, save_download, ArchiveCompression, Artifact,
    ConversionConfig, ConversionProgressCallback, ConversionStats, Notice, NoticeLevel, Notifier,
    PageSize, ProgressCallback,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar. Starts as a spinner and becomes a bar once the
/// item count is known.
struct CliProgressCallback {
    bar: ProgressBar,
    unit: &'static str,
}

impl CliProgressCallback {
    fn new(unit: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening inputs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, unit })
    }

    fn activate_bar(&self, total: usize) {
        let template = format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  ⏱ {{elapsed_precise}}",
            self.unit
        );
        let progress_style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total: usize) {
        self.activate_bar(total);
    }

    fn on_item_start(&self, item: usize, _total: usize) {
        self.bar.set_message(format!("{} {item}", self.unit));
    }

    fn on_item_complete(&self, item: usize, total: usize, bytes: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            item,
            total,
            dim(&format!("{bytes:>9} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_item_skipped(&self, item: usize, total: usize, reason: &str) {
        let msg = if reason.chars().count() > 80 {
            format!("{}\u{2026}", reason.chars().take(79).collect::<String>())
        } else {
            reason.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            yellow("↷"),
            item,
            total,
            yellow(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, _total: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}

// ── CLI notifier ─────────────────────────────────────────────────────────────

/// Prints notices to stderr; `quiet` keeps only errors.
struct CliNotifier {
    quiet: bool,
}

impl Notifier for CliNotifier {
    fn notify(&self, notice: Notice) {
        let line = match notice.level {
            NoticeLevel::Error => format!("{} {}", red("✘"), red(&notice.message)),
            _ if self.quiet => return,
            NoticeLevel::Success => format!("{} {}", green("✔"), bold(&notice.message)),
            NoticeLevel::Info => format!("{} {}", cyan("◆"), notice.message),
            NoticeLevel::Warning => format!("{} {}", yellow("⚠"), yellow(&notice.message)),
        };
        eprintln!("{line}");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Three photos into one A4 PDF
  toolbox-pdf images-to-pdf a.jpg b.png c.webp -o album.pdf

  # US Letter pages, half-inch margins
  toolbox-pdf images-to-pdf --page-size letter --margin 36 scans/*.jpg

  # Every page of a PDF as PNG, bundled in a ZIP
  toolbox-pdf pdf-to-images report.pdf -o report-pages.zip

  # Also write the individual PNGs
  toolbox-pdf pdf-to-images report.pdf --previews ./pages

  # Page count only
  toolbox-pdf inspect https://example.com/paper.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium (file or directory)
  RUST_LOG          Override log filtering (e.g. toolbox_pdf=debug)
"#;

/// Convert images to PDF and PDF pages to PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "toolbox-pdf",
    version,
    about = "Convert images to PDF and PDF pages to PNG images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "TOOLBOX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "TOOLBOX_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "TOOLBOX_NO_PROGRESS")]
    no_progress: bool,

    /// Print conversion statistics as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, global = true, env = "TOOLBOX_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place images (in order) on pages of one PDF.
    ImagesToPdf {
        /// Image files or HTTP/HTTPS URLs.
        #[arg(required = true)]
        images: Vec<String>,

        /// Output file or directory.
        #[arg(short, long, default_value = "images-to-pdf.pdf")]
        output: PathBuf,

        /// Page size: a4 or letter.
        #[arg(long, env = "TOOLBOX_PAGE_SIZE", value_enum, default_value = "a4")]
        page_size: PageSizeArg,

        /// Margin on every side, in points.
        #[arg(long, env = "TOOLBOX_MARGIN", default_value_t = toolbox_pdf::config::DEFAULT_MARGIN_PTS)]
        margin: f32,
    },

    /// Render every PDF page to PNG and bundle them in a ZIP.
    PdfToImages {
        /// PDF file or HTTP/HTTPS URL.
        input: String,

        /// Output file or directory for the ZIP.
        #[arg(short, long, default_value = "pdf-to-images.zip")]
        output: PathBuf,

        /// Also write each page as page-N.png into this directory.
        #[arg(long)]
        previews: Option<PathBuf>,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "TOOLBOX_PASSWORD")]
        password: Option<String>,

        /// Store PNGs uncompressed in the ZIP.
        #[arg(long)]
        store: bool,
    },

    /// Print the page count of a PDF without rendering.
    Inspect {
        /// PDF file or HTTP/HTTPS URL.
        input: String,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "TOOLBOX_PASSWORD")]
        password: Option<String>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose asks for them.
    let show_progress = !global.quiet && !global.no_progress && !global.json;
    let filter = if global.verbose {
        "debug"
    } else if global.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let notifier: Arc<dyn Notifier> = Arc::new(CliNotifier {
        quiet: global.quiet || global.json,
    });

    match &cli.command {
        Command::ImagesToPdf {
            images,
            output,
            page_size,
            margin,
        } => {
            let progress = progress_for(show_progress, "images");
            let config = build_config(global, progress, |b| {
                b.page_size((*page_size).into()).margin_pts(*margin)
            })?;

            let mut files = Vec::with_capacity(images.len());
            for image in images {
                files.push(
                    input::resolve_input(image, config.download_timeout_secs)
                        .await
                        .with_context(|| format!("Failed to read '{image}'"))?,
                );
            }

            let mut tool = images_to_pdf_tool(config, Arc::clone(&notifier));
            tool.select_files(files).await;
            let artifact = tool.convert().await.context("Conversion failed")?;
            let path = save_download(artifact, output)
                .await
                .context("Failed to save PDF")?;
            report(global, artifact.stats(), &path)?;
        }

        Command::PdfToImages {
            input: pdf_input,
            output,
            previews,
            password,
            store,
        } => {
            let progress = progress_for(show_progress, "pages");
            let config = build_config(global, progress, |mut b| {
                if let Some(pwd) = password {
                    b = b.password(pwd.clone());
                }
                if *store {
                    b = b.compression(ArchiveCompression::Stored);
                }
                b
            })?;

            let pdf = input::resolve_input(pdf_input, config.download_timeout_secs)
                .await
                .with_context(|| format!("Failed to read '{pdf_input}'"))?;

            let mut tool = pdf_to_images_tool(config, Arc::clone(&notifier));
            if tool.select_files(vec![pdf]).await == 0 {
                anyhow::bail!("'{pdf_input}' could not be opened as a PDF");
            }
            let artifact = tool.convert().await.context("Conversion failed")?;
            let path = save_download(artifact, output)
                .await
                .context("Failed to save archive")?;
            if let Some(dir) = previews {
                let written = artifact
                    .save_previews(dir)
                    .await
                    .context("Failed to save page previews")?;
                if !global.quiet && !global.json {
                    eprintln!(
                        "   {} page images  →  {}",
                        written.len(),
                        bold(&dir.display().to_string())
                    );
                }
            }
            report(global, artifact.stats(), &path)?;
        }

        Command::Inspect {
            input: pdf_input,
            password,
        } => {
            let config = build_config(global, None, |b| match password {
                Some(pwd) => b.password(pwd.clone()),
                None => b,
            })?;
            let info = inspect(pdf_input, &config)
                .await
                .context("Failed to inspect PDF")?;

            if global.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info).context("Failed to serialize info")?
                );
            } else {
                println!("File:   {}", info.name);
                println!("Pages:  {}", info.page_count);
                println!("Size:   {} bytes", info.size_bytes);
            }
        }
    }

    Ok(())
}

fn progress_for(show: bool, unit: &'static str) -> Option<ProgressCallback> {
    show.then(|| CliProgressCallback::new(unit) as ProgressCallback)
}

/// Map shared flags to a builder, let the subcommand adjust it, then validate.
fn build_config(
    global: &GlobalArgs,
    progress: Option<ProgressCallback>,
    customise: impl FnOnce(toolbox_pdf::ConversionConfigBuilder) -> toolbox_pdf::ConversionConfigBuilder,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().download_timeout_secs(global.download_timeout);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    customise(builder).build().context("Invalid configuration")
}

/// Final summary line, or the stats as JSON.
fn report(global: &GlobalArgs, stats: &ConversionStats, path: &std::path::Path) -> Result<()> {
    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(stats).context("Failed to serialise stats")?
        );
    } else if !global.quiet {
        eprintln!(
            "{}  {}/{} converted  {}  {}ms  →  {}",
            if stats.skipped_count == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            stats.output_count,
            stats.input_count,
            dim(&format!("{} bytes", stats.output_bytes)),
            stats.duration_ms,
            bold(&path.display().to_string()),
        );
    }
    Ok(())
}
