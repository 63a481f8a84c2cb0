//! CLI binary for img2b64.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use img2b64::{
    inspect, ConversionConfig, ConverterSession, CopyOutcome, DownloadOutcome,
    DownloadProgressCallback, DownloadStage, EncodedArtifact,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders the serializer stages on a single
/// spinner line. Stage transitions arrive in order (the serializer is
/// strictly sequential), so a plain message swap is enough.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl DownloadProgressCallback for CliProgressCallback {
    fn on_stage_change(&self, stage: &DownloadStage) {
        match stage {
            DownloadStage::Pending => {}
            DownloadStage::Validating => self.bar.set_message("Validating Base64 payload…"),
            DownloadStage::Generating => self.bar.set_message("Generating file name…"),
            DownloadStage::Downloading => self.bar.set_message("Writing artifact…"),
            DownloadStage::Completed => self.bar.finish_and_clear(),
            DownloadStage::Error { .. } => self.bar.finish_and_clear(),
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert and download to ./base64_conversion_<timestamp>.txt
  img2b64 photo.png

  # Write the artifact into a specific directory
  img2b64 photo.jpg -o out/

  # Copy the Base64 text to the clipboard instead of downloading
  img2b64 photo.png --copy

  # Print the raw Base64 to stdout (pipe-friendly)
  img2b64 photo.png --print > photo.b64

  # Machine-readable result
  img2b64 photo.png --json

  # Explain why a file is rejected (no conversion performed)
  img2b64 suspicious.png --inspect-only

LIMITS:
  Only JPEG and PNG are accepted, verified by byte signature — the file
  extension alone is never trusted. Input files and Base64 payloads are
  capped at 10 MiB.

ENVIRONMENT VARIABLES:
  RUST_LOG    Log filter for diagnostics, e.g. RUST_LOG=img2b64=debug
"#;

/// Convert JPEG/PNG images to Base64 text files.
#[derive(Parser, Debug)]
#[command(
    name = "img2b64",
    version,
    about = "Convert JPEG/PNG images to Base64 text, with byte-signature validation",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Image file to convert (.jpg, .jpeg or .png)
    input: PathBuf,

    /// Directory for the generated .txt artifact (default: current dir)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Copy the Base64 text to the system clipboard instead of downloading
    #[arg(long)]
    copy: bool,

    /// Print the raw Base64 text to stdout instead of downloading
    #[arg(long)]
    print: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Only report the file's format verdict; do not convert
    #[arg(long)]
    inspect_only: bool,

    /// Suppress the progress spinner
    #[arg(short, long)]
    quiet: bool,
}

/// Everything `--json` emits for a conversion run.
#[derive(serde::Serialize)]
struct JsonReport<'a> {
    artifact: &'a EncodedArtifact,
    download: Option<&'a DownloadOutcome>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.inspect_only {
        let report = inspect(&cli.input)
            .await
            .with_context(|| format!("could not inspect {}", cli.input.display()))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", bold(&report.file_name));
            println!("  size      {} bytes", report.byte_len);
            println!("  declared  {}", report.declared.as_str());
            println!("  sniffed   {:?}", report.sniffed);
            if let Some(ok) = report.png_structure_ok {
                let verdict = if ok { green("ok") } else { red("invalid") };
                println!("  png chunks {verdict}");
            }
            if !report.within_size_limit {
                println!("  {}", red("exceeds the 10 MiB limit"));
            }
        }
        return Ok(());
    }

    // ── Configure & convert ──────────────────────────────────────────────
    let show_spinner = !cli.quiet && !cli.json && !cli.print;
    let mut builder = ConversionConfig::builder();
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if show_spinner {
        builder = builder.progress_callback(CliProgressCallback::new());
    }
    let config = builder.build().context("invalid configuration")?;

    let mut session = ConverterSession::new(config);
    session.select_file(Some(cli.input.as_path())).await?;
    session.convert().await?;

    if cli.print {
        let artifact = session
            .artifact()
            .context("conversion completed without an artifact")?;
        println!("{}", artifact.base64_text);
        return Ok(());
    }

    if cli.copy {
        match session.copy_result().await? {
            CopyOutcome::Clipboard => {
                eprintln!("{} Base64 text copied to clipboard", green("✔"));
            }
            CopyOutcome::FallbackFile(path) => {
                eprintln!(
                    "{} Clipboard unavailable — text saved for manual copy: {}",
                    yellow("⚠"),
                    path.display()
                );
            }
        }
        if cli.json {
            let artifact = session
                .artifact()
                .context("conversion completed without an artifact")?;
            let report = JsonReport {
                artifact,
                download: None,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    // ── Download ─────────────────────────────────────────────────────────
    let outcome = session.download_result().await?;

    if cli.json {
        let artifact = session
            .artifact()
            .context("conversion completed without an artifact")?;
        let report = JsonReport {
            artifact,
            download: Some(&outcome),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    render_outcome(&outcome);
    if !outcome.success && outcome.fallback_path.is_none() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_outcome(outcome: &DownloadOutcome) {
    if outcome.success {
        if let (Some(path), Some(size)) = (&outcome.file_path, outcome.byte_size) {
            eprintln!(
                "{} Wrote {}  {}",
                green("✔"),
                bold(&path.display().to_string()),
                dim(&format!("{size} bytes"))
            );
        }
    } else if let Some(fallback) = &outcome.fallback_path {
        eprintln!(
            "{} Automatic download unavailable — payload saved to {}",
            yellow("⚠"),
            bold(&fallback.display().to_string())
        );
        if let Some(err) = &outcome.error {
            eprintln!("  {}", dim(err));
        }
    } else {
        eprintln!(
            "{} Download failed: {}",
            red("✘"),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}
