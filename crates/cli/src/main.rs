use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use excerpo_core::{
    ExtractEvent, ExtractOptions, ExtractionMode, ExtractionResult, Extractor, UrlCategory,
};
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

mod export;

use export::{ExportConfig, ExportFormat, build_report};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract readable text from batches of web pages
#[derive(Parser, Debug)]
#[command(name = "excerpo")]
#[command(version = VERSION)]
#[command(about = "Extract readable text from batches of web pages", long_about = None)]
struct Args {
    /// URLs to fetch, local HTML files, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "input_file")]
    inputs: Vec<String>,

    /// File with one URL per line ("#" starts a comment)
    #[arg(short, long, value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Output file for the combined report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report format (text, markdown, html, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: ExportFormat,

    /// Content location strategy (auto, readability, selectors, fullpage)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    mode: ExtractionMode,

    /// Maximum concurrent fetches
    #[arg(long, default_value = "10", value_name = "NUM")]
    max_connections: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Skip storefront and marketplace hosts
    #[arg(long)]
    exclude_ecommerce: bool,

    /// Skip adult hosts
    #[arg(long)]
    exclude_adult: bool,

    /// Process repeated URLs instead of skipping them
    #[arg(long)]
    keep_duplicates: bool,

    /// Disable the on-disk response cache
    #[arg(long)]
    no_cache: bool,

    /// Collect image info from extracted pages
    #[arg(long)]
    images: bool,

    /// Collect link info from extracted pages
    #[arg(long)]
    links: bool,

    /// Stop the whole batch at the first failed URL
    #[arg(long)]
    stop_on_error: bool,

    /// Keep failed results in the report
    #[arg(long)]
    include_errors: bool,

    /// Omit per-result URL/title headers from the report
    #[arg(long)]
    no_headers: bool,

    /// Render one flat list instead of per-category sections
    #[arg(long)]
    no_sections: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_banner() {
    eprintln!("\n{} {} {}", "Excerpo".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract readable text from batches of web pages".dimmed());
    eprintln!();
}

fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "excerpo=debug" } else { "excerpo=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_url_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list: {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Local inputs (files and stdin) bypass the fetch path entirely.
fn is_local_input(input: &str) -> bool {
    input == "-" || Path::new(input).exists()
}

fn extract_local(extractor: &Extractor, input: &str) -> ExtractionResult {
    let html = if input == "-" {
        let mut buffer = String::new();
        match io::stdin().read_to_string(&mut buffer) {
            Ok(_) => buffer,
            Err(err) => {
                return ExtractionResult::failure(
                    "stdin",
                    UrlCategory::Invalid,
                    excerpo_core::FailureKind::FetchFailed,
                    format!("failed to read stdin: {err}"),
                );
            }
        }
    } else {
        match fs::read_to_string(input) {
            Ok(html) => html,
            Err(err) => {
                return ExtractionResult::failure(
                    input,
                    UrlCategory::Invalid,
                    excerpo_core::FailureKind::FetchFailed,
                    format!("failed to read file: {err}"),
                );
            }
        }
    };

    let name = if input == "-" { "stdin" } else { input };
    let url = format!("file:///{}", name.trim_start_matches('/'));
    match extractor.extract_html(&html, &url) {
        Ok(record) => ExtractionResult::success(name, UrlCategory::Html, record),
        Err(err) => {
            ExtractionResult::failure(name, UrlCategory::Html, err.failure_kind(), err.to_string())
        }
    }
}

async fn print_progress(mut rx: mpsc::Receiver<ExtractEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ExtractEvent::Success(result) => {
                eprintln!("{} {}", "✓".green(), result.url.bright_white());
            }
            ExtractEvent::Error(result) => {
                let reason = result
                    .failure
                    .map(|f| f.kind.to_string())
                    .unwrap_or_else(|| "failed".to_string());
                eprintln!("{} {} {}", "✗".red(), result.url.bright_white(), reason.dimmed());
            }
            ExtractEvent::Progress { completed, total, status, stats, .. } => {
                if let Some(stats) = stats {
                    let processed: usize = stats.categories().map(|c| stats.count(c)).sum();
                    eprintln!(
                        "{} {} {}",
                        format!("[{completed}/{total}]").dimmed(),
                        status.bright_cyan(),
                        format!("({processed} categorized)").dimmed()
                    );
                } else {
                    eprintln!("{} {}", format!("[{completed}/{total}]").dimmed(), status.dimmed());
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        print_banner();
    }

    let mut inputs = args.inputs.clone();
    if let Some(path) = &args.input_file {
        inputs.extend(read_url_file(path)?);
    }
    anyhow::ensure!(!inputs.is_empty(), "no inputs given");

    let options = ExtractOptions::builder()
        .extraction_mode(args.mode)
        .max_connections(args.max_connections)
        .timeout(args.timeout)
        .exclude_ecommerce(args.exclude_ecommerce)
        .exclude_adult(args.exclude_adult)
        .exclude_duplicates(!args.keep_duplicates)
        .cache_enabled(!args.no_cache)
        .extract_images(args.images)
        .extract_links(args.links)
        .continue_on_error(!args.stop_on_error)
        .build()
        .context("Invalid option combination")?;

    let extractor =
        Arc::new(Extractor::new(options).context("Failed to initialize extractor")?);

    let (local, remote): (Vec<String>, Vec<String>) =
        inputs.into_iter().partition(|input| is_local_input(input));

    let mut results: Vec<ExtractionResult> =
        local.iter().map(|input| extract_local(&extractor, input)).collect();

    if !remote.is_empty() {
        let (tx, rx) = mpsc::channel(64);
        let progress = tokio::spawn(print_progress(rx));
        let batch = extractor.extract_batch(&remote, tx).await;
        let _ = progress.await;
        results.extend(batch.context("Batch aborted")?);
    }

    let export_config = ExportConfig {
        format: args.format,
        include_headers: !args.no_headers,
        include_errors: args.include_errors,
        separate_sections: !args.no_sections,
    };
    let report = build_report(&results, &export_config).context("Failed to render report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, report)
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Report written to {}", path.display()));
        }
        None => print!("{report}"),
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        print_error(&format!("{failed} of {} inputs failed", results.len()));
    }
    anyhow::ensure!(failed < results.len(), "no input could be extracted");

    Ok(())
}
