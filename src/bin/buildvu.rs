//! CLI binary for buildvu-client.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ClientConfig` and prints the preview URL.

use anyhow::{Context, Result};
use buildvu_client::{
    ClientConfig, ConversionClient, ConversionProgressCallback, InputSource, ProgressCallback,
};
use clap::Parser;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single spinner whose message follows the
/// job through upload, polling and download.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Uploading");
        bar.set_message("sending document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_job_accepted(&self, uuid: &str) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(format!("job {}", dim(uuid)));
    }

    fn on_poll(&self, attempt: u32, state: &str) {
        self.bar.set_message(format!("{state} {}", dim(&format!("(poll {attempt})"))));
    }

    fn on_download_progress(&self, downloaded: u64, total: Option<u64>) {
        self.bar.set_prefix("Downloading");
        match total {
            Some(t) => self
                .bar
                .set_message(format!("{} / {}", HumanBytes(downloaded), HumanBytes(t))),
            None => self.bar.set_message(format!("{}", HumanBytes(downloaded))),
        }
    }

    fn on_conversion_complete(&self, _preview_url: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload a local file and print the preview URL
  buildvu --url http://localhost:8080/microservice-example path/to/file.pdf

  # Also download the output archive (written as file.zip)
  buildvu --url http://localhost:8080/microservice-example file.pdf -o out/

  # Let the server fetch the document itself
  buildvu --url http://localhost:8080/microservice-example https://link.to/filename.pdf

  # Get notified when the conversion finishes
  buildvu --callback-url http://listener.url file.pdf

  # Print the full result as JSON
  buildvu --json file.pdf

ENVIRONMENT VARIABLES:
  BUILDVU_URL             Base URL of the microservice
  RUST_LOG                Override the log filter (e.g. buildvu_client=debug)
"#;

/// Convert documents with a BuildVu microservice.
#[derive(Parser, Debug)]
#[command(
    name = "buildvu",
    version,
    about = "Convert documents with a BuildVu microservice",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path, or HTTP/HTTPS URL for the server to fetch.
    input: String,

    /// Base URL of the microservice.
    #[arg(short, long, env = "BUILDVU_URL")]
    url: String,

    /// Download the output archive into this directory.
    #[arg(short, long, env = "BUILDVU_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Connect timeout per request, in seconds.
    #[arg(long, env = "BUILDVU_CONNECT_TIMEOUT", default_value_t = 10)]
    connect_timeout: u64,

    /// Read timeout per request, in seconds.
    #[arg(long, env = "BUILDVU_READ_TIMEOUT", default_value_t = 30)]
    read_timeout: u64,

    /// Maximum time to wait for the conversion, in seconds.
    #[arg(long, env = "BUILDVU_CONVERSION_TIMEOUT", default_value_t = 30)]
    conversion_timeout: u64,

    /// URL the server notifies when the conversion finishes.
    #[arg(long, env = "BUILDVU_CALLBACK_URL")]
    callback_url: Option<String>,

    /// Extra form parameter as KEY=VALUE (repeatable).
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Print the full conversion result as JSON.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "BUILDVU_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BUILDVU_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "BUILDVU_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers what INFO logs would say; keep them for -v or when
    // the spinner is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let client = ConversionClient::with_config(config).context("Failed to set up converter")?;

    let source = if buildvu_client::pipeline::upload::is_url(&cli.input) {
        InputSource::Download(cli.input.clone())
    } else {
        InputSource::Upload(PathBuf::from(&cli.input))
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let result = client.submit(&source).await.context("Conversion failed")?;

    let archive = match cli.output_dir {
        Some(ref dir) => Some(
            client
                .download_result(&result, dir)
                .await
                .context("Failed to download conversion output")?,
        ),
        None => None,
    };

    if let Some(config) = client.config() {
        config.progress().on_conversion_complete(&result.preview_url);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    } else {
        println!("{}", result.preview_url);
        if !cli.quiet {
            eprintln!("{} Converted {}", green("✔"), bold(&cli.input));
            if let Some(ref path) = archive {
                eprintln!("   archive  →  {}", bold(&path.display().to_string()));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder(&cli.url)
        .request_timeout_secs(cli.connect_timeout, cli.read_timeout)
        .conversion_timeout_secs(cli.conversion_timeout);

    if let Some(ref callback) = cli.callback_url {
        builder = builder.callback_url(callback);
    }
    for (name, value) in &cli.params {
        builder = builder.parameter(name, value);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--param KEY=VALUE`.
fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
