//! Stillmap CLI - render static map images from job files.
//!
//! Reads a JSON render job (options plus features), runs one render and
//! writes the encoded image to disk.

mod error;
mod job;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use stillmap::{OutputFormat, StaticMapRenderer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::job::RenderJob;

/// Render a static map image from a JSON job file.
#[derive(Debug, Parser)]
#[command(name = "stillmap", version, about)]
struct Cli {
    /// Path to the render job JSON file
    job: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = "map.png")]
    output: PathBuf,

    /// Output format; inferred from the output extension when omitted
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
    Webp,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Webp => OutputFormat::WebP,
        }
    }
}

/// Picks the output format: explicit flag, then output extension, then PNG.
fn resolve_format(format: Option<FormatArg>, output: &Path) -> OutputFormat {
    if let Some(format) = format {
        return format.into();
    }
    match output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
        Some("webp") => OutputFormat::WebP,
        _ => OutputFormat::Png,
    }
}

/// Initializes logging; `RUST_LOG` overrides the verbosity flags.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "stillmap=debug,stillmap_cli=debug,info",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(&cli.job).map_err(|source| CliError::JobRead {
        path: cli.job.display().to_string(),
        source,
    })?;
    let job: RenderJob = serde_json::from_str(&raw)?;
    let features = job.features()?;
    debug!(
        width = job.options.width,
        height = job.options.height,
        features = features.len(),
        "job loaded"
    );

    let mut renderer = StaticMapRenderer::new(job.options)?;
    for feature in features {
        renderer.add_feature(feature);
    }

    let format = resolve_format(cli.format, &cli.output);
    let bytes = renderer.render_encoded(None, None, format).await?;

    std::fs::write(&cli.output, &bytes).map_err(|source| CliError::OutputWrite {
        path: cli.output.display().to_string(),
        source,
    })?;
    println!("Wrote {} ({} bytes)", cli.output.display(), bytes.len());
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
