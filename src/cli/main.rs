//! Command-line driver for the background removal channel
//!
//! Registers the plugin on a local [`PluginHost`], attaches an activity
//! context and sends one `removeBackground` call per input, exactly as an
//! embedding UI framework would.

use crate::backends::PassthroughRemover;
use crate::channel::{MethodCall, MethodResponse, CHANNEL_NAME};
use crate::cli::config::CliConfigBuilder;
use crate::plugin::{register_plugin, BackgroundRemoverPlugin, PluginHost};
use crate::tracing_config::{init_cli_tracing, TracingFormat};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use instant::Instant;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Composite an already-segmented image onto an opaque canvas
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-channel")]
pub struct Cli {
    /// Input image file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Output PNG file (use "-" for stdout) [default: <input>_composited.png]
    #[arg(short, long)]
    pub output: Option<String>,

    /// JSON compositor configuration file; flags override its values
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output canvas width in pixels [default: 256]
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Resampling filter [default: bilinear]
    #[arg(long, value_enum)]
    pub filter: Option<CliFilter>,

    /// PNG compression effort [default: best]
    #[arg(long, value_enum)]
    pub compression: Option<CliPngCompression>,

    /// Canvas colour as RRGGBB hex [default: ffffff]
    #[arg(short, long)]
    pub background: Option<String>,

    /// Request the capability's fast mode instead of high accuracy
    #[arg(long)]
    pub fast: bool,

    /// Largest accepted input width or height
    #[arg(long)]
    pub max_decode_dimension: Option<u32>,

    /// Decoder allocation limit in MiB
    #[arg(long)]
    pub max_decode_mib: Option<u64>,

    /// Enable verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit JSON structured logs
    #[cfg(feature = "tracing-json")]
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliFilter {
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliPngCompression {
    Fast,
    Default,
    Best,
}

impl Cli {
    fn tracing_format(&self) -> TracingFormat {
        #[cfg(feature = "tracing-json")]
        let format = if self.json_logs {
            TracingFormat::Json
        } else {
            TracingFormat::Console
        };
        #[cfg(not(feature = "tracing-json"))]
        let format = TracingFormat::Console;
        format
    }

    /// Where the composited PNG goes; `None` means stdout
    fn output_path(&self) -> Option<PathBuf> {
        match self.output.as_deref() {
            Some("-") => None,
            Some(path) => Some(PathBuf::from(path)),
            None if self.input == "-" => None,
            None => Some(default_output_path(Path::new(&self.input))),
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose, cli.tracing_format())
        .context("Failed to initialize tracing")?;

    run(&cli).await
}

/// Run one conversion described by `cli`
///
/// # Errors
/// - Invalid configuration or decode limits
/// - Unreadable input or unwritable output
/// - The channel answered with an error or "not implemented"
pub async fn run(cli: &Cli) -> Result<()> {
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    let context = CliConfigBuilder::context_from_cli(cli)?;
    debug!(?config, "Resolved compositor configuration");

    let host = PluginHost::new();
    let plugin = BackgroundRemoverPlugin::new(PassthroughRemover::new(), config)
        .context("Failed to create background removal plugin")?;
    register_plugin(&host, Arc::new(plugin));
    host.attach_to_activity(context)
        .context("Failed to attach activity context")?;

    let input = read_input(&cli.input)?;
    info!(input = %cli.input, bytes = input.len(), "Sending removeBackground call");

    let start = Instant::now();
    let response = host
        .dispatch(CHANNEL_NAME, MethodCall::remove_background(input))
        .await;
    host.detach_from_activity();

    let png = match response {
        MethodResponse::Success { result } => result
            .into_bytes()
            .context("Channel returned a non-binary result")?,
        MethodResponse::Error { code, message, .. } => anyhow::bail!("{code}: {message}"),
        MethodResponse::NotImplemented => anyhow::bail!("removeBackground is not implemented"),
    };

    let output = cli.output_path();
    write_output(output.as_deref(), &png)?;
    info!(
        output = %output.as_deref().map_or_else(|| "<stdout>".into(), |p| p.display().to_string()),
        png_bytes = png.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Composited image written"
    );

    Ok(())
}

fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read image from stdin")?;
        return Ok(buffer);
    }
    std::fs::read(input).with_context(|| format!("Failed to read input file {input}"))
}

fn write_output(path: Option<&Path>, png: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, png)
            .with_context(|| format!("Failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(png).context("Failed to write PNG to stdout")?;
            stdout.flush().context("Failed to flush stdout")
        },
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy().into_owned());
    input.with_file_name(format!("{stem}_composited.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("photos/cat.jpg")),
            PathBuf::from("photos/cat_composited.png")
        );
    }

    #[test]
    fn test_output_path_resolution() {
        let cli = Cli::parse_from(["bgremove-channel", "-"]);
        assert_eq!(cli.output_path(), None);

        let cli = Cli::parse_from(["bgremove-channel", "a.png", "-o", "-"]);
        assert_eq!(cli.output_path(), None);

        let cli = Cli::parse_from(["bgremove-channel", "a.png", "-o", "b.png"]);
        assert_eq!(cli.output_path(), Some(PathBuf::from("b.png")));

        let cli = Cli::parse_from(["bgremove-channel", "a.png"]);
        assert_eq!(cli.output_path(), Some(PathBuf::from("a_composited.png")));
    }

    #[test]
    fn test_filter_value_names() {
        let cli = Cli::parse_from(["bgremove-channel", "a.png", "--filter", "catmull-rom"]);
        assert_eq!(cli.filter, Some(CliFilter::CatmullRom));
    }
}
