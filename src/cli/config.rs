//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliFilter, CliPngCompression};
use crate::{
    config::{CompositorConfig, PngCompression, ResampleFilter},
    context::PlatformContext,
};
use anyhow::{Context, Result};

/// Label given to the activity context the CLI attaches
const CLI_ACTIVITY_LABEL: &str = "cli";

/// Convert CLI arguments to a compositor configuration and activity context
pub struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the compositor configuration.
    ///
    /// A `--config` JSON file provides the base; explicit flags override it.
    ///
    /// # Errors
    /// - Unreadable or malformed config file
    /// - Invalid background colour
    /// - Resulting configuration fails validation
    pub fn from_cli(cli: &Cli) -> Result<CompositorConfig> {
        let mut config = match &cli.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                CompositorConfig::from_json(&json)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            },
            None => CompositorConfig::default(),
        };

        if let Some(width) = cli.width {
            config.target_width = width;
        }
        if let Some(filter) = cli.filter {
            config.resample_filter = filter.into();
        }
        if let Some(compression) = cli.compression {
            config.png_compression = compression.into();
        }
        if let Some(background) = &cli.background {
            config.background_color = parse_hex_color(background)?;
        }
        if cli.fast {
            config.enable_high_accuracy = false;
        }

        config.validate().context("Invalid compositor configuration")?;
        Ok(config)
    }

    /// Build the activity context handed to each call
    ///
    /// # Errors
    /// - Zero decode limits
    pub fn context_from_cli(cli: &Cli) -> Result<PlatformContext> {
        let mut context = PlatformContext::new(CLI_ACTIVITY_LABEL);
        if let Some(max) = cli.max_decode_dimension {
            context = context.with_max_dimensions(max, max);
        }
        if let Some(mib) = cli.max_decode_mib {
            context = context.with_max_alloc(mib.saturating_mul(1024 * 1024));
        }
        context.validate().context("Invalid decode limits")?;
        Ok(context)
    }
}

/// Parse `RRGGBB` (optionally `#`-prefixed) into an opaque RGBA colour
///
/// # Errors
/// - Wrong length or non-hex digits
pub fn parse_hex_color(value: &str) -> Result<[u8; 4]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Background colour must be RRGGBB hex, got '{value}'");
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).context("Invalid hex digit in background colour")
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255])
}

impl From<CliFilter> for ResampleFilter {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => Self::Nearest,
            CliFilter::Bilinear => Self::Bilinear,
            CliFilter::CatmullRom => Self::CatmullRom,
            CliFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

impl From<CliPngCompression> for PngCompression {
    fn from(compression: CliPngCompression) -> Self {
        match compression {
            CliPngCompression::Fast => Self::Fast,
            CliPngCompression::Default => Self::Default,
            CliPngCompression::Best => Self::Best,
        }
    }
}
