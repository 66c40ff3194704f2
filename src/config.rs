//! Configuration types for compositing background-removed images

use image::codecs::png::CompressionType;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Width of the output canvas, in pixels
pub const DEFAULT_TARGET_WIDTH: u32 = 256;

/// Largest accepted output width
pub const MAX_TARGET_WIDTH: u32 = 8192;

/// Opaque white
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Resampling filter used when scaling the processed bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Nearest neighbour (blocky, fastest)
    Nearest,
    /// Bilinear interpolation
    Bilinear,
    /// Catmull-Rom cubic
    CatmullRom,
    /// Lanczos with window 3 (sharpest, slowest)
    Lanczos3,
}

impl Default for ResampleFilter {
    fn default() -> Self {
        // Matches the smooth scaling of the platform bitmap scaler
        Self::Bilinear
    }
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl std::fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
            Self::CatmullRom => write!(f, "catmullrom"),
            Self::Lanczos3 => write!(f, "lanczos3"),
        }
    }
}

/// PNG compression effort. All levels are lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl Default for PngCompression {
    fn default() -> Self {
        Self::Best
    }
}

impl From<PngCompression> for CompressionType {
    fn from(compression: PngCompression) -> Self {
        match compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Configuration for the decode -> remove -> composite pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Output canvas width; height follows the processed image's aspect ratio
    pub target_width: u32,

    /// Canvas fill colour (RGBA, must be opaque)
    pub background_color: [u8; 4],

    /// Filter used to scale the processed bitmap
    pub resample_filter: ResampleFilter,

    /// PNG compression effort
    pub png_compression: PngCompression,

    /// Ask the removal capability for its high-accuracy mode
    pub enable_high_accuracy: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            background_color: WHITE,
            resample_filter: ResampleFilter::default(),
            png_compression: PngCompression::default(),
            enable_high_accuracy: true,
        }
    }
}

impl CompositorConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use bgremove_channel::{CompositorConfig, ResampleFilter};
    ///
    /// let config = CompositorConfig::builder()
    ///     .target_width(512)
    ///     .resample_filter(ResampleFilter::Lanczos3)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.target_width, 512);
    /// ```
    #[must_use]
    pub fn builder() -> CompositorConfigBuilder {
        CompositorConfigBuilder::default()
    }

    /// Load a configuration from JSON; missing fields take their defaults
    ///
    /// # Errors
    /// - Malformed JSON
    /// - Values rejected by [`CompositorConfig::validate`]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            crate::error::BgRemovalError::invalid_config(format!(
                "Failed to parse compositor config: {}",
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    ///
    /// # Validation Rules
    ///
    /// - Target width: 1-8192 (inclusive)
    /// - Background colour: alpha must be 255 so the output stays fully opaque
    ///
    /// # Errors
    /// - Target width out of range
    /// - Translucent background colour
    pub fn validate(&self) -> crate::Result<()> {
        if self.target_width == 0 || self.target_width > MAX_TARGET_WIDTH {
            return Err(crate::error::BgRemovalError::config_value_error(
                "target width",
                self.target_width,
                "1-8192",
                Some(DEFAULT_TARGET_WIDTH),
            ));
        }

        if self.background_color[3] != u8::MAX {
            return Err(crate::error::BgRemovalError::invalid_config(format!(
                "Background colour must be opaque, got alpha {}",
                self.background_color[3]
            )));
        }

        Ok(())
    }
}

/// Builder for `CompositorConfig`
#[derive(Debug, Default)]
pub struct CompositorConfigBuilder {
    config: CompositorConfig,
}

impl CompositorConfigBuilder {
    /// Set output canvas width
    #[must_use]
    pub fn target_width(mut self, width: u32) -> Self {
        self.config.target_width = width;
        self
    }

    /// Set canvas fill colour
    #[must_use]
    pub fn background_color(mut self, rgba: [u8; 4]) -> Self {
        self.config.background_color = rgba;
        self
    }

    /// Set resampling filter
    #[must_use]
    pub fn resample_filter(mut self, filter: ResampleFilter) -> Self {
        self.config.resample_filter = filter;
        self
    }

    /// Set PNG compression effort
    #[must_use]
    pub fn png_compression(mut self, compression: PngCompression) -> Self {
        self.config.png_compression = compression;
        self
    }

    /// Enable or disable the capability's high-accuracy mode
    #[must_use]
    pub fn enable_high_accuracy(mut self, enabled: bool) -> Self {
        self.config.enable_high_accuracy = enabled;
        self
    }

    /// Build the configuration with validation
    ///
    /// # Errors
    /// - Any rule checked by [`CompositorConfig::validate`]
    pub fn build(self) -> crate::Result<CompositorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
