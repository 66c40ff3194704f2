//! Image compositor
//!
//! Flattens a background-removed bitmap onto an opaque canvas. The canvas is
//! `target_width` wide and as tall as the processed bitmap's aspect ratio
//! dictates; the scaled bitmap is centered and alpha-blended over the
//! background colour, then the canvas is encoded as PNG.

use crate::{
    config::CompositorConfig,
    error::{BgRemovalError, Result},
    services::PngOutputHandler,
    types::{CompositeResult, ProcessedImage, ProcessingTimings},
};
use image::{imageops, Rgba, Rgba32FImage, RgbaImage};
use instant::Instant;
use tracing::{debug, instrument};

/// Largest canvas height the compositor will allocate
pub const MAX_CANVAS_HEIGHT: u32 = 65_536;

/// Largest canvas area in pixels (64 MiB of RGBA)
pub const MAX_CANVAS_PIXELS: u64 = 16_777_216;

/// Scales, centers and flattens processed bitmaps
#[derive(Debug, Clone)]
pub struct ImageCompositor {
    config: CompositorConfig,
}

impl ImageCompositor {
    /// Create a compositor with a validated configuration
    ///
    /// # Errors
    /// - Configuration rejected by [`CompositorConfig::validate`]
    pub fn new(config: CompositorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Canvas size for a processed bitmap of `width x height`.
    ///
    /// Height is `target_width * height / width`, truncated.
    ///
    /// # Errors
    /// - Processed bitmap with a zero side
    /// - Derived height of zero or above [`MAX_CANVAS_HEIGHT`]
    /// - Canvas area above [`MAX_CANVAS_PIXELS`]
    pub fn target_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        if width == 0 || height == 0 {
            return Err(BgRemovalError::processing_stage_error(
                "composite",
                "processed image has no pixels",
                Some(&format!("{}x{}", width, height)),
            ));
        }

        let target_width = self.config.target_width;
        let target_height = u64::from(target_width) * u64::from(height) / u64::from(width);

        let target_height = match u32::try_from(target_height) {
            Ok(h) if h > 0 && h <= MAX_CANVAS_HEIGHT => h,
            _ => {
                return Err(BgRemovalError::processing_stage_error(
                    "composite",
                    &format!("derived canvas height {} is out of range", target_height),
                    Some(&format!("{}x{}", width, height)),
                ))
            },
        };

        let area = u64::from(target_width) * u64::from(target_height);
        if area > MAX_CANVAS_PIXELS {
            return Err(BgRemovalError::processing_stage_error(
                "composite",
                &format!(
                    "canvas {}x{} exceeds {} pixels",
                    target_width, target_height, MAX_CANVAS_PIXELS
                ),
                Some(&format!("{}x{}", width, height)),
            ));
        }

        Ok((target_width, target_height))
    }

    /// Top-left offset that centers `scaled` on `canvas`, rounded toward the origin
    #[must_use]
    pub fn center_offset(canvas: (u32, u32), scaled: (u32, u32)) -> (i64, i64) {
        let left = (i64::from(canvas.0) - i64::from(scaled.0)) / 2;
        let top = (i64::from(canvas.1) - i64::from(scaled.1)) / 2;
        (left, top)
    }

    /// Scale a bitmap to exactly `width x height` with the configured filter.
    ///
    /// Resampling runs on premultiplied alpha so colour hidden under
    /// transparent pixels never bleeds into the edges of the foreground.
    #[must_use]
    pub fn scale(&self, pixels: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        if pixels.dimensions() == (width, height) {
            return pixels.clone();
        }
        let premultiplied = premultiply(pixels);
        let resized = imageops::resize(
            &premultiplied,
            width,
            height,
            self.config.resample_filter.into(),
        );
        unpremultiply(&resized)
    }

    /// Blend `foreground` over a fresh opaque canvas of `width x height`,
    /// centered. The result is fully opaque.
    #[must_use]
    pub fn flatten_onto_canvas(
        &self,
        foreground: &RgbaImage,
        width: u32,
        height: u32,
    ) -> RgbaImage {
        let background = self.config.background_color;
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba(background));
        let (left, top) = Self::center_offset((width, height), foreground.dimensions());

        for (x, y, pixel) in foreground.enumerate_pixels() {
            let (Ok(cx), Ok(cy)) = (
                u32::try_from(i64::from(x) + left),
                u32::try_from(i64::from(y) + top),
            ) else {
                continue;
            };
            if cx >= width || cy >= height {
                continue;
            }
            canvas.put_pixel(cx, cy, blend_over(*pixel, background));
        }

        canvas
    }

    /// Composite a processed bitmap and encode it as PNG
    ///
    /// # Errors
    /// - Degenerate processed dimensions (see [`Self::target_dimensions`])
    /// - PNG encoding failure
    #[instrument(
        skip(self, processed),
        fields(width = processed.width(), height = processed.height())
    )]
    pub fn composite(&self, processed: ProcessedImage) -> Result<CompositeResult> {
        let composite_start = Instant::now();
        let (original_width, original_height) = processed.dimensions();
        let (target_width, target_height) =
            self.target_dimensions(original_width, original_height)?;

        let scaled = self.scale(processed.pixels(), target_width, target_height);
        drop(processed);
        let canvas = self.flatten_onto_canvas(&scaled, target_width, target_height);
        let composite_ms = composite_start.elapsed().as_millis() as u64;

        let encode_start = Instant::now();
        let bytes = PngOutputHandler::encode(&canvas, self.config.png_compression)?;
        let encode_ms = encode_start.elapsed().as_millis() as u64;

        debug!(
            target_width,
            target_height,
            png_bytes = bytes.len(),
            composite_ms,
            encode_ms,
            "Composited processed image"
        );

        Ok(CompositeResult {
            bytes,
            width: target_width,
            height: target_height,
            timings: ProcessingTimings {
                composite_ms,
                encode_ms,
                ..ProcessingTimings::default()
            },
        })
    }
}

impl Default for ImageCompositor {
    fn default() -> Self {
        Self {
            config: CompositorConfig::default(),
        }
    }
}

fn premultiply(pixels: &RgbaImage) -> Rgba32FImage {
    Rgba32FImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let [r, g, b, a] = pixels.get_pixel(x, y).0;
        let alpha = f32::from(a) / 255.0;
        let channel = |c: u8| f32::from(c) / 255.0 * alpha;
        Rgba([channel(r), channel(g), channel(b), alpha])
    })
}

fn unpremultiply(pixels: &Rgba32FImage) -> RgbaImage {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    RgbaImage::from_fn(pixels.width(), pixels.height(), |x, y| {
        let [r, g, b, a] = pixels.get_pixel(x, y).0;
        if a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)])
    })
}

/// Source-over blend of `foreground` on an opaque `background`
fn blend_over(foreground: Rgba<u8>, background: [u8; 4]) -> Rgba<u8> {
    let [fr, fg, fb, alpha] = foreground.0;
    let [br, bg, bb, _] = background;
    let alpha = u32::from(alpha);
    let inv_alpha = 255 - alpha;

    let channel = |f: u8, b: u8| -> u8 {
        ((u32::from(f) * alpha + u32::from(b) * inv_alpha + 127) / 255) as u8
    };

    Rgba([channel(fr, br), channel(fg, bg), channel(fb, bb), u8::MAX])
}
