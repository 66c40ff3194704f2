//! Image decoding service
//!
//! Turns request bytes into bitmaps under the decode limits of a
//! [`PlatformContext`].

use crate::{
    context::PlatformContext,
    error::{BgRemovalError, Result},
};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Service for turning request bytes into bitmaps
pub struct ImageIOService;

impl ImageIOService {
    /// Decode encoded image bytes into a bitmap
    ///
    /// The format is detected from the content. Dimension and allocation limits
    /// come from `context`.
    ///
    /// # Errors
    /// - Empty input
    /// - Unrecognised or corrupt image data
    /// - Image exceeding the context's decode limits
    ///
    /// # Examples
    /// ```rust,no_run
    /// use bgremove_channel::{services::ImageIOService, PlatformContext};
    ///
    /// # fn example(bytes: &[u8]) -> bgremove_channel::Result<()> {
    /// let bitmap = ImageIOService::decode_bytes(bytes, &PlatformContext::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode_bytes(bytes: &[u8], context: &PlatformContext) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(BgRemovalError::processing_stage_error(
                "decode",
                "image data is empty",
                None,
            ));
        }

        let format = Self::sniff_format(bytes);
        debug!(
            size_bytes = bytes.len(),
            format = ?format,
            context = %context.label,
            "Decoding request image"
        );

        let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        reader.limits(context.decode_limits());

        reader.decode().map_err(|e| {
            BgRemovalError::processing_stage_error(
                "decode",
                &e.to_string(),
                Some(&format!("{} bytes, format {:?}", bytes.len(), format)),
            )
        })
    }

    /// Detect the container format from magic bytes
    #[must_use]
    pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        buffer
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(8, 4);
        let image = ImageIOService::decode_bytes(&bytes, &PlatformContext::default()).unwrap();
        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 4);
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(
            ImageIOService::sniff_format(&png_bytes(1, 1)),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageIOService::sniff_format(b"definitely not an image"), None);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = ImageIOService::decode_bytes(&[], &PlatformContext::default()).unwrap_err();
        assert!(matches!(err, BgRemovalError::Processing(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = ImageIOService::decode_bytes(b"garbage bytes", &PlatformContext::default())
            .unwrap_err();
        assert!(matches!(err, BgRemovalError::Processing(_)));
    }

    #[test]
    fn test_context_limits_applied() {
        let bytes = png_bytes(64, 64);
        let context = PlatformContext::new("tiny").with_max_dimensions(32, 32);
        assert!(ImageIOService::decode_bytes(&bytes, &context).is_err());
    }
}
