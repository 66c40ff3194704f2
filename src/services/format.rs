//! PNG output service

use crate::{
    config::PngCompression,
    error::{BgRemovalError, Result},
};
use image::codecs::png::{FilterType as PngFilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Eight-byte PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Service for encoding composited canvases
pub struct PngOutputHandler;

impl PngOutputHandler {
    /// Encode an RGBA canvas as lossless PNG
    ///
    /// # Errors
    /// - Encoder failure (reported as a processing error at the encode stage)
    pub fn encode(canvas: &RgbaImage, compression: PngCompression) -> Result<Vec<u8>> {
        let (width, height) = canvas.dimensions();
        let mut buffer = Vec::new();

        PngEncoder::new_with_quality(&mut buffer, compression.into(), PngFilterType::Adaptive)
            .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| {
                BgRemovalError::processing_stage_error(
                    "encode",
                    &e.to_string(),
                    Some(&format!("{}x{} RGBA", width, height)),
                )
            })?;

        Ok(buffer)
    }

    /// Check whether `bytes` start with the PNG signature
    #[must_use]
    pub fn is_png(bytes: &[u8]) -> bool {
        bytes.starts_with(&PNG_SIGNATURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    #[test]
    fn test_encode_is_lossless() {
        let mut canvas = RgbaImage::from_pixel(4, 3, Rgba([255, 255, 255, 255]));
        canvas.put_pixel(1, 1, Rgba([12, 34, 56, 255]));

        for compression in [PngCompression::Fast, PngCompression::Default, PngCompression::Best] {
            let bytes = PngOutputHandler::encode(&canvas, compression).unwrap();
            assert!(PngOutputHandler::is_png(&bytes));

            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.dimensions(), (4, 3));
            assert_eq!(decoded.to_rgba8(), canvas);
        }
    }

    #[test]
    fn test_is_png() {
        assert!(PngOutputHandler::is_png(&PNG_SIGNATURE));
        assert!(!PngOutputHandler::is_png(b"\xFF\xD8\xFF\xE0"));
        assert!(!PngOutputHandler::is_png(&[]));
    }
}
