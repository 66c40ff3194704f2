//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bgremove_channel::{
    register_plugin, BackgroundRemover, BackgroundRemoverPlugin, PlatformContext, PluginHost,
    ProcessedImage, RemoverFailure,
};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const FOREGROUND: Rgba<u8> = Rgba([20, 120, 220, 255]);

/// Capability double recording every call it receives
#[derive(Clone, Default)]
pub struct RecordingRemover {
    output: Option<RgbaImage>,
    fail: bool,
    panic: bool,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    accuracy_flags: Arc<Mutex<Vec<bool>>>,
}

impl RecordingRemover {
    /// Returns the decoded input unchanged
    pub fn echo() -> Self {
        Self::default()
    }

    /// Returns a fixed processed bitmap regardless of input
    pub fn returning(output: RgbaImage) -> Self {
        Self {
            output: Some(output),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn accuracy_flags(&self) -> Vec<bool> {
        self.accuracy_flags.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackgroundRemover for RecordingRemover {
    async fn remove_background(
        &self,
        bitmap: DynamicImage,
        enable_high_accuracy: bool,
    ) -> Result<ProcessedImage, RemoverFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accuracy_flags.lock().unwrap().push(enable_high_accuracy);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic {
            panic!("segmentation model panicked");
        }
        if self.fail {
            return Err(RemoverFailure::new("segmentation model crashed"));
        }
        Ok(match &self.output {
            Some(output) => ProcessedImage::new(output.clone()),
            None => ProcessedImage::from(bitmap),
        })
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Transparent bitmap with an opaque block covering the middle half
pub fn cutout(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside_x = x >= width / 4 && x < width * 3 / 4;
        let inside_y = y >= height / 4 && y < height * 3 / 4;
        if inside_x && inside_y {
            FOREGROUND
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    buffer
}

pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    assert_eq!(
        image::guess_format(bytes).unwrap(),
        image::ImageFormat::Png,
        "reply is not a PNG"
    );
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

/// Host with the plugin registered and an activity attached
pub fn attached_host(remover: RecordingRemover) -> PluginHost {
    let host = PluginHost::new();
    register_plugin(&host, Arc::new(BackgroundRemoverPlugin::with_defaults(remover)));
    host.attach_to_activity(PlatformContext::new("test-activity"))
        .unwrap();
    host
}
