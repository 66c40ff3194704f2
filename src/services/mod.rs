//! Services separating image I/O and encoding from the pipeline

pub mod format;
pub mod io;

pub use format::{PngOutputHandler, PNG_SIGNATURE};
pub use io::ImageIOService;
