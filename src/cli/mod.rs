//! CLI module for the bgremove-channel library
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use config::{parse_hex_color, CliConfigBuilder};
pub use main_impl::{main, run, Cli, CliFilter, CliPngCompression};
