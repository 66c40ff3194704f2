//! CLI integration tests
//!
//! Runs the command-line driver against files in a temporary directory.

#![cfg(feature = "cli")]

mod common;

use bgremove_channel::cli::{run, Cli};
use clap::Parser;
use common::{decode_png, encode_png, solid, WHITE};
use image::Rgba;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("bgremove-channel").chain(args.iter().copied()))
}

#[tokio::test]
async fn test_cli_writes_composited_png() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("wide.png");
    let output = temp_dir.path().join("out.png");
    fs::write(&input, encode_png(&solid(40, 20, Rgba([10, 20, 30, 255])))).unwrap();

    let cli = parse(&[
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    run(&cli).await.unwrap();

    let png = decode_png(&fs::read(&output).unwrap());
    assert_eq!(png.dimensions(), (256, 128));
    assert_eq!(png.get_pixel(128, 64), &Rgba([10, 20, 30, 255]));
}

#[tokio::test]
async fn test_cli_default_output_name_and_width() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("portrait.png");
    fs::write(&input, encode_png(&solid(10, 20, Rgba([0, 0, 0, 0])))).unwrap();

    let cli = parse(&[input.to_str().unwrap(), "--width", "32", "--background", "#00ff00"]);
    run(&cli).await.unwrap();

    let png = decode_png(&fs::read(temp_dir.path().join("portrait_composited.png")).unwrap());
    assert_eq!(png.dimensions(), (32, 64));
    assert!(png.pixels().all(|p| *p == Rgba([0, 255, 0, 255])));
}

#[tokio::test]
async fn test_cli_reports_channel_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("broken.png");
    let output = temp_dir.path().join("never.png");
    fs::write(&input, b"not a png").unwrap();

    let cli = parse(&[input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
    let err = run(&cli).await.unwrap_err();

    assert!(err.to_string().contains("PROCESSING_ERROR"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_cli_missing_input_file() {
    let temp_dir = TempDir::new().unwrap();
    let cli = parse(&[temp_dir.path().join("absent.png").to_str().unwrap()]);
    assert!(run(&cli).await.is_err());
}

#[test]
fn test_binary_exit_status() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.png");
    let bad = temp_dir.path().join("bad.png");
    fs::write(&good, encode_png(&solid(8, 8, WHITE))).unwrap();
    fs::write(&bad, b"garbage").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_bgremove-channel"))
        .arg(&good)
        .status()
        .expect("Failed to run binary");
    assert!(status.success());
    assert!(temp_dir.path().join("good_composited.png").exists());

    let output = Command::new(env!("CARGO_BIN_EXE_bgremove-channel"))
        .arg(&bad)
        .output()
        .expect("Failed to run binary");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PROCESSING_ERROR"));
}
