//! Background removal channel CLI tool
//!
//! Sends a single `removeBackground` call through an in-process plugin host
//! and writes the composited PNG.

#[cfg(feature = "cli")]
use bgremove_channel::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
