//! Pagewalk CLI entry point

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pagewalk_cli::cli::run().await
}
