use anyhow::Result;
use clap::Parser;

use foliowatch::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Application error: {}", e);
            for cause in e.chain().skip(1) {
                tracing::error!("   Caused by: {}", cause);
            }
            Err(e)
        }
    }
}
