mod config;
mod journal;
mod runner;

use anyhow::{bail, Result};
use config::AppConfig;
use runner::Runner;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!("usage: {} <market-id> <outcome> [config.toml]", args[0]);
    }
    let market_id = &args[1];
    let outcome = &args[2];
    let config_path = args.get(3).map(String::as_str).unwrap_or("config.toml");

    let config = AppConfig::load(config_path)?;
    info!("Simulating '{}' on market {}", outcome, market_id);

    let mut runner = Runner::new(config)?;
    let report = runner.run(market_id, outcome).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
