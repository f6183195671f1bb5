use std::time::Duration;

use dotenv::dotenv;
use log::LevelFilter;
use log::error;
use sqlx::postgres::PgPoolOptions;
use wavescrape::{LoadFromEnv, ScraperEnv, SessionClient, WaveSiteScraper};

extern crate env_logger;
extern crate log;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .init();

    let config = ScraperEnv::load_from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;
    let session = SessionClient::new(Duration::from_secs(config.request_timeout_secs))?;

    let scraper = WaveSiteScraper::new(config, session, pool);
    if let Err(e) = scraper.run().await {
        error!("scrape run failed: {e:#}");
        return Err(e);
    }
    Ok(())
}
