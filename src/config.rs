use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

pub const WAVE_REPORT_TABLE: &str = "WAVE_REPORT";
pub const WEATHER_REPORT_TABLE: &str = "WEATHER_REPORT";

/// Env vars needed for a scrape run. Secrets come from the environment (or a
/// local `.env`), never from the repository.
#[derive(Debug, Deserialize)]
pub struct ScraperEnv {
    pub login_url: String,
    pub login_account: String,
    pub login_password: String,
    pub area_detail_page_url: String,
    pub database_url: String,
    pub point_master_table: String,
    #[serde(default = "default_write_mode")]
    pub write_mode: String,
    #[serde(default = "default_key_columns")]
    pub wave_report_key_columns: String,
    #[serde(default = "default_key_columns")]
    pub weather_report_key_columns: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_write_mode() -> String {
    "upsert".to_string()
}

fn default_key_columns() -> String {
    "point_id,date,time".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
