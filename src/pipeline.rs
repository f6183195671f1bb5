use chrono::Local;
use log::info;
use sqlx::PgPool;

use crate::{
    config::{ScraperEnv, WAVE_REPORT_TABLE, WEATHER_REPORT_TABLE},
    point_master::PointMasterTable,
    record_sink::{ReportSink, WriteStrategy},
    requests::{PageFetcher, SessionClient},
    wave_report::extract_wave_report,
    weather_report::extract_weather_report,
};

/// One full scrape run: login, fetch the area-summary page once, then build
/// and load both reports from it. Fetches are strictly sequential and share
/// the session's cookie state.
pub struct WaveSiteScraper {
    config: ScraperEnv,
    session: SessionClient,
    pool: PgPool,
}

impl WaveSiteScraper {
    pub fn new(config: ScraperEnv, session: SessionClient, pool: PgPool) -> Self {
        Self {
            config,
            session,
            pool,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        self.session
            .login(
                &self.config.login_url,
                &self.config.login_account,
                &self.config.login_password,
            )
            .await?;
        info!("logged in, fetching {}", self.config.area_detail_page_url);
        let area_html = self
            .session
            .fetch_page(&self.config.area_detail_page_url)
            .await?;

        let today = Local::now().date_naive();
        let resolver = PointMasterTable::new(
            self.pool.clone(),
            self.config.point_master_table.clone(),
        );
        let sink = ReportSink::new(self.pool.clone());

        info!("building wave report");
        let wave_records = extract_wave_report(&area_html, &resolver, today).await?;
        info!("extracted {} wave records", wave_records.len());
        let strategy = WriteStrategy::from_config(
            &self.config.write_mode,
            &self.config.wave_report_key_columns,
        )?;
        sink.write(&wave_records, WAVE_REPORT_TABLE, &strategy).await?;
        info!("wave report done");

        info!("building weather report");
        let weather_records =
            extract_weather_report(&area_html, &self.session, &resolver, today).await?;
        info!("extracted {} weather records", weather_records.len());
        let strategy = WriteStrategy::from_config(
            &self.config.write_mode,
            &self.config.weather_report_key_columns,
        )?;
        sink.write(&weather_records, WEATHER_REPORT_TABLE, &strategy)
            .await?;
        info!("weather report done");

        Ok(())
    }
}
