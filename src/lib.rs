mod config;
mod error;
mod pipeline;
mod point_master;
mod ratelimit;
mod record_sink;
mod requests;
mod text_manipulators;
mod wave_report;
mod weather_report;

pub use config::{LoadFromEnv, ScraperEnv, WAVE_REPORT_TABLE, WEATHER_REPORT_TABLE};
pub use error::ScrapeError;
pub use point_master::{PointMasterTable, PointResolver};
pub use record_sink::{ReportSink, TableRecord, WriteStrategy, build_statements};
pub use requests::{PageFetcher, SessionClient};
pub use pipeline::WaveSiteScraper;
pub use wave_report::{WaveRecord, extract_wave_report};
pub use weather_report::{WeatherRecord, extract_weather_report, forward_fill};
