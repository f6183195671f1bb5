use log::info;
use sqlx::PgPool;

use crate::{
    error::ScrapeError,
    wave_report::WaveRecord,
    weather_report::WeatherRecord,
};

/// How a record batch is written. Upsert needs the target table's key columns
/// so it can build the conflict clause and keep them out of the SET list.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteStrategy {
    Insert,
    Upsert { key_columns: Vec<String> },
}

impl WriteStrategy {
    /// Builds a strategy from the configured mode string and key-column list.
    pub fn from_config(mode: &str, key_columns: &str) -> Result<Self, ScrapeError> {
        match mode {
            "insert" => Ok(WriteStrategy::Insert),
            "upsert" => Ok(WriteStrategy::Upsert {
                key_columns: key_columns
                    .split(',')
                    .map(|column| column.trim().to_string())
                    .filter(|column| !column.is_empty())
                    .collect(),
            }),
            other => Err(ScrapeError::UnknownWriteMode(other.to_string())),
        }
    }
}

/// A record type that knows its column layout. Column order must match the
/// order of [`TableRecord::values`].
pub trait TableRecord {
    const COLUMNS: &'static [&'static str];

    /// Column values in [`TableRecord::COLUMNS`] order; `None` becomes SQL NULL.
    fn values(&self) -> Vec<Option<String>>;
}

impl TableRecord for WaveRecord {
    const COLUMNS: &'static [&'static str] = &[
        "point_id",
        "date",
        "time",
        "score",
        "score_mark",
        "wave_size",
        "wind_info",
    ];

    fn values(&self) -> Vec<Option<String>> {
        vec![
            self.point_id.clone(),
            Some(self.date.to_string()),
            Some(self.time.clone()),
            Some(self.score.clone()),
            Some(self.score_mark.clone()),
            Some(self.wave_size.clone()),
            Some(self.wind_info.clone()),
        ]
    }
}

impl TableRecord for WeatherRecord {
    const COLUMNS: &'static [&'static str] = &[
        "point_id",
        "date",
        "time",
        "weather",
        "temperature",
        "precipitation",
        "wind_direction",
        "wind_speed",
        "wave_height",
        "wave_direction",
        "wave_period",
    ];

    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.point_id.clone()),
            self.date.map(|date| date.to_string()),
            self.time.clone(),
            self.weather.clone(),
            self.temperature.clone(),
            self.precipitation.clone(),
            self.wind_direction.clone(),
            self.wind_speed.clone(),
            self.wave_height.clone(),
            self.wave_direction.clone(),
            self.wave_period.clone(),
        ]
    }
}

/// Renders one statement per record. Pure; the statements are executed by
/// [`ReportSink::write`].
pub fn build_statements<T: TableRecord>(
    records: &[T],
    table_name: &str,
    strategy: &WriteStrategy,
) -> Vec<String> {
    let columns = T::COLUMNS.join(",");
    records
        .iter()
        .map(|record| {
            let rendered: Vec<String> = record.values().iter().map(sql_literal).collect();
            let mut statement = format!(
                "INSERT INTO {table_name} ({columns}) VALUES ({})",
                rendered.join(",")
            );
            if let WriteStrategy::Upsert { key_columns } = strategy {
                let assignments: Vec<String> = T::COLUMNS
                    .iter()
                    .zip(&rendered)
                    .filter(|(column, _)| !key_columns.iter().any(|key| key == *column))
                    .map(|(column, value)| format!("{column} = {value}"))
                    .collect();
                statement.push_str(&format!(
                    " ON CONFLICT ({}) DO UPDATE SET {}",
                    key_columns.join(","),
                    assignments.join(", ")
                ));
            }
            statement.push(';');
            statement
        })
        .collect()
}

fn sql_literal(value: &Option<String>) -> String {
    match value {
        Some(value) => format!("'{}'", value.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}

/// Writes record batches to their report tables.
pub struct ReportSink {
    pool: PgPool,
}

impl ReportSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Executes one statement per record inside a single transaction.
    pub async fn write<T: TableRecord>(
        &self,
        records: &[T],
        table_name: &str,
        strategy: &WriteStrategy,
    ) -> Result<(), ScrapeError> {
        let statements = build_statements(records, table_name, strategy);
        let mut tx = self.pool.begin().await?;
        for statement in &statements {
            info!("query: {statement}");
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("wrote {} records to {table_name}", statements.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wave_record(point_id: Option<&str>) -> WaveRecord {
        WaveRecord {
            point_id: point_id.map(str::to_string),
            date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            time: "06:30:00".to_string(),
            score: "4.5".to_string(),
            score_mark: "◎".to_string(),
            wave_size: "ムネ〜カタ".to_string(),
            wind_info: "オフショア".to_string(),
        }
    }

    #[test]
    fn insert_statement_lists_all_columns_and_values() {
        let statements = build_statements(
            &[wave_record(Some("101"))],
            "WAVE_REPORT",
            &WriteStrategy::Insert,
        );
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            "INSERT INTO WAVE_REPORT (point_id,date,time,score,score_mark,wave_size,wind_info) \
             VALUES ('101','2024-05-20','06:30:00','4.5','◎','ムネ〜カタ','オフショア');"
        );
    }

    #[test]
    fn upsert_statement_sets_every_non_key_column() {
        let strategy = WriteStrategy::from_config("upsert", "point_id,date,time").unwrap();
        let statements = build_statements(&[wave_record(Some("101"))], "WAVE_REPORT", &strategy);
        let statement = &statements[0];
        assert!(statement.contains("ON CONFLICT (point_id,date,time) DO UPDATE SET "));
        for column in ["score", "score_mark", "wave_size", "wind_info"] {
            assert!(statement.contains(&format!("{column} = ")), "missing {column}");
        }
        for key in ["point_id =", "date =", "time ="] {
            assert!(!statement.contains(key), "key column {key} must not be set");
        }
    }

    #[test]
    fn missing_point_id_renders_as_null() {
        let statements =
            build_statements(&[wave_record(None)], "WAVE_REPORT", &WriteStrategy::Insert);
        assert!(statements[0].contains("VALUES (NULL,"));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let mut record = wave_record(Some("101"));
        record.wind_info = "on'shore".to_string();
        let statements = build_statements(&[record], "WAVE_REPORT", &WriteStrategy::Insert);
        assert!(statements[0].contains("'on''shore'"));
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        let err = WriteStrategy::from_config("replace", "point_id").unwrap_err();
        assert!(matches!(err, ScrapeError::UnknownWriteMode(mode) if mode == "replace"));
    }
}
