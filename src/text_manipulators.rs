use chrono::{Datelike, Days, Months, NaiveDate};
use scraper::ElementRef;

use crate::error::ScrapeError;

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Drops every occurrence of a unit token from a cell, e.g. `"5m"` -> `"5"`,
/// `"8秒"` -> `"8"`.
pub fn strip_unit(value: &str, unit: &str) -> String {
    value.replace(unit, "")
}

/// Splits a combined `direction/speed` wind cell into its halves, with the
/// trailing metre marker removed from the speed. `"NE/5m"` -> `("NE", "5")`.
pub fn split_wind_cell(cell: &str) -> Result<(String, String), ScrapeError> {
    let mut parts = cell.splitn(2, '/');
    let direction = parts.next().unwrap_or_default();
    let speed = parts.next().ok_or_else(|| ScrapeError::Normalization {
        value: cell.to_string(),
        expected: "a direction/speed pair",
    })?;
    Ok((direction.to_string(), strip_unit(speed, "m")))
}

/// Derives a spot's weather-forecast URL from its wave-page link: any query
/// string is dropped and the wave-forecast tab path is appended.
pub fn forecast_weather_url(wave_page_url: &str) -> String {
    let base = wave_page_url.split('?').next().unwrap_or(wave_page_url);
    format!("{base}/weathers/surf?page=fcst_wave#weather")
}

/// Builds a full date from a forecast cell's day-of-month and the run's
/// current date. The cell carries only the day before a parenthesised weekday,
/// e.g. `"30(土)"`; year and month come from `today`.
///
/// Day numbers landing 4 or more days ahead of today are treated as belonging
/// to a neighbouring month and get one month subtracted. Mirrors the upstream
/// feed exactly; the offset direction is unconfirmed.
pub fn forecast_date(cell: &str, today: NaiveDate) -> Result<NaiveDate, ScrapeError> {
    let day_text = cell.split('(').next().unwrap_or(cell).trim();
    let day: u32 = day_text.parse().map_err(|_| ScrapeError::Normalization {
        value: cell.to_string(),
        expected: "a day-of-month before the weekday",
    })?;
    let date = NaiveDate::from_ymd_opt(today.year(), today.month(), day).ok_or_else(|| {
        ScrapeError::Normalization {
            value: cell.to_string(),
            expected: "a valid day for the current month",
        }
    })?;
    if (date - today).num_days() >= 4 {
        date.checked_sub_months(Months::new(1))
            .ok_or_else(|| ScrapeError::Normalization {
                value: cell.to_string(),
                expected: "a date with a previous month",
            })
    } else {
        Ok(date)
    }
}

/// One-day back-shift for reports stamped with the previous-day marker.
pub fn shift_back_one_day(date: NaiveDate) -> NaiveDate {
    date - Days::new(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn strips_metre_and_seconds_units() {
        assert_eq!(strip_unit("1.5m", "m"), "1.5");
        assert_eq!(strip_unit("8秒", "秒"), "8");
        assert_eq!(strip_unit("12", "m"), "12");
    }

    #[test]
    fn splits_wind_cell_into_direction_and_speed() {
        assert_eq!(
            split_wind_cell("NE/5m").unwrap(),
            ("NE".to_string(), "5".to_string())
        );
    }

    #[test]
    fn wind_cell_without_slash_is_rejected() {
        assert!(split_wind_cell("NE 5m").is_err());
    }

    #[test]
    fn forecast_url_replaces_query_with_weather_tab() {
        assert_eq!(
            forecast_weather_url("https://example.com/spots/123?tab=wave"),
            "https://example.com/spots/123/weathers/surf?page=fcst_wave#weather"
        );
        assert_eq!(
            forecast_weather_url("https://example.com/spots/123"),
            "https://example.com/spots/123/weathers/surf?page=fcst_wave#weather"
        );
    }

    #[test]
    fn forecast_date_uses_current_year_and_month() {
        let today = date(2024, 5, 20);
        assert_eq!(forecast_date("21(火)", today).unwrap(), date(2024, 5, 21));
        assert_eq!(forecast_date("20(月)", today).unwrap(), date(2024, 5, 20));
    }

    #[test]
    fn forecast_date_far_ahead_rolls_back_a_month() {
        let today = date(2024, 5, 20);
        // 24th is exactly 4 days out, the first day the rollback kicks in.
        assert_eq!(forecast_date("24(金)", today).unwrap(), date(2024, 4, 24));
        assert_eq!(forecast_date("23(木)", today).unwrap(), date(2024, 5, 23));
    }

    #[test]
    fn forecast_date_rejects_non_numeric_day() {
        assert!(forecast_date("(月)", date(2024, 5, 20)).is_err());
        assert!(forecast_date("31(金)", date(2024, 6, 1)).is_err());
    }

    #[test]
    fn shifts_dates_back_across_month_starts() {
        assert_eq!(shift_back_one_day(date(2024, 5, 20)), date(2024, 5, 19));
        assert_eq!(shift_back_one_day(date(2024, 5, 1)), date(2024, 4, 30));
    }
}
