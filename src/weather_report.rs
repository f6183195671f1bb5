use chrono::NaiveDate;
use scraper::{Html, Selector};

use crate::{
    error::ScrapeError,
    point_master::PointResolver,
    requests::PageFetcher,
    text_manipulators::{extract_text, forecast_date, forecast_weather_url, split_wind_cell, strip_unit},
};

/// One forecast slot (typically 3 hours) for one spot. Every field except the
/// point id is optional: the page only repeats date and wave data on the rows
/// that start a new group, and the gaps are forward-filled afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub point_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub weather: Option<String>,
    pub temperature: Option<String>,
    pub precipitation: Option<String>,
    pub wind_direction: Option<String>,
    pub wind_speed: Option<String>,
    pub wave_height: Option<String>,
    pub wave_direction: Option<String>,
    pub wave_period: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct ForecastRow {
    date: Option<NaiveDate>,
    time: Option<String>,
    weather: Option<String>,
    temperature: Option<String>,
    precipitation: Option<String>,
    wind_direction: Option<String>,
    wind_speed: Option<String>,
    wave_height: Option<String>,
    wave_direction: Option<String>,
    wave_period: Option<String>,
}

impl ForecastRow {
    fn into_record(self, point_id: String) -> WeatherRecord {
        WeatherRecord {
            point_id,
            date: self.date,
            time: self.time,
            weather: self.weather,
            temperature: self.temperature,
            precipitation: self.precipitation,
            wind_direction: self.wind_direction,
            wind_speed: self.wind_speed,
            wave_height: self.wave_height,
            wave_direction: self.wave_direction,
            wave_period: self.wave_period,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Date,
    Time,
    Weather,
    Temperature,
    Precipitation,
    WindDirectionSpeed,
    WaveHeightDirectionPeriod,
}

/// Field templates keyed by cell count. Rows that open a new day carry 7
/// cells, plain rows 6, and rows past the wave-forecast horizon 5. Anything
/// else (headers, spacers) is not a data row.
fn row_layout(cell_count: usize) -> Option<&'static [Field]> {
    use Field::*;
    const SEVEN: &[Field] = &[
        Date,
        Time,
        Weather,
        Temperature,
        Precipitation,
        WindDirectionSpeed,
        WaveHeightDirectionPeriod,
    ];
    const SIX: &[Field] = &[
        Time,
        Weather,
        Temperature,
        Precipitation,
        WindDirectionSpeed,
        WaveHeightDirectionPeriod,
    ];
    const FIVE: &[Field] = &[Time, Weather, Temperature, Precipitation, WindDirectionSpeed];
    match cell_count {
        7 => Some(SEVEN),
        6 => Some(SIX),
        5 => Some(FIVE),
        _ => None,
    }
}

/// Follows every location link on the area-summary page to its forecast page
/// and extracts all forecast rows, in page-then-row order. Locations whose
/// name is not in the point master are skipped whole. Forward-fill runs over
/// the combined sequence at the end.
pub async fn extract_weather_report<F, R>(
    area_html: &str,
    fetcher: &F,
    resolver: &R,
    today: NaiveDate,
) -> Result<Vec<WeatherRecord>, ScrapeError>
where
    F: PageFetcher,
    R: PointResolver,
{
    let urls = forecast_page_urls(area_html)?;
    let mut records = vec![];
    for url in urls {
        let body = fetcher.fetch_page(&url).await?;
        let (point_name, rows) = parse_forecast_page(&body, today)?;
        let Some(point_id) = resolver.resolve(&point_name).await? else {
            log::warn!("no point id for {point_name:?}, skipping its forecast rows");
            continue;
        };
        records.extend(rows.into_iter().map(|row| row.into_record(point_id.clone())));
    }
    forward_fill(&mut records);
    Ok(records)
}

/// Weather-forecast URLs for every location block, in document order.
fn forecast_page_urls(area_html: &str) -> Result<Vec<String>, ScrapeError> {
    let document = Html::parse_document(area_html);
    let link_selector = Selector::parse(".point-style a").unwrap();
    let mut urls = vec![];
    for anchor in document.select(&link_selector) {
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| ScrapeError::missing(".point-style a[href]", "area summary"))?;
        urls.push(forecast_weather_url(href));
    }
    Ok(urls)
}

/// Reads the spot name from the page heading plus every data row of the
/// forecast table.
fn parse_forecast_page(
    page_html: &str,
    today: NaiveDate,
) -> Result<(String, Vec<ForecastRow>), ScrapeError> {
    let document = Html::parse_document(page_html);
    let heading_selector = Selector::parse("h3").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let height_selector = Selector::parse("div.text-left").unwrap();
    let direction_selector = Selector::parse("div.direction-kanji").unwrap();
    let period_selector = Selector::parse("div.text-right").unwrap();

    let point_name = document
        .select(&heading_selector)
        .next()
        .map(extract_text)
        .ok_or_else(|| ScrapeError::missing("h3", "forecast page"))?;

    let mut rows = vec![];
    for tr in document.select(&row_selector) {
        let cells: Vec<_> = tr.select(&cell_selector).collect();
        let Some(layout) = row_layout(cells.len()) else {
            continue;
        };
        let mut row = ForecastRow::default();
        for (field, td) in layout.iter().zip(&cells) {
            match field {
                Field::Date => {
                    row.date = Some(forecast_date(extract_text(*td).trim(), today)?);
                }
                Field::Time => {
                    row.time = Some(format!("{}:00", extract_text(*td).trim()));
                }
                Field::Weather => row.weather = Some(extract_text(*td).trim().to_string()),
                Field::Temperature => row.temperature = Some(extract_text(*td).trim().to_string()),
                Field::Precipitation => {
                    row.precipitation = Some(extract_text(*td).trim().to_string());
                }
                Field::WindDirectionSpeed => {
                    let (direction, speed) = split_wind_cell(extract_text(*td).trim())?;
                    row.wind_direction = Some(direction);
                    row.wind_speed = Some(speed);
                }
                Field::WaveHeightDirectionPeriod => {
                    let height = td
                        .select(&height_selector)
                        .next()
                        .map(extract_text)
                        .ok_or_else(|| ScrapeError::missing("div.text-left", "wave cell"))?;
                    let direction = td
                        .select(&direction_selector)
                        .next()
                        .map(extract_text)
                        .ok_or_else(|| ScrapeError::missing("div.direction-kanji", "wave cell"))?;
                    let period = td
                        .select(&period_selector)
                        .next()
                        .map(extract_text)
                        .ok_or_else(|| ScrapeError::missing("div.text-right", "wave cell"))?;
                    row.wave_height = Some(strip_unit(height.trim(), "m"));
                    row.wave_direction = Some(direction.trim().to_string());
                    row.wave_period = Some(strip_unit(period.trim(), "秒"));
                }
            }
        }
        rows.push(row);
    }
    Ok((point_name, rows))
}

/// Propagates the last seen value of each column down the records that leave
/// it unset. Runs per column, in row order, over the whole combined sequence;
/// leading gaps before a column's first value stay unset.
pub fn forward_fill(records: &mut [WeatherRecord]) {
    fn fill<T: Clone>(slot: &mut Option<T>, last: &mut Option<T>) {
        match slot {
            Some(value) => *last = Some(value.clone()),
            None => *slot = last.clone(),
        }
    }

    let mut date = None;
    let mut time = None;
    let mut weather = None;
    let mut temperature = None;
    let mut precipitation = None;
    let mut wind_direction = None;
    let mut wind_speed = None;
    let mut wave_height = None;
    let mut wave_direction = None;
    let mut wave_period = None;
    for record in records {
        fill(&mut record.date, &mut date);
        fill(&mut record.time, &mut time);
        fill(&mut record.weather, &mut weather);
        fill(&mut record.temperature, &mut temperature);
        fill(&mut record.precipitation, &mut precipitation);
        fill(&mut record.wind_direction, &mut wind_direction);
        fill(&mut record.wind_speed, &mut wind_speed);
        fill(&mut record.wave_height, &mut wave_height);
        fill(&mut record.wave_direction, &mut wave_direction);
        fill(&mut record.wave_period, &mut wave_period);
    }
}
