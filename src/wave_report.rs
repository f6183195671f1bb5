use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::{
    error::ScrapeError,
    point_master::PointResolver,
    text_manipulators::{extract_text, shift_back_one_day},
};

/// Current conditions for one spot, read off the area-summary page. The
/// condition fields are raw display text and go into the table untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveRecord {
    pub point_id: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub score: String,
    pub score_mark: String,
    pub wave_size: String,
    pub wind_info: String,
}

/// A parsed location block, before name resolution.
#[derive(Debug)]
struct WaveBlock {
    point_name: String,
    date: NaiveDate,
    time: String,
    score: String,
    score_mark: String,
    wave_size: String,
    wind_info: String,
}

/// Marker the site puts in front of modification times that belong to the
/// previous day.
const PREVIOUS_DAY_MARKER: &str = "[前日]";

/// Extracts one [`WaveRecord`] per location block on the area-summary page,
/// in document order. Blocks whose name is not in the point master are kept
/// with a null `point_id`.
pub async fn extract_wave_report<R: PointResolver>(
    area_html: &str,
    resolver: &R,
    today: NaiveDate,
) -> Result<Vec<WaveRecord>, ScrapeError> {
    let blocks = parse_wave_blocks(area_html, today)?;
    let mut records = Vec::with_capacity(blocks.len());
    for block in blocks {
        let point_id = resolver.resolve(&block.point_name).await?;
        if point_id.is_none() {
            log::warn!("no point id for {:?}, keeping record without one", block.point_name);
        }
        records.push(WaveRecord {
            point_id,
            date: block.date,
            time: block.time,
            score: block.score,
            score_mark: block.score_mark,
            wave_size: block.wave_size,
            wind_info: block.wind_info,
        });
    }
    Ok(records)
}

fn parse_wave_blocks(area_html: &str, today: NaiveDate) -> Result<Vec<WaveBlock>, ScrapeError> {
    let document = Html::parse_document(area_html);
    let block_selector = Selector::parse(".point-info-wrapper").unwrap();
    let name_selector = Selector::parse(".point-name").unwrap();
    let mod_time_selector = Selector::parse(".point-mod-time").unwrap();
    let timestamp_selector = Selector::parse(".wave-gray").unwrap();
    let score_selector = Selector::parse(".point-condition-score").unwrap();
    let mark_selector = Selector::parse(".point-condition-mark").unwrap();
    let size_selector = Selector::parse(".point-size").unwrap();
    let summary_selector = Selector::parse(".point-summary-div").unwrap();

    let mut blocks = vec![];
    for div in document.select(&block_selector) {
        let point_name = required_text(div, &name_selector, ".point-name", "location block")?;

        let mod_time = div
            .select(&mod_time_selector)
            .next()
            .ok_or_else(|| ScrapeError::missing(".point-mod-time", "location block"))?;
        let timestamps: Vec<String> =
            mod_time.select(&timestamp_selector).map(extract_text).collect();
        let mut date = today;
        let time = match timestamps.split_first() {
            // Single-element layout: no timestamp list, the time is the tail
            // of the raw modification-time text.
            None => trailing_chars(&extract_text(mod_time), 5),
            Some((first, rest)) => {
                if first == PREVIOUS_DAY_MARKER {
                    date = shift_back_one_day(date);
                }
                rest.last().unwrap_or(first).clone()
            }
        };

        let score = required_text(div, &score_selector, ".point-condition-score", "location block")?;
        let score_mark = required_text(div, &mark_selector, ".point-condition-mark", "location block")?;
        let wave_size = required_text(div, &size_selector, ".point-size", "location block")?;

        let summary = div
            .select(&summary_selector)
            .next()
            .ok_or_else(|| ScrapeError::missing(".point-summary-div", "location block"))?;
        let wind_info = summary
            .children()
            .nth(3)
            .map(|node| match node.value() {
                scraper::Node::Text(text) => text.to_string(),
                _ => ElementRef::wrap(node).map(extract_text).unwrap_or_default(),
            })
            .ok_or_else(|| ScrapeError::missing(".point-summary-div", "wind info"))?;

        blocks.push(WaveBlock {
            point_name,
            date,
            time: format!("{time}:00"),
            score,
            score_mark,
            wave_size,
            wind_info,
        });
    }
    Ok(blocks)
}

fn required_text(
    scope: ElementRef,
    selector: &Selector,
    name: &'static str,
    context: &'static str,
) -> Result<String, ScrapeError> {
    scope
        .select(selector)
        .next()
        .map(extract_text)
        .ok_or_else(|| ScrapeError::missing(name, context))
}

fn trailing_chars(text: &str, count: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars[chars.len().saturating_sub(count)..].iter().collect()
}
