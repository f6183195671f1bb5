//! End-to-end wave pipeline: area-summary HTML in, upsert statements out.

use std::collections::HashMap;

use chrono::NaiveDate;
use wavescrape::{
    PointResolver, ScrapeError, WriteStrategy, build_statements, extract_wave_report,
};

struct MapResolver(HashMap<String, String>);

impl PointResolver for MapResolver {
    async fn resolve(&self, point_name: &str) -> Result<Option<String>, ScrapeError> {
        Ok(self.0.get(point_name).cloned())
    }
}

fn area_summary() -> String {
    let block = |name: &str, mod_time: &str| {
        format!(
            r#"<div class="point-info-wrapper">
                <div class="point-name">{name}</div>
                <div class="point-mod-time">{mod_time}</div>
                <div class="point-condition-score">3.0</div>
                <div class="point-condition-mark">○</div>
                <div class="point-size">ヒザ〜モモ</div>
                <div class="point-summary-div"><span>小潮</span><br><span>うねり南</span>サイドショア</div>
            </div>"#
        )
    };
    format!(
        "<html><body>{}{}</body></html>",
        block(
            "鵠沼",
            r#"<span class="wave-gray">[前日]</span><span class="wave-gray">23:00</span>"#
        ),
        block("湘南港", r#"<span class="wave-gray">06:00</span>"#),
    )
}

#[tokio::test]
async fn wave_summary_to_upsert_statements() {
    let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
    let resolver = MapResolver(HashMap::from([
        ("鵠沼".to_string(), "101".to_string()),
        ("湘南港".to_string(), "102".to_string()),
    ]));

    let records = extract_wave_report(&area_summary(), &resolver, today)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    // First block carries the previous-day marker, second does not.
    assert_eq!(records[0].point_id.as_deref(), Some("101"));
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 5, 19).unwrap());
    assert_eq!(records[0].time, "23:00:00");
    assert_eq!(records[1].point_id.as_deref(), Some("102"));
    assert_eq!(records[1].date, today);
    assert_eq!(records[1].time, "06:00:00");

    let strategy = WriteStrategy::from_config("upsert", "point_id,date,time").unwrap();
    let statements = build_statements(&records, "WAVE_REPORT", &strategy);

    assert_eq!(statements.len(), 2);
    for statement in &statements {
        assert!(statement.starts_with("INSERT INTO WAVE_REPORT "));
        assert!(statement.contains("ON CONFLICT (point_id,date,time) DO UPDATE SET "));
        // Every non-key column gets a SET assignment; no key column does.
        for column in ["score", "score_mark", "wave_size", "wind_info"] {
            assert!(statement.contains(&format!("{column} = '")), "missing {column}");
        }
        for key in ["point_id =", "date =", "time ="] {
            assert!(!statement.contains(key));
        }
    }
    assert!(statements[0].contains("'2024-05-19'"));
    assert!(statements[1].contains("'2024-05-20'"));
}
