use thiserror::Error;

/// Everything that can stop a scrape run.
///
/// Unresolved point names are deliberately not represented here: "not in the
/// point master" is an expected outcome and each report type has its own
/// policy for it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("expected element `{selector}` missing while reading {context}")]
    MissingStructure {
        selector: &'static str,
        context: &'static str,
    },

    #[error("could not interpret {value:?} as {expected}")]
    Normalization {
        value: String,
        expected: &'static str,
    },

    #[error("unknown write mode {0:?}, expected \"insert\" or \"upsert\"")]
    UnknownWriteMode(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ScrapeError {
    pub fn missing(selector: &'static str, context: &'static str) -> Self {
        ScrapeError::MissingStructure { selector, context }
    }
}
