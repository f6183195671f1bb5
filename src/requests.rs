use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};

use crate::{error::ScrapeError, ratelimit::RateLimiter};

/// Source of page bodies for the extractors. The live implementation is
/// [`SessionClient`]; tests substitute a map of canned pages.
pub trait PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Authenticated session against the forecast site. Login state lives in the
/// cookie store, so one client must be shared across every fetch of a run.
pub struct SessionClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl SessionClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
        })
    }

    pub async fn login(
        &self,
        url: &str,
        account: &str,
        password: &str,
    ) -> Result<(), ScrapeError> {
        let form = [("account", account), ("password", password)];
        self.client
            .post(url)
            .form(&form)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ScrapeError::Transport {
                url: url.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn get_body(&self, url: &str) -> Result<String, ScrapeError> {
        self.rate_limiter.wait_until_ready().await;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| ScrapeError::Transport {
                url: url.to_string(),
                source,
            })?;
        response.text().await.map_err(|source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

impl PageFetcher for SessionClient {
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let body = self.get_body(url).await?;
        // The site sometimes interposes a session-confirmation form before
        // the requested page. Submit it once and re-request.
        if let Some(action) = confirmation_form_action(&body) {
            log::info!("confirmation form interposed, resubmitting via {action}");
            self.client
                .post(&action)
                .send()
                .await
                .map_err(|source| ScrapeError::Transport {
                    url: action.clone(),
                    source,
                })?;
            return self.get_body(url).await;
        }
        Ok(body)
    }
}

fn confirmation_form_action(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let form_selector = Selector::parse("form").unwrap();
    document
        .select(&form_selector)
        .next()
        .and_then(|form| form.value().attr("action"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_confirmation_form() {
        let body = r#"<html><body><form action="https://example.com/confirm">
            <input type="submit"></form></body></html>"#;
        assert_eq!(
            confirmation_form_action(body),
            Some("https://example.com/confirm".to_string())
        );
    }

    #[test]
    fn plain_pages_have_no_form_action() {
        let body = "<html><body><h3>Spot</h3><table></table></body></html>";
        assert_eq!(confirmation_form_action(body), None);
    }
}
