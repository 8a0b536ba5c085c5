//! Contact email extraction from business websites.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::config::ScrapeConfig;
use crate::providers::PageFetcher;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

#[allow(clippy::expect_used)]
static TEXT_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, a, span, div").expect("valid selector"));

/// Asset suffixes that look like an address but come from retina image names.
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

fn is_asset_name(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    ASSET_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// First address-shaped match in `text`, ignoring image file names.
#[must_use]
pub fn find_email(text: &str) -> Option<&str> {
    EMAIL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| !is_asset_name(candidate))
}

/// First address found in the text of `p`, `a`, `span` or `div` elements.
///
/// Scripts, styles and attributes are never scanned.
#[must_use]
pub fn find_email_in_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    document.select(&TEXT_ELEMENTS).find_map(|element| {
        let text: String = element.text().collect();
        find_email(&text).map(str::to_string)
    })
}

/// Fetches business websites and extracts a contact email.
#[derive(Clone)]
pub struct EmailScraper {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
    headers: HashMap<String, String>,
}

impl EmailScraper {
    /// Creates a scraper using the timeout and user agent from `config`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ScrapeConfig) -> Self {
        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), config.user_agent.clone());

        Self {
            fetcher,
            timeout: config.timeout(),
            headers,
        }
    }

    /// The per-page timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the first contact email on the page at `url`.
    ///
    /// Never fails: an empty URL, a fetch error or a page without an address
    /// all yield `None`.
    pub async fn extract(&self, url: &str) -> Option<String> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        match self.fetcher.fetch_text(url, self.timeout, &self.headers).await {
            Ok(body) => {
                let email = find_email_in_html(&body);
                tracing::debug!(url, found = email.is_some(), "Scraped website");
                email
            }
            Err(error) => {
                tracing::debug!(url, %error, "Error scraping website");
                None
            }
        }
    }
}

impl std::fmt::Debug for EmailScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailScraper")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::testing::StubPageFetcher;

    #[test]
    fn test_find_email_in_paragraph() {
        let html = "<html><body><p>Contact us at hello@tartine.com today</p></body></html>";
        assert_eq!(find_email_in_html(html), Some("hello@tartine.com".to_string()));
    }

    #[test]
    fn test_ignores_script_and_attributes() {
        let html = r#"<html><head><script>var x = "hidden@script.io";</script></head>
            <body><img alt="alt@image.org"><p>No address here</p></body></html>"#;
        assert_eq!(find_email_in_html(html), None);
    }

    #[test]
    fn test_ignores_retina_asset_names() {
        let html = "<div>logo@2x.png and then sales@shop.co.uk</div>";
        assert_eq!(find_email_in_html(html), Some("sales@shop.co.uk".to_string()));
    }

    #[test]
    fn test_first_match_in_document_order() {
        let html = "<div><span>first@a.com</span></div><p>second@b.com</p>";
        assert_eq!(find_email_in_html(html), Some("first@a.com".to_string()));
    }

    #[test]
    fn test_find_email_requires_tld() {
        assert_eq!(find_email("user@localhost"), None);
        assert_eq!(find_email("a.b+c@d-e.io"), Some("a.b+c@d-e.io"));
    }

    #[tokio::test]
    async fn test_extract_empty_url_skips_fetch() {
        let fetcher = Arc::new(StubPageFetcher::new());
        let scraper = EmailScraper::new(fetcher.clone(), &ScrapeConfig::default());

        assert_eq!(scraper.extract("   ").await, None);
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_extract_sends_user_agent_and_timeout() {
        let fetcher = Arc::new(
            StubPageFetcher::new()
                .with_page("https://tartine.com", "<p>orders@tartine.com</p>"),
        );
        let scraper = EmailScraper::new(fetcher.clone(), &ScrapeConfig::default());

        let email = scraper.extract("https://tartine.com").await;

        assert_eq!(email, Some("orders@tartine.com".to_string()));
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].timeout, Duration::from_secs(5));
        assert!(requests[0]
            .headers
            .get("User-Agent")
            .is_some_and(|ua| ua.contains("Chrome/91")));
    }

    #[tokio::test]
    async fn test_extract_swallows_fetch_errors() {
        let fetcher = StubPageFetcher::new().with_failure(
            "https://down.example",
            ProviderError::transport("website", "connection refused"),
        );
        let scraper = EmailScraper::new(Arc::new(fetcher), &ScrapeConfig::default());

        assert_eq!(scraper.extract("https://down.example").await, None);
    }
}
