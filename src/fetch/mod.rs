// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

pub mod download;
pub mod resolve;

pub use download::run_download;
pub use resolve::{default_resolvers, GoogleSheetsResolver, PagedSiteResolver, SourceResolver};

/// Retrieves the text of a document. Implemented by the HTTP client; tests
/// substitute canned pages.
pub trait Fetch {
    fn get_text(&self, url: &Url) -> Result<String>;
}

impl Fetch for Client {
    fn get_text(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching document");
        self.get(url.clone())
            .send()
            .with_context(|| format!("requesting document {}", url))?
            .error_for_status()
            .with_context(|| format!("source {} answered with an error status", url))?
            .text()
            .with_context(|| format!("reading document body from {}", url))
    }
}

/// Parses `raw` and fetches it.
pub fn get_text_str(fetch: &dyn Fetch, raw: &str) -> Result<String> {
    let url = Url::parse(raw).with_context(|| format!("parsing URL {}", raw))?;
    fetch.get_text(&url)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{cell::RefCell, collections::HashMap};

    /// Serves canned documents and remembers what was asked for.
    #[derive(Default)]
    pub(crate) struct FakeFetch {
        pub pages: HashMap<String, String>,
        pub requested: RefCell<Vec<String>>,
    }

    impl FakeFetch {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl Fetch for FakeFetch {
        fn get_text(&self, url: &Url) -> Result<String> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("HTTP error: 404 Not Found for {}", url))
        }
    }

    #[test]
    fn client_errors_name_the_document() {
        let url = Url::parse("ftp://example.invalid/scores").unwrap();
        let err = Client::new().get_text(&url).unwrap_err();
        assert_eq!(
            err.to_string(),
            "requesting document ftp://example.invalid/scores"
        );
    }

    #[test]
    fn fake_fetch_reports_missing_pages() {
        let fake = FakeFetch::default().with("https://example.com/a", "body");
        assert_eq!(get_text_str(&fake, "https://example.com/a").unwrap(), "body");
        assert!(get_text_str(&fake, "https://example.com/b").is_err());
        assert!(get_text_str(&fake, "not a url").is_err());
        assert_eq!(fake.requested.borrow().len(), 2);
    }
}
