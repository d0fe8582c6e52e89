// src/fetch/resolve.rs

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::{get_text_str, Fetch};
use crate::config::{Settings, TableConfig};
use crate::error::ScrapeError;
use crate::process::extract::RowExtractor;

/// Strategy turning a published source URL into fetched documents.
pub trait SourceResolver {
    fn name(&self) -> &'static str;

    /// Whether this strategy handles `url`.
    fn accepts(&self, url: &str) -> bool;

    /// The URL recorded in the manifest for `url`.
    /// Fails with [`ScrapeError::UnsupportedSource`] when the URL cannot be resolved.
    fn resolve(&self, fetch: &dyn Fetch, url: &str) -> Result<String>;

    /// Fetches the documents behind a resolved URL, in page order.
    fn documents(&self, fetch: &dyn Fetch, resolved: &str) -> Result<Vec<String>>;
}

const GOOGLE_SHEETS_PREFIX: &str = "https://docs.google.com/spreadsheets";

static SHEET_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/d/([^/]+)/").expect("sheet key regex should be valid"));
static SHEET_GID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"gid:\s+"([^"]+)""#).expect("sheet gid regex should be valid"));

/// Public Google Sheets, read through the HTML preview of their first sheet.
pub struct GoogleSheetsResolver;

impl GoogleSheetsResolver {
    fn preview_url(url: &str) -> Option<String> {
        let key = SHEET_KEY.captures(url)?.get(1)?.as_str();
        Some(format!("{}/u/1/d/{}/preview", GOOGLE_SHEETS_PREFIX, key))
    }
}

impl SourceResolver for GoogleSheetsResolver {
    fn name(&self) -> &'static str {
        "google-sheets"
    }

    fn accepts(&self, url: &str) -> bool {
        url.contains(GOOGLE_SHEETS_PREFIX)
    }

    fn resolve(&self, fetch: &dyn Fetch, url: &str) -> Result<String> {
        let unsupported = || ScrapeError::UnsupportedSource {
            url: url.to_string(),
        };
        let preview = Self::preview_url(url).ok_or_else(unsupported)?;
        let page = get_text_str(fetch, &preview)?;
        let gid = SHEET_GID
            .captures(&page)
            .and_then(|c| c.get(1))
            .ok_or_else(unsupported)?
            .as_str();
        debug!(%preview, gid, "resolved sheet");
        Ok(format!("{}/sheet?gid={}", preview, gid))
    }

    fn documents(&self, fetch: &dyn Fetch, resolved: &str) -> Result<Vec<String>> {
        Ok(vec![get_text_str(fetch, resolved)?])
    }
}

/// Placeholder in a paginated site URL replaced by the page number.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Score site split over numbered pages. Pages are fetched from 1 until one
/// has no student rows or `max_pages` is reached.
pub struct PagedSiteResolver {
    max_pages: usize,
    extractor: RowExtractor,
}

impl PagedSiteResolver {
    pub fn new(max_pages: usize, extractor: RowExtractor) -> Self {
        Self {
            max_pages,
            extractor,
        }
    }
}

impl SourceResolver for PagedSiteResolver {
    fn name(&self) -> &'static str {
        "paged-site"
    }

    fn accepts(&self, url: &str) -> bool {
        url.contains(PAGE_PLACEHOLDER)
    }

    fn resolve(&self, _fetch: &dyn Fetch, url: &str) -> Result<String> {
        Ok(url.to_string())
    }

    fn documents(&self, fetch: &dyn Fetch, resolved: &str) -> Result<Vec<String>> {
        let mut pages = Vec::new();
        for page in 1..=self.max_pages {
            let url = resolved.replace(PAGE_PLACEHOLDER, &page.to_string());
            let html = get_text_str(fetch, &url)?;
            let has_rows = self.extractor.has_data_rows(&html);
            // the first page is kept even when empty so conversion can report it
            if has_rows || page == 1 {
                pages.push(html);
            }
            if !has_rows {
                break;
            }
        }
        info!(pages = pages.len(), "fetched paginated site");
        Ok(pages)
    }
}

/// The resolvers tried, in order, for each source URL.
pub fn default_resolvers(
    settings: &Settings,
    config: &TableConfig,
) -> Vec<Box<dyn SourceResolver>> {
    // any row counts as data while probing for the last page
    let probe = RowExtractor::new(config, usize::MAX);
    vec![
        Box::new(GoogleSheetsResolver),
        Box::new(PagedSiteResolver::new(settings.max_pages, probe)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::FakeFetch;
    use crate::process::extract::tests::{full_row, table_html};

    const EDIT_URL: &str = "https://docs.google.com/spreadsheets/d/1AbC-key_9/edit#gid=0";
    const PREVIEW_URL: &str = "https://docs.google.com/spreadsheets/u/1/d/1AbC-key_9/preview";

    fn probe() -> RowExtractor {
        RowExtractor::new(&Settings::default().table_config().unwrap(), usize::MAX)
    }

    #[test]
    fn sheets_url_resolves_through_preview_gid() {
        let fake = FakeFetch::default().with(
            PREVIEW_URL,
            r#"<script>var x = {name: "Sheet1", gid:   "123456789"};</script>"#,
        );
        let r = GoogleSheetsResolver;
        assert!(r.accepts(EDIT_URL));
        assert!(!r.accepts("https://example.vn/diem"));

        let resolved = r.resolve(&fake, EDIT_URL).unwrap();
        assert_eq!(resolved, format!("{}/sheet?gid=123456789", PREVIEW_URL));
    }

    #[test]
    fn sheets_url_without_key_is_unsupported() {
        let fake = FakeFetch::default();
        let err = GoogleSheetsResolver
            .resolve(&fake, "https://docs.google.com/spreadsheets/create")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::UnsupportedSource { .. })
        ));
        assert!(fake.requested.borrow().is_empty());
    }

    #[test]
    fn preview_without_gid_is_unsupported() {
        let fake = FakeFetch::default().with(PREVIEW_URL, "<html>login required</html>");
        let err = GoogleSheetsResolver.resolve(&fake, EDIT_URL).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::UnsupportedSource { .. })
        ));
    }

    #[test]
    fn preview_fetch_failure_is_not_unsupported() {
        let err = GoogleSheetsResolver
            .resolve(&FakeFetch::default(), EDIT_URL)
            .unwrap_err();
        assert!(err.downcast_ref::<ScrapeError>().is_none());
    }

    #[test]
    fn paged_site_stops_at_first_empty_page() {
        let template = "https://example.vn/diem?page={page}";
        let fake = FakeFetch::default()
            .with("https://example.vn/diem?page=1", &table_html(&[full_row("100001")], false))
            .with("https://example.vn/diem?page=2", &table_html(&[vec!["100002", "9"]], false))
            .with("https://example.vn/diem?page=3", &table_html(&[vec!["SBD"]], false));

        let r = PagedSiteResolver::new(10, probe());
        assert!(r.accepts(template));
        assert_eq!(r.resolve(&fake, template).unwrap(), template);

        let pages = r.documents(&fake, template).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(fake.requested.borrow().len(), 3);
    }

    #[test]
    fn paged_site_honours_max_pages() {
        let row = table_html(&[full_row("100001")], false);
        let fake = FakeFetch::default()
            .with("https://example.vn/p/1", &row)
            .with("https://example.vn/p/2", &row)
            .with("https://example.vn/p/3", &row);
        let pages = PagedSiteResolver::new(2, probe())
            .documents(&fake, "https://example.vn/p/{page}")
            .unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn paged_site_keeps_empty_first_page() {
        let fake = FakeFetch::default().with("https://example.vn/p/1", "<p>maintenance</p>");
        let pages = PagedSiteResolver::new(5, probe())
            .documents(&fake, "https://example.vn/p/{page}")
            .unwrap();
        assert_eq!(pages, vec!["<p>maintenance</p>".to_string()]);
        assert_eq!(
            *fake.requested.borrow(),
            vec!["https://example.vn/p/1".to_string()]
        );
    }

    #[test]
    fn paged_site_stops_after_header_only_first_page() {
        let header_only = table_html(&[vec!["SBD", "TOÁN"]], false);
        let fake = FakeFetch::default()
            .with("https://example.vn/p/1", &header_only)
            .with("https://example.vn/p/2", &table_html(&[full_row("100001")], false));
        let pages = PagedSiteResolver::new(5, probe())
            .documents(&fake, "https://example.vn/p/{page}")
            .unwrap();
        assert_eq!(pages, vec![header_only]);
        assert_eq!(fake.requested.borrow().len(), 1);
    }
}
