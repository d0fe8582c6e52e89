// src/process/extract.rs

use regex::Regex;
use scraper::{element_ref::Select, ElementRef, Html, Selector};
use tracing::trace;

use crate::config::TableConfig;
use crate::error::ScrapeError;

/// Cell texts of one data row, untrimmed, in table order.
pub type RawRow = Vec<String>;

/// Pulls student rows out of the single score table of an HTML document.
#[derive(Debug, Clone)]
pub struct RowExtractor {
    table: Selector,
    row: Selector,
    cell: Selector,
    student_id: Regex,
    freeze_marker: String,
    width: usize,
}

impl RowExtractor {
    /// `width` is the cell count every data row must have.
    pub fn new(config: &TableConfig, width: usize) -> Self {
        Self {
            table: Selector::parse("table").expect("CSS selector for tables should be valid"),
            row: Selector::parse("tr").expect("CSS selector for rows should be valid"),
            cell: Selector::parse("td").expect("CSS selector for cells should be valid"),
            student_id: config.student_id.clone(),
            freeze_marker: config.freeze_marker.clone(),
            width,
        }
    }

    /// Lazily yields data rows of the first table in `doc`.
    ///
    /// Header and footer rows are skipped. A data row of the wrong width is
    /// yielded as [`ScrapeError::SchemaMismatch`] and ends the sequence.
    pub fn rows<'a>(&'a self, doc: &'a Html) -> Result<Rows<'a>, ScrapeError> {
        let table = doc
            .select(&self.table)
            .next()
            .ok_or(ScrapeError::MissingTable)?;
        Ok(Rows {
            rows: table.select(&self.row),
            extractor: self,
            stopped: false,
        })
    }

    /// Parses `html` and collects every row up to the first mismatch.
    pub fn extract(&self, html: &str) -> Result<Extraction, ScrapeError> {
        let doc = Html::parse_document(html);
        let mut out = Extraction::default();
        for row in self.rows(&doc)? {
            match row {
                Ok(cells) => out.rows.push(cells),
                Err(e) => out.mismatch = Some(e),
            }
        }
        Ok(out)
    }

    /// True if `html` has a table with at least one data row.
    pub fn has_data_rows(&self, html: &str) -> bool {
        let doc = Html::parse_document(html);
        self.rows(&doc)
            .map(|mut rows| rows.next().is_some())
            .unwrap_or(false)
    }

    fn data_cells<'a>(&self, tr: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        tr.select(&self.cell)
            .filter(|td| !self.is_freeze_bar(td))
            .collect()
    }

    fn is_freeze_bar(&self, td: &ElementRef<'_>) -> bool {
        td.value()
            .classes()
            .any(|class| class.contains(self.freeze_marker.as_str()))
    }
}

fn cell_text(td: &ElementRef<'_>) -> String {
    td.text().collect()
}

/// Iterator returned by [`RowExtractor::rows`].
pub struct Rows<'a> {
    rows: Select<'a, 'a>,
    extractor: &'a RowExtractor,
    stopped: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<RawRow, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stopped {
            return None;
        }
        for tr in self.rows.by_ref() {
            let cells = self.extractor.data_cells(tr);
            let Some(first) = cells.first() else {
                continue;
            };
            let first = cell_text(first);
            if !self.extractor.student_id.is_match(&first) {
                trace!(first = %first.trim(), "skipping non-data row");
                continue;
            }
            if cells.len() != self.extractor.width {
                self.stopped = true;
                return Some(Err(ScrapeError::SchemaMismatch {
                    student_id: first.trim().to_string(),
                    expected: self.extractor.width,
                    found: cells.len(),
                }));
            }
            return Some(Ok(cells.iter().map(cell_text).collect()));
        }
        self.stopped = true;
        None
    }
}

/// Rows collected from one document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub rows: Vec<RawRow>,
    /// Set when a mismatched row cut the table short.
    pub mismatch: Option<ScrapeError>,
}
