// src/process/convert.rs

use anyhow::Result;
use scraper::Html;
use std::{fmt, path::Path};
use tracing::{error, info, warn};

use crate::config::{Layout, TableConfig};
use crate::error::ScrapeError;
use crate::manifest::Source;
use crate::output::write_region;
use crate::process::composite::CompositeAverager;
use crate::process::extract::{RawRow, RowExtractor};
use crate::process::normalize::normalize_score;
use crate::record::{Record, COLUMN_COUNT};
use crate::store::RawStore;

/// How a source's conversion ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    /// A malformed row stopped the table; rows before it were kept.
    Truncated { reason: ScrapeError },
    /// Nothing written for this source.
    Skipped { reason: ScrapeError },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Complete => f.write_str("complete"),
            Outcome::Truncated { reason } => write!(f, "truncated ({})", reason),
            Outcome::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

/// Records of one source plus how extraction ended.
#[derive(Debug)]
pub struct Conversion {
    pub records: Vec<Record>,
    pub outcome: Outcome,
}

/// Per-source summary logged at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub id: String,
    pub records: usize,
    pub outcome: Outcome,
}

/// Turns the raw documents of one region into records.
pub struct Converter<'a> {
    config: &'a TableConfig,
}

impl<'a> Converter<'a> {
    pub fn new(config: &'a TableConfig) -> Self {
        Self { config }
    }

    /// Converts the pages of `region` in order.
    ///
    /// A page without a table skips the whole region. A malformed row stops
    /// the region at that row; later rows and pages are dropped.
    #[tracing::instrument(level = "info", skip(self, documents), fields(pages = documents.len()))]
    pub fn convert(&self, region: &str, documents: &[String]) -> Conversion {
        let layout = self.config.layout_for(region);
        let extractor = RowExtractor::new(self.config, layout.width());
        let averager = CompositeAverager::new(&self.config.composite_groups);
        let mut records = Vec::new();

        for (page, html) in documents.iter().enumerate() {
            let doc = Html::parse_document(html);
            let rows = match extractor.rows(&doc) {
                Ok(rows) => rows,
                Err(reason) => {
                    warn!(page = page + 1, error = %reason, "source skipped");
                    return Conversion {
                        records: Vec::new(),
                        outcome: Outcome::Skipped { reason },
                    };
                }
            };

            for row in rows {
                let built = row.and_then(|cells| build_record(layout, &averager, cells));
                match built {
                    Ok(record) => records.push(record),
                    Err(reason) => {
                        match &reason {
                            ScrapeError::SchemaMismatch {
                                student_id,
                                expected,
                                found,
                            } => error!(
                                page = page + 1,
                                kept = records.len(),
                                %student_id,
                                expected,
                                found,
                                "table truncated"
                            ),
                            other => error!(page = page + 1, kept = records.len(), error = %other, "table truncated"),
                        }
                        return Conversion {
                            records,
                            outcome: Outcome::Truncated { reason },
                        };
                    }
                }
            }
        }

        Conversion {
            records,
            outcome: Outcome::Complete,
        }
    }
}

fn build_record(
    layout: Layout<'_>,
    averager: &CompositeAverager<'_>,
    cells: RawRow,
) -> Result<Record, ScrapeError> {
    match layout {
        Layout::Full => {
            Record::try_from(cells.iter().map(|c| normalize_score(c)).collect::<Vec<_>>())
        }
        Layout::Subjects(columns) => {
            let mut fields = vec![None; COLUMN_COUNT];
            for (cell, column) in cells.iter().zip(columns) {
                if let Some(column) = column {
                    fields[column.index()] = normalize_score(cell);
                }
            }
            let mut record = Record::try_from(fields)?;
            averager.apply(&mut record);
            Ok(record)
        }
    }
}

/// Converts every manifest source from the raw store into `csv_dir/<id>.csv`.
///
/// Source-local failures are logged and reported; I/O errors end the run.
pub fn run_conversion(
    config: &TableConfig,
    sources: &[Source],
    store: &RawStore,
    csv_dir: &Path,
) -> Result<Vec<ConversionReport>> {
    let converter = Converter::new(config);
    let mut reports = Vec::with_capacity(sources.len());

    for source in sources {
        let documents = store.load(&source.id)?;
        let conversion = converter.convert(&source.id, &documents);

        if !matches!(conversion.outcome, Outcome::Skipped { .. }) {
            let path = write_region(csv_dir, &source.id, &conversion.records)?;
            info!(id = %source.id, name = %source.name, records = conversion.records.len(), path = %path.display(), "wrote csv");
        }

        reports.push(ConversionReport {
            id: source.id.clone(),
            records: conversion.records.len(),
            outcome: conversion.outcome,
        });
    }

    Ok(reports)
}
