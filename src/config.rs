// src/config.rs

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::record::{Column, COLUMN_COUNT};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "scorescraper.yaml";

/// Rows are data rows only if their first cell starts with this.
const STUDENT_ID_PATTERN: &str = r"^\d{5,}";

/// One composite score: `target` is the rounded mean of `inputs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeGroup {
    pub target: Column,
    pub inputs: Vec<Column>,
}

impl CompositeGroup {
    fn new(target: Column, inputs: &[Column]) -> Self {
        Self {
            target,
            inputs: inputs.to_vec(),
        }
    }
}

pub fn default_composite_groups() -> Vec<CompositeGroup> {
    use Column::*;
    vec![
        CompositeGroup::new(Khtn, &[Ly, Hoa, Sinh]),
        CompositeGroup::new(Khxh, &[Su, Dia, Gdcd]),
        CompositeGroup::new(KhoiA, &[Toan, Ly, Hoa]),
        CompositeGroup::new(KhoiB, &[Toan, Hoa, Sinh]),
        CompositeGroup::new(KhoiC, &[Van, Su, Dia]),
        CompositeGroup::new(KhoiD, &[Toan, Van, Anh]),
        CompositeGroup::new(KhoiA1, &[Toan, Anh, Ly]),
    ]
}

/// Cell layout of tables that publish raw subjects only (13 cells).
pub fn default_raw_layout() -> Vec<Option<Column>> {
    use Column::*;
    vec![
        Some(Sbd),
        Some(Toan),
        Some(Van),
        Some(Ly),
        Some(Hoa),
        Some(Sinh),
        Some(Su),
        Some(Dia),
        Some(Gdcd),
        Some(Anh),
        None,
        None,
        None,
    ]
}

/// Run settings, read from YAML. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `id,name,url` list of published sources.
    pub sources: PathBuf,
    /// Resolved manifest written by `download`, read by `convert`.
    pub manifest: PathBuf,
    pub raw_dir: PathBuf,
    pub csv_dir: PathBuf,
    /// Upper bound on pages fetched from a paginated site.
    pub max_pages: usize,
    /// Class fragment marking decorative freeze-bar cells.
    pub freeze_marker: String,
    /// Regions whose tables lack composite columns.
    pub composite_regions: Vec<String>,
    pub raw_layout: Vec<Option<Column>>,
    pub composite_groups: Vec<CompositeGroup>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: PathBuf::from("Data.csv"),
            manifest: PathBuf::from("Dataset.json"),
            raw_dir: PathBuf::from("raw"),
            csv_dir: PathBuf::from("csv"),
            max_pages: 100,
            freeze_marker: "freezebar".into(),
            composite_regions: Vec::new(),
            raw_layout: default_raw_layout(),
            composite_groups: default_composite_groups(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Loads `path` if given, else [`DEFAULT_CONFIG`] if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG).is_file() => Self::load(DEFAULT_CONFIG),
            None => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validates the table-related settings and freezes them.
    pub fn table_config(&self) -> Result<TableConfig> {
        if self.raw_layout.first() != Some(&Some(Column::Sbd)) {
            bail!("raw_layout must start with SBD");
        }
        for group in &self.composite_groups {
            if group.target == Column::Sbd {
                bail!("SBD cannot be a composite target");
            }
            if group.inputs.is_empty() {
                bail!("composite group {} has no inputs", group.target);
            }
        }
        Ok(TableConfig {
            student_id: Regex::new(STUDENT_ID_PATTERN)?,
            freeze_marker: self.freeze_marker.clone(),
            composite_regions: self.composite_regions.iter().cloned().collect(),
            raw_layout: self.raw_layout.clone(),
            composite_groups: self.composite_groups.clone(),
        })
    }
}

/// How cells of a source table map onto record columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout<'a> {
    /// Cells are the 17 record columns in order.
    Full,
    /// Cells carry raw subjects only; composites are averaged afterwards.
    Subjects(&'a [Option<Column>]),
}

impl Layout<'_> {
    /// Expected cell count of a data row.
    pub fn width(&self) -> usize {
        match self {
            Layout::Full => COLUMN_COUNT,
            Layout::Subjects(cols) => cols.len(),
        }
    }
}

/// Immutable table schema shared by extraction and conversion.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub student_id: Regex,
    pub freeze_marker: String,
    pub composite_regions: HashSet<String>,
    pub raw_layout: Vec<Option<Column>>,
    pub composite_groups: Vec<CompositeGroup>,
}

impl TableConfig {
    pub fn layout_for(&self, region: &str) -> Layout<'_> {
        if self.composite_regions.contains(region) {
            Layout::Subjects(&self.raw_layout)
        } else {
            Layout::Full
        }
    }
}
