// src/manifest.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// A published region source. The same shape is used for the `id,name,url`
/// input list and for the resolved `Dataset.json` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Reads the headerless `id,name,url` source list.
pub fn read_sources(path: impl AsRef<Path>) -> Result<Vec<Source>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening source list {}", path.display()))?;

    let mut sources = Vec::new();
    for (idx, row) in rdr.deserialize().enumerate() {
        let source: Source =
            row.with_context(|| format!("{} line {}", path.display(), idx + 1))?;
        sources.push(source);
    }
    Ok(sources)
}

pub fn save_manifest(path: impl AsRef<Path>, sources: &[Source]) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(sources)?;
    fs::write(path, json).with_context(|| format!("writing manifest {}", path.display()))
}

pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<Source>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing manifest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn reads_source_list() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "01,Hà Nội,https://docs.google.com/spreadsheets/d/abc/edit").unwrap();
        writeln!(f, "64, Gia Lai ,https://example.vn/diem?page={{page}}").unwrap();
        let sources = read_sources(f.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "Hà Nội");
        assert_eq!(sources[1], Source::new("64", "Gia Lai", "https://example.vn/diem?page={page}"));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "01,only-two").unwrap();
        assert!(read_sources(f.path()).is_err());
    }

    #[test]
    fn manifest_is_utf8_json() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("Dataset.json");
        let sources = vec![Source::new("01", "Hà Nội", "https://example.com/x")];
        save_manifest(&path, &sources).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"name\": \"Hà Nội\""));
        assert_eq!(load_manifest(&path).unwrap(), sources);
    }
}
