// src/store.rs

use anyhow::{bail, Context, Result};
use glob::{glob, Pattern};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Raw HTML per region: `<id>.html` for a single document,
/// `<id>_<page>.html` for paginated sources.
pub struct RawStore {
    dir: PathBuf,
}

impl RawStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating raw directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces whatever was stored for `id` with `pages`.
    pub fn save(&self, id: &str, pages: &[String]) -> Result<Vec<PathBuf>> {
        for stale in self.existing(id)? {
            fs::remove_file(&stale).with_context(|| format!("removing {}", stale.display()))?;
        }

        let mut written = Vec::with_capacity(pages.len());
        for (idx, html) in pages.iter().enumerate() {
            let path = if pages.len() == 1 {
                self.single_path(id)
            } else {
                self.page_path(id, idx + 1)
            };
            fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;
            written.push(path);
        }
        debug!(id, pages = written.len(), "stored raw html");
        Ok(written)
    }

    /// Loads the documents of `id` in page order.
    pub fn load(&self, id: &str) -> Result<Vec<String>> {
        let paths = self.existing(id)?;
        if paths.is_empty() {
            bail!("no raw html for {} in {}", id, self.dir.display());
        }
        paths
            .iter()
            .map(|p| fs::read_to_string(p).with_context(|| format!("reading {}", p.display())))
            .collect()
    }

    fn single_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.html", id))
    }

    fn page_path(&self, id: &str, page: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.html", id, page))
    }

    fn existing(&self, id: &str) -> Result<Vec<PathBuf>> {
        let single = self.single_path(id);
        if single.is_file() {
            return Ok(vec![single]);
        }

        let pattern = format!(
            "{}/{}_*.html",
            Pattern::escape(&self.dir.to_string_lossy()),
            Pattern::escape(id)
        );
        let prefix = format!("{}_", id);
        let mut pages: Vec<(usize, PathBuf)> = glob(&pattern)
            .context("invalid glob pattern for raw pages")?
            .filter_map(Result::ok)
            .filter_map(|path| {
                let page = path
                    .file_stem()?
                    .to_str()?
                    .strip_prefix(&prefix)?
                    .parse()
                    .ok()?;
                Some((page, path))
            })
            .collect();
        pages.sort_by_key(|(page, _)| *page);
        Ok(pages.into_iter().map(|(_, path)| path).collect())
    }
}
