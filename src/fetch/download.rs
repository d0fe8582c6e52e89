// src/fetch/download.rs

use anyhow::Result;
use tracing::{info, warn};

use super::{Fetch, SourceResolver};
use crate::error::ScrapeError;
use crate::manifest::Source;
use crate::store::RawStore;

/// Resolves and downloads every source, storing raw HTML per region.
///
/// Returns the manifest: the downloaded sources with their resolved URLs.
/// Unsupported sources are logged and left out; any other error ends the run.
pub fn run_download(
    fetch: &dyn Fetch,
    resolvers: &[Box<dyn SourceResolver>],
    sources: &[Source],
    store: &RawStore,
) -> Result<Vec<Source>> {
    let mut manifest = Vec::with_capacity(sources.len());

    for source in sources {
        let Some(resolver) = resolvers.iter().find(|r| r.accepts(&source.url)) else {
            warn!(id = %source.id, url = %source.url, "Unsupported URL");
            continue;
        };

        let url = match resolver.resolve(fetch, &source.url) {
            Ok(url) => url,
            Err(e) => match e.downcast_ref::<ScrapeError>() {
                Some(err @ ScrapeError::UnsupportedSource { .. }) => {
                    warn!(id = %source.id, resolver = resolver.name(), error = %err, "source excluded");
                    continue;
                }
                _ => return Err(e.context(format!("resolving source {}", source.id))),
            },
        };

        let pages = resolver.documents(fetch, &url)?;
        store.save(&source.id, &pages)?;
        info!(id = %source.id, name = %source.name, resolver = resolver.name(), pages = pages.len(), "downloaded");

        manifest.push(Source {
            url,
            ..source.clone()
        });
    }

    Ok(manifest)
}
