use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::package::ManifestRecord;
use crate::error::Result;
use crate::registry::cache::ManifestCache;
use crate::registry::client::RegistryClient;

pub mod cache;
pub mod client;
pub mod manifest;

#[derive(Debug, Clone)]
pub struct SkippedPackage {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub fetched: usize,
    pub cached: usize,
    pub skipped: Vec<SkippedPackage>,
}

/// Walks the listing and fills the cache. Already-cached packages are left
/// alone unless `force`; packages absent from the version table are skipped
/// with a reason, as are packages where both manifest halves fail to fetch.
/// A single failed half degrades to an empty dependency list, so the run
/// always proceeds with whatever it managed to assemble.
pub fn populate_cache(
    client: &RegistryClient,
    cache: &ManifestCache,
    listing: &[String],
    versions: &HashMap<String, String>,
    force: bool,
    quiet: bool,
) -> Result<FetchReport> {
    let bar = progress_bar(listing.len() as u64, quiet);
    let mut report = FetchReport::default();

    for package in listing {
        bar.set_message(package.clone());
        bar.inc(1);

        if !force && cache.contains(package) {
            report.cached += 1;
            continue;
        }

        let Some(version) = versions.get(package) else {
            report.skipped.push(SkippedPackage {
                name: package.clone(),
                reason: "not in version index".to_string(),
            });
            continue;
        };

        let main = client.fetch_dependency_names(&client.manifest_url(package, version, false));
        client.pace();
        let tests = client.fetch_dependency_names(&client.manifest_url(package, version, true));
        client.pace();

        let (main, tests) = match (main, tests) {
            (Err(main_err), Err(_)) => {
                report.skipped.push(SkippedPackage {
                    name: package.clone(),
                    reason: main_err.to_string(),
                });
                continue;
            }
            (main, tests) => (main.unwrap_or_default(), tests.unwrap_or_default()),
        };

        let record = ManifestRecord {
            name: package.clone(),
            version: version.clone(),
            dependencies: manifest::merge_dependencies(main, tests),
        };
        cache.store(&record)?;
        report.fetched += 1;
    }

    bar.finish_and_clear();
    Ok(report)
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}
