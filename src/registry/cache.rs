use std::fs;
use std::path::{Path, PathBuf};

use crate::core::package::ManifestRecord;
use crate::error::{DeprankError, Result};

/// On-disk manifest cache, one `{root}/{package}/summary.json` per package.
/// Package names may contain `/`, which nests directories.
#[derive(Debug, Clone)]
pub struct ManifestCache {
    root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct CacheLoad {
    pub records: Vec<ManifestRecord>,
    pub skipped: Vec<SkippedFile>,
}

impl ManifestCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, package: &str) -> PathBuf {
        self.root.join(package).join("summary.json")
    }

    pub fn contains(&self, package: &str) -> bool {
        self.path_for(package).is_file()
    }

    pub fn store(&self, record: &ManifestRecord) -> Result<()> {
        let path = self.path_for(&record.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|err| DeprankError::Other(anyhow::Error::new(err)))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads every cached summary. Files that cannot be read or parsed are
    /// returned as skipped diagnostics, never as errors.
    pub fn load_all(&self) -> Result<CacheLoad> {
        let pattern = format!("{}/**/summary.json", self.root.display());
        let paths = glob::glob(&pattern)
            .map_err(|err| DeprankError::Other(anyhow::Error::new(err)))?;

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    skipped.push(SkippedFile {
                        path: err.path().to_path_buf(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            match serde_json::from_str::<ManifestRecord>(&content) {
                Ok(record) => records.push(record),
                Err(err) => skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                }),
            }
        }

        Ok(CacheLoad { records, skipped })
    }
}
