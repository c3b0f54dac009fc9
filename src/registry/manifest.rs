use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{DeprankError, Result};

/// One row of the registry's package index: name plus published versions,
/// newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub versions: Vec<String>,
}

pub fn parse_listing(content: &str) -> Result<Vec<String>> {
    serde_json::from_str(content).map_err(|err| DeprankError::Other(anyhow::Error::new(err)))
}

pub fn parse_index(content: &str) -> Result<Vec<IndexEntry>> {
    serde_json::from_str(content).map_err(|err| DeprankError::Other(anyhow::Error::new(err)))
}

/// Name -> version to fetch. The index lists versions newest first, so the
/// first one wins; entries with no versions are dropped.
pub fn version_table(entries: &[IndexEntry]) -> HashMap<String, String> {
    entries
        .iter()
        .filter_map(|entry| {
            entry
                .versions
                .first()
                .map(|version| (entry.name.clone(), version.clone()))
        })
        .collect()
}

/// Dependency names of a legacy manifest: the keys of its `dependencies`
/// object. A manifest without that object has no dependencies.
pub fn dependency_names(content: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|err| DeprankError::Other(anyhow::Error::new(err)))?;
    let names = value
        .get("dependencies")
        .and_then(|deps| deps.as_object())
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default();
    Ok(names)
}

// Union of the main and test dependency sets, first occurrence wins.
pub fn merge_dependencies(main: Vec<String>, tests: Vec<String>) -> Vec<String> {
    let mut merged = Vec::new();
    for name in main.into_iter().chain(tests) {
        if !merged.contains(&name) {
            merged.push(name);
        }
    }
    merged
}
