use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A package manifest reduced to what the graph needs. Doubles as the
/// on-disk cache format under `{cache}/{package}/summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
}
