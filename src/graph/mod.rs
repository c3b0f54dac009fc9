use std::collections::HashMap;

use crate::core::package::PackageId;

pub mod builder;
pub mod rank;
pub mod reach;

/// Directed dependency graph, package -> packages it depends on. Built once
/// by `builder::build_graph` and read-only afterwards. Every vertex appears
/// as a key; adjacency lists are sorted and hold no duplicates.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    edges: HashMap<PackageId, Vec<PackageId>>,
}

impl DependencyGraph {
    pub fn contains_vertex(&self, package: &PackageId) -> bool {
        self.edges.contains_key(package)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &PackageId> {
        self.edges.keys()
    }

    pub fn dependencies_of(&self, package: &PackageId) -> &[PackageId] {
        self.edges.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vertex_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
