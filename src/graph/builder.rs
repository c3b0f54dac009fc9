use std::collections::{HashMap, HashSet};

use crate::core::package::{ManifestRecord, PackageId};
use crate::graph::DependencyGraph;

#[derive(Debug, Clone)]
pub struct DanglingDependency {
    pub from: PackageId,
    pub to: String,
}

#[derive(Debug)]
pub struct GraphBuild {
    pub graph: DependencyGraph,
    pub dangling: Vec<DanglingDependency>,
}

/// Builds the graph in two passes: every record registers its vertex before
/// any edge is resolved, so record order cannot drop edges. Dependencies on
/// names that never appear as a vertex are returned as diagnostics instead
/// of edges. Duplicate records for the same name merge; edges already added
/// stay.
pub fn build_graph<I>(records: I) -> GraphBuild
where
    I: IntoIterator<Item = ManifestRecord>,
{
    let records: Vec<ManifestRecord> = records.into_iter().collect();

    let mut edges: HashMap<PackageId, Vec<PackageId>> = HashMap::new();
    for record in &records {
        edges.entry(PackageId::new(record.name.clone())).or_default();
    }

    let mut added: HashSet<(PackageId, PackageId)> = HashSet::new();
    let mut dangling = Vec::new();
    for record in &records {
        let from = PackageId::new(record.name.clone());
        for dep in &record.dependencies {
            let to = PackageId::new(dep.clone());
            if !edges.contains_key(&to) {
                dangling.push(DanglingDependency {
                    from: from.clone(),
                    to: dep.clone(),
                });
                continue;
            }
            if added.insert((from.clone(), to.clone())) {
                edges.entry(from.clone()).or_default().push(to);
            }
        }
    }

    for deps in edges.values_mut() {
        deps.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    }

    GraphBuild {
        graph: DependencyGraph { edges },
        dangling,
    }
}
