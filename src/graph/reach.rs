use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::core::package::PackageId;
use crate::graph::DependencyGraph;

pub type AncestorSets = HashMap<PackageId, HashSet<PackageId>>;

/// Computes, for every vertex, the set of vertices that transitively depend
/// on it. The reverse adjacency index is built once and shared read-only by
/// the per-vertex traversals; `jobs` > 1 runs them on a rayon pool, with
/// identical results either way.
pub fn ancestor_sets(graph: &DependencyGraph, jobs: Option<usize>) -> AncestorSets {
    let reverse = reverse_index(graph);
    let vertices: Vec<&PackageId> = graph.vertices().collect();

    match jobs {
        Some(count) if count > 1 => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(count).build();
            if let Ok(pool) = pool {
                return pool.install(|| {
                    vertices
                        .par_iter()
                        .map(|vertex| ((*vertex).clone(), collect_ancestors(vertex, &reverse)))
                        .collect()
                });
            }
            solve_sequential(&vertices, &reverse)
        }
        _ => solve_sequential(&vertices, &reverse),
    }
}

/// Ancestor set of a single vertex, or None when the vertex is unknown.
pub fn ancestors_of(graph: &DependencyGraph, package: &PackageId) -> Option<HashSet<PackageId>> {
    if !graph.contains_vertex(package) {
        return None;
    }
    let reverse = reverse_index(graph);
    Some(collect_ancestors(package, &reverse))
}

fn solve_sequential<'g>(
    vertices: &[&'g PackageId],
    reverse: &HashMap<&'g PackageId, Vec<&'g PackageId>>,
) -> AncestorSets {
    vertices
        .iter()
        .map(|vertex| ((*vertex).clone(), collect_ancestors(vertex, reverse)))
        .collect()
}

fn reverse_index(graph: &DependencyGraph) -> HashMap<&PackageId, Vec<&PackageId>> {
    let mut reverse: HashMap<&PackageId, Vec<&PackageId>> = HashMap::new();
    for from in graph.vertices() {
        for to in graph.dependencies_of(from) {
            reverse.entry(to).or_default().push(from);
        }
    }
    reverse
}

fn collect_ancestors<'g>(
    start: &PackageId,
    reverse: &HashMap<&'g PackageId, Vec<&'g PackageId>>,
) -> HashSet<PackageId> {
    let mut seen: HashSet<&PackageId> = HashSet::new();
    let mut stack: Vec<&PackageId> = reverse.get(start).cloned().unwrap_or_default();
    while let Some(current) = stack.pop() {
        if current == start || !seen.insert(current) {
            continue;
        }
        if let Some(next) = reverse.get(current) {
            stack.extend(next.iter().copied());
        }
    }
    seen.into_iter().cloned().collect()
}
