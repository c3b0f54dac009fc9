use serde::Serialize;

use crate::graph::reach::AncestorSets;

#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    pub package: String,
    pub dependents: usize,
}

/// Orders packages by how many packages transitively depend on them, most
/// depended-on first; ties break on ascending package name. Packages with no
/// known dependents are omitted rather than listed as zero.
pub fn rank(sets: &AncestorSets) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = sets
        .iter()
        .filter(|(_, ancestors)| !ancestors.is_empty())
        .map(|(package, ancestors)| RankEntry {
            package: package.as_str().to_string(),
            dependents: ancestors.len(),
        })
        .collect();
    entries.sort_by(|a, b| {
        b.dependents
            .cmp(&a.dependents)
            .then_with(|| a.package.cmp(&b.package))
    });
    entries
}

pub fn render_table(entries: &[RankEntry]) -> String {
    let mut out = String::from("| Package | Dependents |\n| ------- | ---------- |\n");
    for entry in entries {
        out.push_str(&format!("| {} | {} |\n", entry.package, entry.dependents));
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::core::package::ManifestRecord;
    use crate::graph::builder::build_graph;
    use crate::graph::rank::{rank, render_table, RankEntry};
    use crate::graph::reach::{ancestor_sets, AncestorSets};

    fn solve(records: &[(&str, &[&str])]) -> AncestorSets {
        let build = build_graph(records.iter().map(|(name, deps)| ManifestRecord {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            dependencies: deps.iter().map(|dep| dep.to_string()).collect(),
        }));
        ancestor_sets(&build.graph, None)
    }

    fn pairs(entries: &[RankEntry]) -> Vec<(&str, usize)> {
        entries
            .iter()
            .map(|entry| (entry.package.as_str(), entry.dependents))
            .collect()
    }

    #[test]
    fn chain_ranks_most_depended_on_first() {
        let entries = rank(&solve(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]));
        assert_eq!(pairs(&entries), vec![("c", 2), ("b", 1)]);
    }

    #[test]
    fn zero_count_packages_are_omitted() {
        let entries = rank(&solve(&[("a", &["b"]), ("b", &[]), ("lonely", &[])]));
        assert!(entries.iter().all(|entry| entry.dependents > 0));
        assert!(!entries.iter().any(|entry| entry.package == "lonely"));
    }

    #[test]
    fn counts_never_increase_down_the_report() {
        let entries = rank(&solve(&[
            ("a", &["base", "mid"]),
            ("mid", &["base"]),
            ("base", &[]),
        ]));
        for window in entries.windows(2) {
            assert!(window[0].dependents >= window[1].dependents);
        }
    }

    #[test]
    fn ties_break_on_ascending_name() {
        let entries = rank(&solve(&[("a", &["b"]), ("b", &["a"])]));
        assert_eq!(pairs(&entries), vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let entries = rank(&solve(&[]));
        assert!(entries.is_empty());
        assert_eq!(
            render_table(&entries),
            "| Package | Dependents |\n| ------- | ---------- |\n"
        );
    }

    #[test]
    fn table_has_header_and_one_row_per_entry() {
        let entries = rank(&solve(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]));
        let table = render_table(&entries);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| Package | Dependents |");
        assert_eq!(lines[2], "| c | 2 |");
        assert_eq!(lines[3], "| b | 1 |");
    }
}
