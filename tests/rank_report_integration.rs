use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

struct TestCache {
    root: PathBuf,
}

impl TestCache {
    fn new(prefix: &str) -> Self {
        let root = unique_temp_dir(prefix);
        fs::create_dir_all(&root).expect("create cache root");
        Self { root }
    }

    fn write_summary(&self, name: &str, version: &str, deps: &[&str]) {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).expect("create package dir");
        let deps_json = deps
            .iter()
            .map(|dep| format!("\"{dep}\""))
            .collect::<Vec<_>>()
            .join(", ");
        fs::write(
            dir.join("summary.json"),
            format!(
                "{{\"name\": \"{name}\", \"version\": \"{version}\", \"dependencies\": [{deps_json}]}}"
            ),
        )
        .expect("write summary.json");
    }

    fn rank(&self, extra: &[&str]) -> (String, String, bool) {
        let mut cmd = Command::new(deprank_bin());
        cmd.arg("--cache-dir").arg(&self.root).arg("rank");
        for arg in extra {
            cmd.arg(arg);
        }

        let output = cmd.output().expect("run deprank rank");
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.success(),
        )
    }
}

impl Drop for TestCache {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn deprank_bin() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_deprank") {
        return PathBuf::from(path);
    }

    let current_exe = std::env::current_exe().expect("resolve current test binary path");
    let target_dir = current_exe
        .parent()
        .and_then(Path::parent)
        .expect("derive cargo target dir from test binary path");
    let bin_name = if cfg!(windows) {
        "deprank.exe"
    } else {
        "deprank"
    };
    let fallback = target_dir.join(bin_name);

    if fallback.is_file() {
        fallback
    } else {
        panic!(
            "CARGO_BIN_EXE_deprank is not set and fallback binary not found at {}",
            fallback.display()
        );
    }
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_nanos();
    let pid = std::process::id();
    std::env::temp_dir().join(format!("deprank-{prefix}-{pid}-{nanos}"))
}

#[test]
fn chain_ranks_by_transitive_dependents() {
    let cache = TestCache::new("rank-chain");
    cache.write_summary("alpha/app", "1.0.0", &["beta/lib"]);
    cache.write_summary("beta/lib", "1.0.0", &["gamma/base"]);
    cache.write_summary("gamma/base", "1.0.0", &[]);

    let (stdout, _, success) = cache.rank(&[]);
    assert!(success);
    assert_eq!(
        stdout,
        "| Package | Dependents |\n\
         | ------- | ---------- |\n\
         | gamma/base | 2 |\n\
         | beta/lib | 1 |\n"
    );
}

#[test]
fn json_output_is_structured_and_ordered() {
    let cache = TestCache::new("rank-json");
    cache.write_summary("alpha/app", "1.0.0", &["beta/lib"]);
    cache.write_summary("beta/lib", "1.0.0", &["gamma/base"]);
    cache.write_summary("gamma/base", "1.0.0", &[]);

    let (stdout, _, success) = cache.rank(&["--json"]);
    assert!(success);
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(&stdout).expect("parse rank json");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["package"], "gamma/base");
    assert_eq!(entries[0]["dependents"], 2);
    assert_eq!(entries[1]["package"], "beta/lib");
    assert_eq!(entries[1]["dependents"], 1);
}

#[test]
fn cycle_ties_order_by_name() {
    let cache = TestCache::new("rank-cycle");
    cache.write_summary("alpha/a", "1.0.0", &["beta/b"]);
    cache.write_summary("beta/b", "1.0.0", &["alpha/a"]);

    let (stdout, _, success) = cache.rank(&[]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[2], "| alpha/a | 1 |");
    assert_eq!(lines[3], "| beta/b | 1 |");
}

#[test]
fn dangling_dependency_warns_but_still_reports() {
    let cache = TestCache::new("rank-dangling");
    cache.write_summary("alpha/app", "1.0.0", &["beta/lib", "ghost/missing"]);
    cache.write_summary("beta/lib", "1.0.0", &[]);

    let (stdout, stderr, success) = cache.rank(&[]);
    assert!(success);
    assert!(stderr.contains("ghost/missing"));
    assert!(stdout.contains("| beta/lib | 1 |"));
    assert!(!stdout.contains("ghost/missing"));
}

#[test]
fn empty_cache_yields_header_only() {
    let cache = TestCache::new("rank-empty");
    let (stdout, _, success) = cache.rank(&[]);
    assert!(success);
    assert_eq!(stdout, "| Package | Dependents |\n| ------- | ---------- |\n");
}

#[test]
fn limit_truncates_the_report() {
    let cache = TestCache::new("rank-limit");
    cache.write_summary("alpha/app", "1.0.0", &["beta/lib"]);
    cache.write_summary("beta/lib", "1.0.0", &["gamma/base"]);
    cache.write_summary("gamma/base", "1.0.0", &[]);

    let (stdout, _, success) = cache.rank(&["--limit", "1"]);
    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "| gamma/base | 2 |");
}
