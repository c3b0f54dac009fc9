use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{resolve_config, Config};
use crate::core::package::{ManifestRecord, PackageId};
use crate::error::{DeprankError, Result};
use crate::graph::builder::{build_graph, GraphBuild};
use crate::graph::rank::{rank, render_table};
use crate::graph::reach::{ancestor_sets, ancestors_of};
use crate::registry::cache::ManifestCache;
use crate::registry::client::RegistryClient;
use crate::registry::manifest::{parse_index, parse_listing, version_table};
use crate::registry::populate_cache;
use crate::util::output;

#[derive(Parser, Debug)]
#[command(name = "deprank")]
#[command(about = "Rank registry packages by transitive dependents", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long, env = "DEPRANK_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Fetch(FetchArgs),
    Rank(RankArgs),
    Dependents(DependentsArgs),
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub jobs: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DependentsArgs {
    pub package: String,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
    }
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config)?;
    let cache = manifest_cache(&config, cli.cache_dir);
    match cli.command {
        Commands::Fetch(args) => handle_fetch(args, &config, &cache, cli.quiet),
        Commands::Rank(args) => handle_rank(args, &cache, cli.quiet),
        Commands::Dependents(args) => handle_dependents(args, &cache, cli.quiet),
        Commands::Completions(args) => handle_completions(args),
    }
}

fn manifest_cache(config: &Config, override_dir: Option<PathBuf>) -> ManifestCache {
    ManifestCache::new(override_dir.unwrap_or_else(|| config.cache.dir.clone()))
}

fn handle_fetch(args: FetchArgs, config: &Config, cache: &ManifestCache, quiet: bool) -> Result<()> {
    let listing_raw = fs::read_to_string(&config.registry.package_list)?;
    let listing = parse_listing(&listing_raw)?;
    let index_raw = fs::read_to_string(&config.registry.package_index)?;
    let versions = version_table(&parse_index(&index_raw)?);

    if !quiet {
        output::fetch_op(&format!(
            "{} packages listed, {} in version index",
            listing.len(),
            versions.len()
        ));
    }

    let client = RegistryClient::new(
        config.registry.host.clone(),
        Duration::from_millis(config.fetch.delay_ms),
    );
    let report = populate_cache(&client, cache, &listing, &versions, args.force, quiet)?;

    for skipped in &report.skipped {
        output::warn(&format!("skipped {}: {}", skipped.name, skipped.reason));
    }
    if !quiet {
        output::info(&format!(
            "fetched {}, already cached {}, skipped {}",
            report.fetched,
            report.cached,
            report.skipped.len()
        ));
    }
    Ok(())
}

fn handle_rank(args: RankArgs, cache: &ManifestCache, quiet: bool) -> Result<()> {
    let build = load_graph(cache, quiet)?;
    let sets = ancestor_sets(&build.graph, args.jobs);
    let mut entries = rank(&sets);
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&entries)
                .map_err(|err| DeprankError::Other(anyhow::Error::new(err)))?
        );
        return Ok(());
    }

    print!("{}", render_table(&entries));
    Ok(())
}

fn handle_dependents(args: DependentsArgs, cache: &ManifestCache, quiet: bool) -> Result<()> {
    let build = load_graph(cache, quiet)?;
    let package = PackageId::new(args.package.clone());
    let ancestors = ancestors_of(&build.graph, &package).ok_or_else(|| {
        DeprankError::Other(anyhow::anyhow!(format!("unknown package {}", args.package)))
    })?;

    let mut dependents: Vec<String> = ancestors
        .iter()
        .map(|id| id.as_str().to_string())
        .collect();
    dependents.sort();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dependents)
                .map_err(|err| DeprankError::Other(anyhow::Error::new(err)))?
        );
        return Ok(());
    }

    println!("dependents of {}:", args.package);
    for dependent in dependents {
        println!("{}", dependent);
    }
    Ok(())
}

fn handle_completions(args: CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

fn load_records(cache: &ManifestCache, quiet: bool) -> Result<Vec<ManifestRecord>> {
    let load = cache.load_all()?;
    if !quiet {
        for skipped in &load.skipped {
            output::warn(&format!(
                "skipped cache file {}: {}",
                skipped.path.display(),
                skipped.reason
            ));
        }
    }
    Ok(load.records)
}

fn load_graph(cache: &ManifestCache, quiet: bool) -> Result<GraphBuild> {
    let build = build_graph(load_records(cache, quiet)?);
    if !quiet {
        for dangling in &build.dangling {
            output::warn(&format!(
                "skipping missing dependency {} -> {}",
                dangling.from.as_str(),
                dangling.to
            ));
        }
    }
    Ok(build)
}
