//! repodistill CLI entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use repodistill::cache::NodeCache;
use repodistill::cli::{CacheArgs, Cli, Commands, ExtractArgs, IdentsArgs, WordsArgs};
use repodistill::coordinator::ExtractionCoordinator;
use repodistill::error::ExtractError;
use repodistill::idents::all_identifiers;
use repodistill::paths::repo_path;
use repodistill::schema::Node;
use repodistill::words::all_words;

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn run() -> repodistill::Result<String> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Words(args) => run_words(args),
        Commands::Idents(args) => run_idents(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "repodistill=debug" } else { "repodistill=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_cache(args: &CacheArgs) -> repodistill::Result<Option<NodeCache>> {
    if args.no_cache {
        return Ok(None);
    }
    let cache = match &args.cache_dir {
        Some(dir) => NodeCache::open(dir.clone())?,
        None => NodeCache::open_default()?,
    };
    Ok(Some(cache))
}

fn build_coordinator(jobs: usize, cache: &CacheArgs) -> repodistill::Result<ExtractionCoordinator> {
    let coordinator = ExtractionCoordinator::new(jobs)?;
    Ok(match open_cache(cache)? {
        Some(store) => coordinator.with_cache(store, cache.recompute),
        None => coordinator,
    })
}

fn run_extract(args: ExtractArgs) -> repodistill::Result<String> {
    let mut roots: Vec<PathBuf> = args.roots.clone();
    if let Some(base) = &args.repo_base {
        roots.extend(args.id.iter().map(|id| repo_path(base, id)));
    }
    if roots.is_empty() {
        return Err(ExtractError::InvalidRoot {
            path: "(no roots given)".into(),
        });
    }

    let coordinator = build_coordinator(args.jobs, &args.cache)?;
    let outcomes = coordinator.extract_all(&roots);

    // A batch where nothing succeeded is a failure; partial batches still
    // report, with per-root errors inlined.
    if outcomes.iter().all(|o| o.result.is_err()) {
        let first = outcomes
            .into_iter()
            .find_map(|o| o.result.err())
            .unwrap_or(ExtractError::InvalidRoot {
                path: "(no roots given)".into(),
            });
        return Err(first);
    }

    let report: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(tree) => serde_json::json!({
                "root": outcome.root.display().to_string(),
                "tree": tree,
            }),
            Err(e) => serde_json::json!({
                "root": outcome.root.display().to_string(),
                "error": e.to_string(),
            }),
        })
        .collect();

    let rendered = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    };
    rendered.map_err(|e| ExtractError::Cache {
        message: format!("cannot serialize batch report: {e}"),
    })
}

fn walk_one(root: &PathBuf, cache: &CacheArgs) -> repodistill::Result<Node> {
    let coordinator = build_coordinator(1, cache)?;
    coordinator.extract(root)
}

fn run_words(args: WordsArgs) -> repodistill::Result<String> {
    let tree = walk_one(&args.root, &args.cache)?;
    Ok(all_words(&tree, args.filter.into()).join("\n"))
}

fn run_idents(args: IdentsArgs) -> repodistill::Result<String> {
    let tree = walk_one(&args.root, &args.cache)?;
    Ok(all_identifiers(&tree).join("\n"))
}
