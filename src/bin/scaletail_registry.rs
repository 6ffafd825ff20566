//! Generates `registry.json` from the `services/` tree of a ScaleTail checkout.
//!
//! Resolution order mirrors CI usage: flags win, then the GitHub Actions
//! environment (`GITHUB_REPOSITORY`, `GITHUB_REF_NAME`), then local git state.
//! Any failure exits non-zero before the output file is touched.

use anyhow::Result;
use clap::Parser;
use scaletail_registry::identity::{REF_ENV, REPO_ENV};
use scaletail_registry::{
    BuildConfig, DEFAULT_OUTPUT, Strategy, build_registry, find_repo_root, resolve_output_path,
    resolve_ref, resolve_repo_slug, write_registry,
};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scaletail-registry",
    version,
    about = "Generate registry.json from the services/ tree"
)]
struct Cli {
    /// GitHub repository in owner/name format (falls back to GITHUB_REPOSITORY, then the origin remote)
    #[arg(long)]
    repo: Option<String>,
    /// Branch, tag or commit embedded in raw URLs
    #[arg(long = "ref", env = REF_ENV)]
    git_ref: Option<String>,
    /// Output path for registry.json, relative to the repository root
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Repository root (defaults to the nearest ancestor containing services/)
    #[arg(long, env = "SCALETAIL_ROOT")]
    root: Option<PathBuf>,
    /// Metadata assembly strategy
    #[arg(long, value_enum, default_value_t = Strategy::Tags)]
    strategy: Strategy,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("scaletail-registry: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = find_repo_root(cli.root.as_deref())?;
    let env_repo = env::var(REPO_ENV).ok();
    let repo = resolve_repo_slug(cli.repo.as_deref(), env_repo.as_deref(), &root)?;
    let git_ref = resolve_ref(cli.git_ref.as_deref())?;
    // Confine the output before scanning so a bad path never costs a full run.
    let output = resolve_output_path(&root, &cli.output)?;

    let config = BuildConfig {
        root,
        repo,
        git_ref,
        strategy: cli.strategy,
    };
    config.trace_loaded();

    let registry = build_registry(&config)?;
    write_registry(&registry, &output)
}
