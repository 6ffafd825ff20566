//! Shared library for the ScaleTail registry generator.
//!
//! The crate turns a checkout of the ScaleTail repository into a single
//! `registry.json` catalog: discover services under `services/`, scrape their
//! README files for titles, tags and summaries, normalize the results, and
//! serialize the registry envelope. The `scaletail-registry` binary is a thin
//! clap wrapper around [`build_registry`] and [`write_registry`].

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod category;
pub mod config;
pub mod discovery;
pub mod docs;
pub mod identity;
pub mod normalize;
pub mod registry;

pub use category::CategoryMap;
pub use config::{BuildConfig, Strategy};
pub use discovery::{ServiceDir, discover_services};
pub use docs::{Readme, ReadmeLookup, pick_readme};
pub use identity::{GitRef, RepoSlug, resolve_ref, resolve_repo_slug};
pub use registry::{Registry, Template, build_registry, resolve_output_path, write_registry};

/// Directory under the repository root that holds one subdirectory per service.
pub const SERVICES_DIR: &str = "services";
/// Default output file name, relative to the repository root.
pub const DEFAULT_OUTPUT: &str = "registry.json";

/// Returns true when `candidate` looks like a ScaleTail checkout.
fn is_repo_root(candidate: &Path) -> bool {
    candidate.join(SERVICES_DIR).is_dir()
}

/// Verifies that an explicit root hint points at a valid checkout.
fn repo_root_from_hint(hint: &Path) -> Option<PathBuf> {
    if hint.as_os_str().is_empty() || !is_repo_root(hint) {
        return None;
    }
    fs::canonicalize(hint).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_repo_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the repository root.
///
/// An explicit path (from `--root` or `SCALETAIL_ROOT`) must point at a
/// checkout with a `services/` directory; it is never silently replaced by the
/// upward search. Without one, walk up from the working directory.
pub fn find_repo_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return match repo_root_from_hint(path) {
            Some(root) => Ok(root),
            None => bail!(
                "{} is not a ScaleTail checkout (no {SERVICES_DIR}/ directory)",
                path.display()
            ),
        };
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(root) = search_upwards(&cwd) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate the repository root. Run from inside the checkout or pass --root (or set SCALETAIL_ROOT)."
    );
}
