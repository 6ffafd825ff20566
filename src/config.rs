//! Resolved inputs for one registry build.

use crate::identity::{GitRef, RepoSlug};
use std::fmt;
use std::path::PathBuf;

/// How service metadata is assembled into names, descriptions and tags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Strategy {
    /// Fixed sidecar description; tags from README frontmatter.
    #[default]
    Tags,
    /// Description from the README's first paragraph; tags may fall back to
    /// the category listed in the root README index.
    Summary,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Tags => "tags",
            Strategy::Summary => "summary",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pure build pipeline needs, already validated.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Canonical repository root.
    pub root: PathBuf,
    pub repo: RepoSlug,
    pub git_ref: GitRef,
    pub strategy: Strategy,
}

impl BuildConfig {
    pub fn services_dir(&self) -> PathBuf {
        self.root.join(crate::SERVICES_DIR)
    }

    pub fn trace_loaded(&self) {
        tracing::info!(
            root = %self.root.display(),
            repo = %self.repo,
            git_ref = %self.git_ref,
            strategy = %self.strategy,
            "Resolved build configuration"
        );
    }
}
