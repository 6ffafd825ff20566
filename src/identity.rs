//! Repository identity: the `owner/name` slug and the git ref embedded in
//! every generated URL.
//!
//! Both values end up inside raw-content URLs, so they are validated up front
//! and carried as newtypes afterwards. Nothing downstream re-checks them.

use anyhow::{Result, bail};
use std::fmt;
use std::path::Path;
use std::process::Command;

/// Environment variable consulted when `--repo` is absent.
pub const REPO_ENV: &str = "GITHUB_REPOSITORY";
/// Environment variable consulted when `--ref` is absent.
pub const REF_ENV: &str = "GITHUB_REF_NAME";
pub const DEFAULT_REF: &str = "main";

/// Validated `owner/name` repository slug.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoSlug(String);

/// Validated branch, tag or commit-ish.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GitRef(String);

fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

impl RepoSlug {
    pub fn parse(value: &str) -> Result<Self> {
        let valid = match value.split_once('/') {
            Some((owner, name)) => {
                !owner.is_empty()
                    && !name.is_empty()
                    && owner.chars().all(is_slug_char)
                    && name.chars().all(is_slug_char)
            }
            None => false,
        };
        if !valid {
            bail!("Invalid repo slug '{value}'; expected owner/name");
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GitRef {
    pub fn parse(value: &str) -> Result<Self> {
        if value.is_empty() || !value.chars().all(|c| is_slug_char(c) || c == '/') {
            bail!("Invalid ref '{value}'");
        }
        if value.starts_with('/')
            || value.ends_with('/')
            || value.contains("..")
            || value.contains("//")
        {
            bail!("Invalid ref '{value}'");
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the repository slug.
///
/// Precedence: explicit argument, then the environment value, then the
/// `origin` remote of the checkout at `root`. Empty strings count as absent.
/// A candidate that is present but malformed is an error; it does not fall
/// through to the next source.
pub fn resolve_repo_slug(
    explicit: Option<&str>,
    from_env: Option<&str>,
    root: &Path,
) -> Result<RepoSlug> {
    if let Some(value) = explicit.filter(|v| !v.is_empty()) {
        tracing::debug!(source = "argument", repo = value, "Using repo slug");
        return RepoSlug::parse(value);
    }
    if let Some(value) = from_env.filter(|v| !v.is_empty()) {
        tracing::debug!(source = REPO_ENV, repo = value, "Using repo slug");
        return RepoSlug::parse(value);
    }
    match origin_remote_url(root) {
        Some(url) => {
            let slug = slug_from_remote_url(&url);
            tracing::debug!(source = "git remote", %url, repo = %slug, "Inferred repo slug");
            RepoSlug::parse(&slug)
        }
        None => bail!("Unable to determine repo slug; pass --repo owner/name"),
    }
}

/// Validate the ref, falling back to the default branch when none was given.
pub fn resolve_ref(value: Option<&str>) -> Result<GitRef> {
    GitRef::parse(value.unwrap_or(DEFAULT_REF))
}

fn origin_remote_url(root: &Path) -> Option<String> {
    let output = match Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(root)
        .output()
    {
        Ok(output) => output,
        Err(err) => {
            tracing::debug!(error = %err, "git unavailable; cannot infer repo slug");
            return None;
        }
    };
    if !output.status.success() {
        tracing::debug!(status = ?output.status.code(), "git remote get-url origin failed");
        return None;
    }
    let url = String::from_utf8_lossy(&output.stdout)
        .trim()
        .trim_end_matches('/')
        .to_string();
    if url.is_empty() { None } else { Some(url) }
}

/// Extract `owner/name` from an SSH or HTTPS remote URL.
///
/// The result is not validated; malformed remotes surface through
/// [`RepoSlug::parse`].
pub fn slug_from_remote_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let path = if let Some(rest) = url.strip_prefix("git@") {
        // git@github.com:owner/name.git
        rest.split_once(':').map(|(_, path)| path).unwrap_or(rest)
    } else if let Some((_, rest)) = url.split_once("://") {
        // https://github.com/owner/name.git, ssh://git@github.com/owner/name.git
        rest.split_once('/').map(|(_, path)| path).unwrap_or(rest)
    } else {
        url
    };
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn slug_accepts_owner_name_only() {
        assert!(RepoSlug::parse("tailscale-dev/ScaleTail").is_ok());
        assert!(RepoSlug::parse("a.b_c/d-e.f").is_ok());
        for bad in ["", "owner", "owner/", "/name", "a/b/c", "own er/name", "owner/na$me"] {
            let err = RepoSlug::parse(bad).expect_err("slug should be rejected");
            assert!(err.to_string().contains("expected owner/name"), "{bad}");
        }
    }

    #[test]
    fn ref_rejects_traversal_and_edge_slashes() {
        for good in ["main", "v1.2.3", "feature/new-thing", "release_2024"] {
            assert!(GitRef::parse(good).is_ok(), "{good}");
        }
        for bad in ["", "/main", "main/", "a//b", "../etc", "a..b", "has space", "semi;colon"] {
            assert!(GitRef::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn resolve_ref_defaults_to_main() {
        assert_eq!(resolve_ref(None).unwrap().as_str(), "main");
        assert_eq!(resolve_ref(Some("v2")).unwrap().as_str(), "v2");
        assert!(resolve_ref(Some("")).is_err());
    }

    #[test]
    fn remote_url_forms_reduce_to_slug() {
        assert_eq!(
            slug_from_remote_url("git@github.com:tailscale-dev/ScaleTail.git"),
            "tailscale-dev/ScaleTail"
        );
        assert_eq!(
            slug_from_remote_url("https://github.com/tailscale-dev/ScaleTail.git/"),
            "tailscale-dev/ScaleTail"
        );
        assert_eq!(
            slug_from_remote_url("https://github.com/tailscale-dev/ScaleTail"),
            "tailscale-dev/ScaleTail"
        );
        assert_eq!(
            slug_from_remote_url("ssh://git@github.com/owner/repo.git"),
            "owner/repo"
        );
    }

    #[test]
    fn explicit_slug_wins_over_env() {
        let temp = TempDir::new().expect("temp dir");
        let slug = resolve_repo_slug(Some("arg/repo"), Some("env/repo"), temp.path()).unwrap();
        assert_eq!(slug.as_str(), "arg/repo");
        let slug = resolve_repo_slug(Some(""), Some("env/repo"), temp.path()).unwrap();
        assert_eq!(slug.as_str(), "env/repo");
    }

    #[test]
    fn malformed_explicit_slug_does_not_fall_through() {
        let temp = TempDir::new().expect("temp dir");
        let err = resolve_repo_slug(Some("not-a-slug"), Some("env/repo"), temp.path())
            .expect_err("malformed slug should fail");
        assert!(err.to_string().contains("not-a-slug"));
    }
}
