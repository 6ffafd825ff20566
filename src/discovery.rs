//! Service discovery under `services/`.
//!
//! A service is any directory holding a `compose.yaml`. The sibling `.env` is
//! part of the template contract, so a missing one aborts discovery instead
//! of quietly dropping the service from the registry.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const COMPOSE_FILE: &str = "compose.yaml";
pub const ENV_FILE: &str = ".env";

/// One discovered service directory with its mandatory files.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceDir {
    pub dir: PathBuf,
    pub compose: PathBuf,
    pub env: PathBuf,
    /// Path relative to `services/`, `/`-separated.
    pub rel: String,
}

impl ServiceDir {
    /// Registry id: the relative path with separators replaced by `-`.
    ///
    /// `a-b/` and `a/b/` both map to `a-b`; the registry builder rejects
    /// such collisions.
    pub fn id(&self) -> String {
        self.rel.replace('/', "-")
    }

    /// True when the service sits below another directory inside `services/`.
    pub fn is_nested(&self) -> bool {
        self.rel.contains('/')
    }
}

/// Find every service under `services_dir`, sorted by path.
pub fn discover_services(services_dir: &Path) -> Result<Vec<ServiceDir>> {
    if !services_dir.is_dir() {
        bail!("Services directory not found: {}", services_dir.display());
    }

    let mut composes = Vec::new();
    collect_compose_files(services_dir, &mut composes)?;
    composes.sort();

    let mut services = Vec::with_capacity(composes.len());
    for compose in composes {
        let dir = compose
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| services_dir.to_path_buf());
        let env = dir.join(ENV_FILE);
        if !env.is_file() {
            bail!("Missing {ENV_FILE} for {}", compose.display());
        }
        let rel = posix_relative(&dir, services_dir)?;
        tracing::debug!(service = %rel, "Discovered service");
        services.push(ServiceDir {
            dir,
            compose,
            env,
            rel,
        });
    }
    Ok(services)
}

fn collect_compose_files(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        // Symlinked directories are skipped; `file_type` does not follow links.
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", path.display()))?;
        if file_type.is_dir() {
            collect_compose_files(&path, acc)?;
        } else if path.file_name().and_then(|name| name.to_str()) == Some(COMPOSE_FILE) {
            acc.push(path);
        }
    }
    Ok(())
}

/// Render `path` relative to `base` with `/` separators.
pub fn posix_relative(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).with_context(|| {
        format!("{} is not inside {}", path.display(), base.display())
    })?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(seg) => match seg.to_str() {
                Some(seg) => parts.push(seg),
                None => bail!("Path is not valid UTF-8: {}", path.display()),
            },
            Component::CurDir => {}
            _ => bail!("Unexpected path component in {}", path.display()),
        }
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_service(services: &Path, rel: &str, with_env: bool) {
        let dir = services.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(COMPOSE_FILE), "services: {}\n").unwrap();
        if with_env {
            fs::write(dir.join(ENV_FILE), "TS_AUTHKEY=\n").unwrap();
        }
    }

    #[test]
    fn discover_services_recurses_and_sorts() {
        let temp = TempDir::new().expect("temp dir");
        let services = temp.path().join("services");
        add_service(&services, "zulu", true);
        add_service(&services, "alpha", true);
        add_service(&services, "media/jellyfin", true);
        fs::write(services.join("alpha").join("notes.txt"), "ignored").unwrap();

        let found = discover_services(&services).expect("discover");
        let rels: Vec<_> = found.iter().map(|s| s.rel.as_str()).collect();
        assert_eq!(rels, vec!["alpha", "media/jellyfin", "zulu"]);
        assert_eq!(found[1].id(), "media-jellyfin");
        assert!(found[1].is_nested());
        assert!(!found[0].is_nested());
    }

    #[test]
    fn missing_env_names_the_compose_file() {
        let temp = TempDir::new().expect("temp dir");
        let services = temp.path().join("services");
        add_service(&services, "good", true);
        add_service(&services, "broken", false);

        let err = discover_services(&services).expect_err("missing .env should abort");
        let message = err.to_string();
        assert!(message.contains("Missing .env"), "{message}");
        assert!(message.contains("broken"), "{message}");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_walked() {
        let temp = TempDir::new().expect("temp dir");
        let services = temp.path().join("services");
        add_service(&services, "jellyfin", true);
        add_service(&services, "media", true);
        std::os::unix::fs::symlink(services.join("jellyfin"), services.join("jf-latest")).unwrap();
        std::os::unix::fs::symlink(&services, services.join("media").join("loop")).unwrap();

        let found = discover_services(&services).expect("discover");
        let rels: Vec<_> = found.iter().map(|s| s.rel.as_str()).collect();
        assert_eq!(rels, vec!["jellyfin", "media"]);
    }

    #[test]
    fn missing_services_dir_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        assert!(discover_services(&temp.path().join("services")).is_err());
    }
}
