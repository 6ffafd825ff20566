//! Output path confinement and the registry write.
//!
//! The output path is resolved before anything is written: symlinks in the
//! existing part of the path are followed and `..` is applied lexically, and
//! the result must stay under the canonical repository root.

use crate::registry::model::Registry;
use crate::registry::schema::validate_registry_shape;
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Resolve `output` (relative paths are taken from `root`) and confine it to
/// `root`. `root` must already be canonical.
pub fn resolve_output_path(root: &Path, output: &Path) -> Result<PathBuf> {
    let candidate = if output.is_absolute() {
        output.to_path_buf()
    } else {
        root.join(output)
    };
    let resolved = resolve_lenient(&candidate);
    if resolved.as_path() == root || !resolved.starts_with(root) {
        bail!(
            "Output path '{}' must be inside repository {}",
            resolved.display(),
            root.display()
        );
    }
    if resolved.is_dir() {
        bail!("Output path '{}' is a directory", resolved.display());
    }
    Ok(resolved)
}

/// Like `fs::canonicalize`, but tolerates components that do not exist yet.
fn resolve_lenient(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(segment) => {
                resolved.push(segment);
                if let Ok(canonical) = fs::canonicalize(&resolved) {
                    resolved = canonical;
                }
            }
        }
    }
    resolved
}

/// Render the registry as two-space indented JSON with a trailing newline.
pub fn render_registry(registry: &Registry) -> Result<String> {
    let value = serde_json::to_value(registry).context("serializing registry")?;
    validate_registry_shape(&value)?;
    let mut rendered = serde_json::to_string_pretty(&value).context("rendering registry")?;
    rendered.push('\n');
    Ok(rendered)
}

/// Validate and atomically write the registry to an already-resolved path.
pub fn write_registry(registry: &Registry, path: &Path) -> Result<()> {
    let rendered = render_registry(registry)?;
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("Output path '{}' has no parent directory", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;

    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("staging output in {}", parent.display()))?;
    staged
        .write_all(rendered.as_bytes())
        .with_context(|| format!("writing staged output for {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staged.path(), fs::Permissions::from_mode(0o644))?;
    }
    staged
        .persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        templates = registry.templates.len(),
        "Wrote registry"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn canonical_root() -> (TempDir, PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = fs::canonicalize(temp.path()).unwrap();
        (temp, root)
    }

    #[test]
    fn relative_output_lands_under_root() {
        let (_temp, root) = canonical_root();
        let resolved = resolve_output_path(&root, Path::new("registry.json")).unwrap();
        assert_eq!(resolved, root.join("registry.json"));
        let resolved = resolve_output_path(&root, Path::new("out/./nested/../r.json")).unwrap();
        assert_eq!(resolved, root.join("out").join("r.json"));
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let (_temp, root) = canonical_root();
        for bad in ["../outside.json", "a/../../outside.json", "/tmp/elsewhere.json", "."] {
            let err = resolve_output_path(&root, Path::new(bad)).expect_err(bad);
            assert!(err.to_string().contains("must be inside repository"), "{bad}: {err}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_escape_is_rejected() {
        let (_temp, root) = canonical_root();
        let outside = TempDir::new().expect("outside dir");
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();
        let err = resolve_output_path(&root, Path::new("link/registry.json"))
            .expect_err("symlink escape should fail");
        assert!(err.to_string().contains("must be inside repository"));
    }

    #[test]
    fn write_registry_overwrites_with_trailing_newline() {
        let (_temp, root) = canonical_root();
        let path = root.join("registry.json");
        fs::write(&path, "stale").unwrap();
        let registry = Registry::new("https://github.com/owner/repo".to_string(), Vec::new());
        write_registry(&registry, &path).expect("write");
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"name\": \"ScaleTail Templates\""));
        assert!(written.ends_with("]\n}\n") || written.ends_with("[]\n}\n"));
        let parsed: Registry = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, registry);
    }
}
