//! Category inference from the repository's root README.
//!
//! The root README groups services under `### Category` headings and links to
//! each service directory. That layout is a convention rather than a contract,
//! so the map is a best-effort tag source: a missing README or an unexpected
//! structure yields an empty map, never an error.

use crate::SERVICES_DIR;
use crate::docs::README_FILE;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Service path (relative to `services/`) to category slug.
#[derive(Clone, Debug, Default)]
pub struct CategoryMap {
    by_path: BTreeMap<String, String>,
}

impl CategoryMap {
    /// Build the map from `<root>/README.md`; an absent index gives an empty map.
    pub fn from_root(root: &Path) -> Result<Self> {
        let index = root.join(README_FILE);
        if !index.is_file() {
            tracing::debug!(path = %index.display(), "No root index; category map is empty");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&index)
            .with_context(|| format!("reading {}", index.display()))?;
        let map = Self::parse(&text)?;
        tracing::info!(entries = map.len(), "Built category map from root index");
        Ok(map)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let link = Regex::new(r#"\[[^\]]*\]\(\s*([^)\s]+)[^)]*\)"#)?;
        let prefix = format!("{SERVICES_DIR}/");
        let mut by_path = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let level = trimmed.chars().take_while(|c| *c == '#').count();
                if level == 3 {
                    current = Some(slugify(trimmed[level..].trim())).filter(|s| !s.is_empty());
                } else if level < 3 {
                    current = None;
                }
                continue;
            }
            let Some(category) = current.as_ref() else {
                continue;
            };
            for captures in link.captures_iter(line) {
                let target = normalize_link_target(&captures[1]);
                if let Some(service) = target.strip_prefix(&prefix).filter(|s| !s.is_empty()) {
                    by_path
                        .entry(service.to_string())
                        .or_insert_with(|| category.clone());
                }
            }
        }

        Ok(Self { by_path })
    }

    /// Category for a service path, falling back to its top-level directory.
    pub fn lookup(&self, service_rel: &str) -> Option<&str> {
        self.by_path
            .get(service_rel)
            .or_else(|| {
                let (top, _) = service_rel.split_once('/')?;
                self.by_path.get(top)
            })
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

fn normalize_link_target(raw: &str) -> &str {
    let mut target = raw.split('#').next().unwrap_or(raw);
    target = target.trim_start_matches("./").trim_start_matches('/');
    target = target.strip_suffix(README_FILE).unwrap_or(target);
    target.trim_end_matches('/')
}

/// Lowercase `value` and collapse every non-alphanumeric run into `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
