//! Per-service record assembly.
//!
//! Every discovered service yields exactly one [`Template`]. Discovery has
//! already enforced the compose/.env pairing, so the only failures left here
//! are unreadable README files and two directories mapping to the same id.

use crate::category::CategoryMap;
use crate::config::{BuildConfig, Strategy};
use crate::discovery::{ServiceDir, discover_services, posix_relative};
use crate::docs::{Readme, pick_readme};
use crate::normalize::{
    NameRules, default_tags, finalize_tags, sanitize_description, sanitize_tag, title_from_id,
};
use crate::registry::model::{AUTHOR, Registry, TEMPLATE_VERSION, Template};
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::path::Path;

const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// Raw-content URL for a file under the repository root.
pub fn raw_url(config: &BuildConfig, path: &Path) -> Result<String> {
    let rel = posix_relative(path, &config.root)?;
    Ok(format!(
        "{RAW_CONTENT_BASE}/{}/{}/{rel}",
        config.repo, config.git_ref
    ))
}

/// Scan `services/` and build the full registry.
pub fn build_registry(config: &BuildConfig) -> Result<Registry> {
    let services = discover_services(&config.services_dir())?;
    tracing::info!(count = services.len(), "Discovered services");

    let rules = NameRules::new()?;
    let categories = match config.strategy {
        Strategy::Summary => CategoryMap::from_root(&config.root)?,
        Strategy::Tags => CategoryMap::default(),
    };

    let templates = services
        .iter()
        .map(|service| build_template(config, service, &rules, &categories))
        .collect::<Result<Vec<_>>>()?;

    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for (service, template) in services.iter().zip(&templates) {
        if let Some(previous) = seen.insert(template.id.as_str(), service.rel.as_str()) {
            bail!(
                "Duplicate template id '{}' from services/{previous} and services/{}",
                template.id,
                service.rel
            );
        }
    }

    Ok(Registry::new(
        format!("https://github.com/{}", config.repo),
        templates,
    ))
}

/// Build the record for one service.
pub fn build_template(
    config: &BuildConfig,
    service: &ServiceDir,
    rules: &NameRules,
    categories: &CategoryMap,
) -> Result<Template> {
    let id = service.id();
    let mut raw_name = title_from_id(&id);
    let mut tags = Vec::new();
    let mut paragraph = None;

    let readme = pick_readme(&service.dir).map(Readme::load).transpose()?;
    if let Some(readme) = &readme {
        // A parent README shared by nested siblings would give them all the
        // same heading, so only the id-derived title is used there.
        let shared = readme.lookup.from_parent && service.is_nested();
        if let Some(heading) = readme.heading().filter(|_| !shared) {
            raw_name = heading;
        }
        tags = readme.tags();
        if config.strategy == Strategy::Summary {
            paragraph = readme.first_paragraph();
        }
    }

    if tags.is_empty() && config.strategy == Strategy::Summary {
        if let Some(category) = categories.lookup(&service.rel) {
            tags = vec![sanitize_tag(category)];
            tags.retain(|tag| !tag.is_empty());
        }
    }
    if tags.is_empty() {
        tags = default_tags();
    }
    let tags = finalize_tags(tags);

    let name = rules.display_name(&raw_name, config.strategy);
    let described = rules.strip_suffix(&name);
    let description = match config.strategy {
        Strategy::Tags => sanitize_description(&format!(
            "ScaleTail configuration for {described} running a Tailscale sidecar."
        )),
        Strategy::Summary => paragraph
            .map(|text| sanitize_description(&text))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| {
                sanitize_description(&format!(
                    "Tailscale sidecar configuration for {described}."
                ))
            }),
    };

    let compose_url = raw_url(config, &service.compose)?;
    let env_url = raw_url(config, &service.env)?;
    let documentation_url = match &readme {
        Some(readme) => raw_url(config, &readme.lookup.path)?,
        None => compose_url.clone(),
    };

    tracing::debug!(
        id = %id,
        name = %name,
        tags = ?tags,
        readme = ?readme.as_ref().map(|r| r.lookup.path.display().to_string()),
        "Built template"
    );

    Ok(Template {
        id,
        name,
        description,
        version: TEMPLATE_VERSION.to_string(),
        author: AUTHOR.to_string(),
        compose_url,
        env_url,
        documentation_url,
        tags,
    })
}
