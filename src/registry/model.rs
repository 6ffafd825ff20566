//! Serializable representation of `registry.json`.
//!
//! Field order here is the field order in the output file; keep it stable so
//! regenerating the registry produces byte-identical diffs.

use serde::{Deserialize, Serialize};

pub const REGISTRY_NAME: &str = "ScaleTail Templates";
pub const REGISTRY_DESCRIPTION: &str =
    "Curated Tailscale sidecar Docker configurations for self-hosted services.";
pub const REGISTRY_VERSION: &str = "1.0.0";
pub const TEMPLATE_VERSION: &str = "1.0.0";
pub const AUTHOR: &str = "ScaleTail";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Top-level registry envelope.
pub struct Registry {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub url: String,
    pub templates: Vec<Template>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One service template entry.
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub compose_url: String,
    pub env_url: String,
    pub documentation_url: String,
    pub tags: Vec<String>,
}

impl Registry {
    /// Wrap templates in the fixed envelope, sorted by id.
    pub fn new(repo_url: String, mut templates: Vec<Template>) -> Self {
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            name: REGISTRY_NAME.to_string(),
            description: REGISTRY_DESCRIPTION.to_string(),
            version: REGISTRY_VERSION.to_string(),
            author: AUTHOR.to_string(),
            url: repo_url,
            templates,
        }
    }
}
