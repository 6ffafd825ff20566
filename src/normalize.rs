//! Normalization of display names, descriptions and tags.
//!
//! README content is free-form, so everything that reaches the registry goes
//! through one of the sanitizers here: control characters and angle brackets
//! are dropped, whitespace is collapsed and lengths are capped.

use crate::config::Strategy;
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const TAG_MAX_CHARS: usize = 32;
pub const NAME_PLACEHOLDER: &str = "Unnamed Service";

/// Tags used when a README provides none.
pub const DEFAULT_TAGS: &[&str] = &["ScaleTail"];
/// Tags every template must carry, in the order they are prepended.
pub const REQUIRED_TAGS: &[&str] = &["ScaleTail"];

// Longest phrases first so "with Tailscale Sidecar" is not cut down to
// "... Sidecar" by the shorter "with Tailscale" rule.
const TAILSCALE_SUFFIXES: &[&str] = &[
    r"\s+with\s+Tailscale\s+Sidecar\s+Configuration\s*$",
    r"\s+with\s+Tailscale\s+Sidecar\s*$",
    r"\s+with\s+Tailscale\s+Configuration\s*$",
    r"\s+with\s+Tailscale\s*$",
    r"\s+Tailscale\s+Sidecar\s+Configuration\s*$",
    r"\s+Tailscale\s+Sidecar\s*$",
    r"\s+Sidecar\s+Configuration\s*$",
];

const TAILSCALE_APPENDIX: &str = " with Tailscale";

/// Compiled suffix rules for display names.
pub struct NameRules {
    suffixes: Vec<Regex>,
}

impl NameRules {
    pub fn new() -> Result<Self> {
        let suffixes = TAILSCALE_SUFFIXES
            .iter()
            .map(|pattern| Regex::new(&format!("(?i){pattern}")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { suffixes })
    }

    /// Remove trailing "with Tailscale Sidecar Configuration"-style phrases.
    ///
    /// The ordered rule list is applied until nothing changes. Never returns
    /// an empty string: if stripping consumes everything, the trimmed input is
    /// returned instead.
    pub fn strip_suffix(&self, value: &str) -> String {
        let original = value.trim();
        let mut base = original.to_string();
        loop {
            let before = base.clone();
            for rule in &self.suffixes {
                base = rule.replace(&base, "").into_owned();
            }
            base = base.trim_matches(|c| c == ' ' || c == '-').to_string();
            if base == before {
                break;
            }
        }
        if base.is_empty() {
            original.to_string()
        } else {
            base
        }
    }

    /// Turn a raw title into the registry display name for `strategy`.
    ///
    /// The raw title is cleaned before suffix rules run, and under the `tags`
    /// strategy the base is shortened so the appended phrase survives the cap.
    pub fn display_name(&self, raw: &str, strategy: Strategy) -> String {
        let stripped = self.strip_suffix(&sanitize_text(raw, usize::MAX));
        let named = match strategy {
            Strategy::Tags if !stripped.to_lowercase().contains("tailscale") => {
                let room = NAME_MAX_CHARS - TAILSCALE_APPENDIX.chars().count();
                let base: String = stripped.chars().take(room).collect();
                format!("{}{TAILSCALE_APPENDIX}", base.trim_end())
            }
            _ => stripped,
        };
        sanitize_name(&named)
    }
}

/// Title-case a service id: `home-assistant_core` becomes `Home Assistant Core`.
pub fn title_from_id(value: &str) -> String {
    value
        .split(|c| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Strip control characters and angle brackets, collapse whitespace, trim,
/// then cap at `max_chars`.
pub fn sanitize_text(value: &str, max_chars: usize) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_control() && !matches!(c, '<' | '>'))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

pub fn sanitize_name(value: &str) -> String {
    let name = sanitize_text(value, NAME_MAX_CHARS);
    if name.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        name
    }
}

pub fn sanitize_description(value: &str) -> String {
    sanitize_text(value, DESCRIPTION_MAX_CHARS)
}

/// Restrict a tag to `[A-Za-z0-9 ._+-]`, collapse whitespace and cap it.
///
/// May return an empty string; callers drop those.
pub fn sanitize_tag(value: &str) -> String {
    let kept: String = value
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '+' | '-'))
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(TAG_MAX_CHARS).collect()
}

/// Case-insensitive dedup that keeps the first spelling seen.
pub fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}

/// Deduplicate and make sure every required tag is present.
pub fn finalize_tags(tags: Vec<String>) -> Vec<String> {
    let tags = dedupe_tags(tags);
    let missing: Vec<String> = REQUIRED_TAGS
        .iter()
        .filter(|required| !tags.iter().any(|tag| tag.eq_ignore_ascii_case(required)))
        .map(|required| required.to_string())
        .collect();
    if missing.is_empty() {
        return tags;
    }
    dedupe_tags(missing.into_iter().chain(tags).collect())
}

pub fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect()
}
