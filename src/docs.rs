//! README lookup and lightweight markdown scraping.
//!
//! Nothing here is a markdown parser. The helpers read just enough structure
//! (frontmatter block, first `# ` heading, first paragraph) to label a
//! template, and under-report rather than guess when the layout is unusual.

use crate::normalize::sanitize_tag;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const README_FILE: &str = "README.md";
const FRONTMATTER_FENCE: &str = "---";

/// Where a service's README was found.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadmeLookup {
    pub path: PathBuf,
    /// True when the README belongs to the parent directory and is shared with
    /// sibling services.
    pub from_parent: bool,
}

/// Prefer `<service>/README.md`, then `<service>/../README.md`.
pub fn pick_readme(service_dir: &Path) -> Option<ReadmeLookup> {
    let local = service_dir.join(README_FILE);
    if local.is_file() {
        return Some(ReadmeLookup {
            path: local,
            from_parent: false,
        });
    }
    let parent = service_dir.parent()?.join(README_FILE);
    if parent.is_file() {
        return Some(ReadmeLookup {
            path: parent,
            from_parent: true,
        });
    }
    None
}

/// README contents plus where they came from.
#[derive(Clone, Debug)]
pub struct Readme {
    pub lookup: ReadmeLookup,
    pub text: String,
}

impl Readme {
    /// Read the README. Absence is handled by [`pick_readme`]; any failure here
    /// (permissions, invalid UTF-8) is a real error.
    pub fn load(lookup: ReadmeLookup) -> Result<Self> {
        let text = fs::read_to_string(&lookup.path)
            .with_context(|| format!("reading {}", lookup.path.display()))?;
        Ok(Self { lookup, text })
    }

    pub fn heading(&self) -> Option<String> {
        first_heading(&self.text)
    }

    pub fn tags(&self) -> Vec<String> {
        frontmatter_tags(&self.text)
    }

    pub fn first_paragraph(&self) -> Option<String> {
        first_paragraph(&self.text)
    }
}

/// Split `text` into (frontmatter lines, body lines).
///
/// Frontmatter only counts when the first non-blank line is `---` and a later
/// `---` closes it; otherwise the whole text is body.
fn split_frontmatter(text: &str) -> (Option<Vec<&str>>, Vec<&str>) {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    if lines.get(start).map(|line| line.trim()) != Some(FRONTMATTER_FENCE) {
        return (None, lines);
    }
    let close = lines[start + 1..]
        .iter()
        .position(|line| line.trim() == FRONTMATTER_FENCE)
        .map(|offset| start + 1 + offset);
    match close {
        Some(end) => (
            Some(lines[start + 1..end].to_vec()),
            lines[end + 1..].to_vec(),
        ),
        None => (None, lines),
    }
}

/// Text of the first `# ` heading outside the frontmatter block.
pub fn first_heading(text: &str) -> Option<String> {
    let (_, body) = split_frontmatter(text);
    body.iter()
        .filter_map(|line| line.trim().strip_prefix("# "))
        .map(str::trim)
        .find(|heading| !heading.is_empty())
        .map(str::to_string)
}

/// First contiguous block of non-blank lines after an optional leading
/// heading, joined with spaces.
pub fn first_paragraph(text: &str) -> Option<String> {
    let (_, body) = split_frontmatter(text);
    let mut lines = body
        .into_iter()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .peekable();
    if lines.peek().is_some_and(|line| line.starts_with('#')) {
        lines.next();
    }
    let paragraph: Vec<&str> = lines
        .skip_while(|line| line.is_empty())
        .take_while(|line| !line.is_empty())
        .collect();
    if paragraph.is_empty() {
        None
    } else {
        Some(paragraph.join(" "))
    }
}

/// Tags declared in the frontmatter block, sanitized.
///
/// `tags:` takes precedence over `tag:`; only the first occurrence of each key
/// is read. Values may be inline (`[a, b]`, `a, b`, optionally quoted) or a
/// block of `- item` lines following an empty inline value.
pub fn frontmatter_tags(text: &str) -> Vec<String> {
    let (Some(block), _) = split_frontmatter(text) else {
        return Vec::new();
    };

    let mut tags_value: Option<Vec<String>> = None;
    let mut tag_value: Option<Vec<String>> = None;
    let mut idx = 0;
    while idx < block.len() {
        let Some((key, inline)) = parse_key(block[idx]) else {
            idx += 1;
            continue;
        };
        let slot = if key.eq_ignore_ascii_case("tags") {
            &mut tags_value
        } else if key.eq_ignore_ascii_case("tag") {
            &mut tag_value
        } else {
            idx += 1;
            continue;
        };

        idx += 1;
        let items = if inline.is_empty() {
            let (items, consumed) = parse_list_items(&block[idx..]);
            idx += consumed;
            items
        } else {
            parse_tag_values(inline)
        };
        if slot.is_none() {
            *slot = Some(items);
        }
    }

    let clean = |values: Vec<String>| -> Vec<String> {
        values
            .iter()
            .map(|value| sanitize_tag(value))
            .filter(|tag| !tag.is_empty())
            .collect()
    };
    let tags = clean(tags_value.unwrap_or_default());
    if !tags.is_empty() {
        return tags;
    }
    clean(tag_value.unwrap_or_default())
}

/// Top-level `key: value` line; indented lines belong to a parent key.
fn parse_key(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// Consume `- item` lines; returns the items and how many lines were read.
fn parse_list_items(lines: &[&str]) -> (Vec<String>, usize) {
    let mut items = Vec::new();
    let mut consumed = 0;
    for line in lines {
        let Some(item) = line.trim_start().strip_prefix('-') else {
            break;
        };
        consumed += 1;
        let item = unquote(item.trim());
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
    (items, consumed)
}

fn parse_tag_values(raw: &str) -> Vec<String> {
    let mut value = unquote(raw.trim());
    if value.len() > 1 && value.starts_with('[') && value.ends_with(']') {
        value = value[1..value.len() - 1].trim();
    }
    value
        .split(',')
        .map(|part| unquote(part.trim()))
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() > 1
        && (value.starts_with('"') || value.starts_with('\''))
        && (value.ends_with('"') || value.ends_with('\''));
    if quoted {
        value[1..value.len() - 1].trim()
    } else {
        value
    }
}
