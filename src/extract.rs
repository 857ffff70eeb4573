//! Metadata extraction from `SKILL.md` content.
//!
//! Extraction is a total function: any input yields a usable [`SkillMeta`].
//! Well-formed YAML frontmatter wins; malformed frontmatter goes through a
//! line-level repair pass, and whatever the frontmatter did not provide is
//! filled by heuristics over the remaining markdown text.

use log::warn;
use serde_yaml::{Mapping, Value};

/// Category assigned when no usable category is found anywhere.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Metadata collected from a single `SKILL.md` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillMeta {
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl Default for SkillMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
        }
    }
}

/// Fields the frontmatter actually provided. A present-but-empty scalar still
/// counts as provided for `category` and `tags`; `name` and `description`
/// additionally fall through to heuristics when empty.
#[derive(Debug, Default)]
struct FrontmatterPatch {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
    tags: Option<Vec<String>>,
}

/// Extracts skill metadata from raw `SKILL.md` content.
///
/// Never fails. Unparseable frontmatter is repaired once and otherwise
/// abandoned; the heuristic pass then runs over the full content. When the
/// frontmatter does parse, heuristics only see the text after it.
pub fn extract_metadata(content: &str) -> SkillMeta {
    let mut meta = SkillMeta::default();

    let (patch, body) = match parse_frontmatter(content) {
        Some((patch, body)) => (patch, body),
        None => (FrontmatterPatch::default(), content),
    };

    if let Some(name) = &patch.name {
        meta.name = name.clone();
    }
    if let Some(description) = &patch.description {
        meta.description = description.clone();
    }
    if let Some(category) = &patch.category {
        meta.category = category.clone();
    }
    if let Some(tags) = &patch.tags {
        meta.tags = tags.clone();
    }

    let scan = scan_text(body);

    if meta.name.is_empty() {
        if let Some(header) = scan.first_header {
            meta.name = header;
        }
    }
    if meta.description.is_empty() {
        if let Some(description) = heuristic_description(&scan.lines, &meta.name) {
            meta.description = description;
        }
    }
    if patch.category.is_none() {
        if let Some(category) = scan.category.as_deref().and_then(clean_category) {
            meta.category = category;
        }
    }
    if patch.tags.is_none() && !scan.tags.is_empty() {
        meta.tags = scan.tags;
    }

    meta
}

/// Splits off and parses the leading `---` frontmatter block.
///
/// Returns the parsed patch and the remaining content, or `None` when there
/// is no frontmatter, it cannot be parsed even after repair, or it parses to
/// something other than a mapping.
fn parse_frontmatter(content: &str) -> Option<(FrontmatterPatch, &str)> {
    if !content.starts_with("---") {
        return None;
    }
    let mut parts = content.splitn(3, "---");
    let _leading = parts.next();
    let frontmatter = parts.next()?;
    let body = parts.next()?;

    let value = match serde_yaml::from_str::<Value>(frontmatter) {
        Ok(value) => value,
        Err(err) => {
            warn!("frontmatter parse failed, retrying with repaired lines: {err}");
            let repaired = repair_frontmatter(frontmatter);
            match serde_yaml::from_str::<Value>(&repaired) {
                Ok(value) => value,
                Err(err) => {
                    warn!("frontmatter repair failed, using heuristic extraction: {err}");
                    return None;
                }
            }
        }
    };

    let Value::Mapping(map) = value else {
        return None;
    };

    let patch = FrontmatterPatch {
        name: lookup(&map, "name").and_then(scalar_string),
        description: lookup(&map, "description").and_then(scalar_string),
        category: lookup(&map, "category").and_then(scalar_string),
        tags: lookup(&map, "tags").and_then(tag_list),
    };
    Some((patch, body))
}

/// Rewrites `key: value` lines so two common authoring mistakes parse:
/// flow sequences whose items contain nested brackets (`[ray[train], torch]`)
/// get those items quoted, and unquoted values containing a colon get wrapped
/// in double quotes. Comment lines pass through untouched.
fn repair_frontmatter(frontmatter: &str) -> String {
    let mut fixed = Vec::new();
    for line in frontmatter.lines() {
        if line.contains(':') && !line.trim_start().starts_with('#') {
            let (key, raw) = line.split_once(':').unwrap_or((line, ""));
            let mut value = raw.trim().to_string();
            if value.starts_with('[') && value.ends_with(']') {
                let items = split_flow_items(&value[1..value.len() - 1]);
                if items.iter().any(|item| item.contains('[')) {
                    let quoted: Vec<String> = items
                        .into_iter()
                        .map(|item| {
                            if item.contains('[')
                                && !item.starts_with('"')
                                && !item.starts_with('\'')
                            {
                                format!("\"{item}\"")
                            } else {
                                item
                            }
                        })
                        .collect();
                    value = format!("[{}]", quoted.join(", "));
                }
            } else if value.contains(':') && !value.starts_with('"') && !value.starts_with('\'') {
                value = format!("\"{value}\"");
            }
            fixed.push(format!("{key}: {value}"));
        } else {
            fixed.push(line.to_string());
        }
    }
    fixed.join("\n")
}

/// Splits the inside of a flow sequence on top-level commas only, tracking
/// bracket depth so `ray[train]` stays one item. Interior empty items are
/// kept; a trailing empty item is dropped.
fn split_flow_items(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

fn lookup<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.iter().find(|(k, _)| k.as_str() == Some(key)).map(|(_, v)| v)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Frontmatter `tags` accepts a sequence of scalars or a comma-separated
/// string; anything else counts as not provided.
fn tag_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::String(s) => Some(s.split(',').map(|t| t.trim().to_string()).collect()),
        _ => None,
    }
}

/// Everything the heuristics need, gathered in one forward pass over the
/// text. Marker matching is not scoped to any section, so markers inside
/// code fences match too.
struct TextScan {
    first_header: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    lines: Vec<String>,
}

fn scan_text(content: &str) -> TextScan {
    let mut scan = TextScan {
        first_header: None,
        category: None,
        tags: Vec::new(),
        lines: Vec::new(),
    };
    for raw in content.lines() {
        let line = raw.trim();
        if scan.first_header.is_none() {
            if let Some(rest) = line.strip_prefix("# ") {
                scan.first_header = Some(rest.trim().to_string());
            }
        }
        let lower = line.to_lowercase();
        if scan.category.is_none()
            && (lower.contains("category:") || lower.contains("categories:"))
        {
            if let Some((_, value)) = raw.split_once(':') {
                scan.category = Some(value.to_string());
            }
        }
        if lower.contains("tags:") || lower.contains("tag:") {
            if let Some((_, value)) = raw.split_once(':') {
                for item in value.split(',') {
                    scan.tags.push(item.trim().trim_matches('*').trim().to_string());
                }
            }
        }
        scan.lines.push(line.to_string());
    }
    scan
}

/// Non-empty, non-header lines between the header matching `name` and the
/// next header, joined with single spaces.
fn heuristic_description(lines: &[String], name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let mut in_description = false;
    let mut collected: Vec<&str> = Vec::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix("# ") {
            if rest.trim() == name {
                in_description = true;
                continue;
            }
        }
        if line.starts_with('#') {
            if in_description {
                break;
            }
            continue;
        }
        if in_description && !line.is_empty() {
            collected.push(line);
        }
    }
    if collected.is_empty() {
        None
    } else {
        Some(collected.join(" ").trim().to_string())
    }
}

/// Cleans a raw category marker value: emphasis and quotes stripped, the
/// value truncated at the first `#`, `//` or `;`, non word/space/hyphen
/// characters removed, first letter capitalized. Returns `None` when
/// nothing survives.
fn clean_category(raw: &str) -> Option<String> {
    let value = raw.trim().trim_matches('*').trim();
    let value = value.trim_matches('"').trim_matches('\'').trim();
    let value = value.split('#').next().unwrap_or("").trim();
    let value = value.split("//").next().unwrap_or("").trim();
    let value = value.split(';').next().unwrap_or("").trim();

    let cleaned: String = value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let mut chars = cleaned.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
