//! Requirement item model.
//!
//! Items are the unit of content in a requirements repository: one file per
//! item, either a YAML mapping or a Markdown file with YAML front matter.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::domain::error::ItemError;

/// Reserved field holding an item's normative body text.
pub const TEXT_FIELD: &str = "text";

lazy_static! {
    static ref FRONT_MATTER_FENCE: Regex =
        Regex::new(r"^-{3,}\s*$").expect("front matter fence regex");
}

/// Returns true when `line` is a front matter boundary fence
/// (three or more dashes, optionally followed by whitespace).
pub fn is_front_matter_fence(line: &str) -> bool {
    FRONT_MATTER_FENCE.is_match(line)
}

/// On-disk format of a requirement item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFormat {
    Yaml,
    Markdown,
}

impl ItemFormat {
    /// Resolves the item format from a file path's extension.
    ///
    /// The repository only carries `.yml`/`.yaml` and `.md` items, so any
    /// other extension is an input-shape error naming the offending path.
    pub fn from_path(path: &str) -> Result<Self, ItemError> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yml" | "yaml" => Ok(ItemFormat::Yaml),
            "md" => Ok(ItemFormat::Markdown),
            _ => Err(ItemError::UnknownExtension {
                path: path.to_string(),
                ext,
            }),
        }
    }
}

impl fmt::Display for ItemFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemFormat::Yaml => write!(f, "yaml"),
            ItemFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// A reference from an item to an external artifact in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReference {
    pub ref_type: Option<String>,
    pub path: String,
}

/// A single requirement item.
///
/// The typed fields mirror the structural attributes every item carries.
/// Anything else stays in `attributes` and is only consulted when a
/// document's publish list names it.
#[derive(Debug, Clone)]
pub struct Item {
    pub uid: String,
    pub level: String,
    pub active: bool,
    pub derived: bool,
    pub normative: bool,
    pub header: Option<String>,
    pub text: String,
    pub links: Vec<String>,
    pub item_ref: Option<String>,
    pub references: Vec<ItemReference>,
    pub attributes: BTreeMap<String, Value>,
}

impl Item {
    fn new(uid: &str) -> Self {
        Item {
            uid: uid.to_string(),
            level: "1.0".to_string(),
            active: true,
            derived: false,
            normative: true,
            header: None,
            text: String::new(),
            links: Vec::new(),
            item_ref: None,
            references: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Loads an item from file contents in the given format.
    pub fn load(uid: &str, format: ItemFormat, contents: &str) -> Result<Self, ItemError> {
        match format {
            ItemFormat::Yaml => Self::load_yaml(uid, contents),
            ItemFormat::Markdown => Self::load_markdown(uid, contents),
        }
    }

    /// Loads an item from a YAML mapping.
    pub fn load_yaml(uid: &str, contents: &str) -> Result<Self, ItemError> {
        let data: Value = serde_yaml::from_str(contents)?;
        let mapping = data.as_mapping().ok_or(ItemError::NotAMapping)?;
        Ok(Self::from_mapping(uid, mapping))
    }

    /// Loads an item from Markdown with YAML front matter.
    ///
    /// Content without a leading front matter fence is treated as having no
    /// attributes; an opening fence without a closing fence is an error.
    pub fn load_markdown(uid: &str, contents: &str) -> Result<Self, ItemError> {
        let (front_matter, body) = split_front_matter(contents)?;
        let mut item = match front_matter {
            Some(fm) if !fm.trim().is_empty() => {
                let data: Value = serde_yaml::from_str(&fm)?;
                let mapping = data.as_mapping().ok_or(ItemError::NotAMapping)?;
                Self::from_mapping(uid, mapping)
            }
            _ => Self::new(uid),
        };
        let (header, text) = split_markdown_header(&body);
        if item.header.is_none() {
            item.header = header;
        }
        item.text = text;
        Ok(item)
    }

    fn from_mapping(uid: &str, mapping: &Mapping) -> Self {
        let mut item = Item::new(uid);
        for (key, value) in mapping {
            let Some(key) = key.as_str() else { continue };
            match key {
                "level" => item.level = level_string(value),
                "active" => item.active = value.as_bool().unwrap_or(true),
                "derived" => item.derived = value.as_bool().unwrap_or(false),
                "normative" => item.normative = value.as_bool().unwrap_or(true),
                "header" => {
                    item.header = value
                        .as_str()
                        .map(str::trim)
                        .filter(|h| !h.is_empty())
                        .map(String::from);
                }
                TEXT_FIELD => item.text = value.as_str().unwrap_or_default().to_string(),
                "links" => item.links = link_uids(value),
                "ref" => {
                    item.item_ref = value.as_str().filter(|r| !r.is_empty()).map(String::from);
                }
                "references" => item.references = reference_list(value),
                _ => {
                    item.attributes.insert(key.to_string(), value.clone());
                }
            }
        }
        item
    }

    /// Heading items carry a zero-terminated level and no normative text.
    pub fn is_heading(&self) -> bool {
        self.level.ends_with(".0") && !self.normative
    }

    /// Lines of the item text, used when publishing.
    pub fn text_lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }

    /// Looks up a custom attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Splits contents into an optional front matter block and the body.
///
/// The front matter must open on the first non-blank line.
pub fn split_front_matter(contents: &str) -> Result<(Option<String>, String), ItemError> {
    let lines: Vec<&str> = contents.lines().collect();
    let mut start = 0;
    while start < lines.len() && lines[start].trim().is_empty() {
        start += 1;
    }
    if start >= lines.len() || !is_front_matter_fence(lines[start]) {
        return Ok((None, contents.to_string()));
    }
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if is_front_matter_fence(line) {
            let end = start + 1 + offset;
            let front = lines[start + 1..end].join("\n");
            let body = lines[end + 1..].join("\n");
            return Ok((Some(front), body));
        }
    }
    Err(ItemError::UnterminatedFrontMatter)
}

/// Extracts a leading `# ` heading from a Markdown body.
fn split_markdown_header(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim_start_matches('\n');
    let mut lines = trimmed.lines();
    match lines.next() {
        Some(first) if first.starts_with("# ") => {
            let header = first.trim_start_matches('#').trim().to_string();
            let rest = lines.collect::<Vec<_>>().join("\n");
            (
                Some(header).filter(|h| !h.is_empty()),
                rest.trim_start_matches('\n').to_string(),
            )
        }
        _ => (None, trimmed.to_string()),
    }
}

fn level_string(value: &Value) -> String {
    match value {
        Value::String(level) => level.clone(),
        // YAML turns `2.0` into a float, which would otherwise print as `2`
        // and lose the trailing zero that marks a heading level.
        Value::Number(level) => {
            if let Some(int) = level.as_i64() {
                int.to_string()
            } else if let Some(float) = level.as_f64() {
                if float.fract() == 0.0 {
                    format!("{float:.1}")
                } else {
                    float.to_string()
                }
            } else {
                level.to_string()
            }
        }
        _ => "1.0".to_string(),
    }
}

/// Numeric sort key for a dotted level such as `1.2.10`.
pub fn level_key(level: &str) -> Vec<u64> {
    level
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}

fn link_uids(value: &Value) -> Vec<String> {
    let Some(entries) = value.as_sequence() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(uid) => Some(uid.clone()),
            // Stamped links are single-entry mappings of uid to review stamp.
            Value::Mapping(stamped) => stamped
                .iter()
                .next()
                .and_then(|(uid, _)| uid.as_str().map(String::from)),
            _ => None,
        })
        .collect()
}

fn reference_list(value: &Value) -> Vec<ItemReference> {
    let Some(entries) = value.as_sequence() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_mapping()?;
            let path = entry.get("path")?.as_str()?.to_string();
            let ref_type = entry.get("type").and_then(Value::as_str).map(String::from);
            Some(ItemReference { ref_type, path })
        })
        .collect()
}
