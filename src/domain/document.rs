//! Document and tree model.
//!
//! A document is one directory of requirement items sharing a uid prefix,
//! configured by a `.reqdelta.yml` file. Documents staged for publishing are
//! assembled into a [`Tree`] so generators can resolve links across them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, ItemFormat, level_key};

/// Per-directory document configuration file name.
pub const CONFIG_FILE: &str = ".reqdelta.yml";

/// Contents of a document's `.reqdelta.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub settings: DocumentSettings,
    #[serde(default)]
    pub attributes: DocumentAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Prefix shared by all item uids in the document.
    #[serde(default)]
    pub prefix: String,
    /// Prefix of the parent document, when the document has one.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub digits: Option<u32>,
    #[serde(default)]
    pub sep: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentAttributes {
    /// Custom attributes published alongside item text.
    #[serde(default)]
    pub publish: Vec<String>,
}

/// One directory of items sharing a uid prefix.
#[derive(Debug, Clone)]
pub struct Document {
    /// Directory holding the document, relative to the tree root.
    pub rel_path: String,
    pub config: DocumentConfig,
    /// Items sorted by level.
    pub items: Vec<Item>,
}

impl Document {
    /// Loads a document from a staged directory.
    ///
    /// Files without a recognized item extension are skipped with a warning.
    pub fn load(dir: &Path, rel_path: &str) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        let config_text = fs::read_to_string(&config_path)
            .with_context(|| format!("read document config {}", config_path.display()))?;
        let config: DocumentConfig = serde_yaml::from_str(&config_text)
            .with_context(|| format!("parse document config {}", config_path.display()))?;

        let mut names: Vec<String> = Vec::new();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("list document directory {}", dir.display()))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("list document directory {}", dir.display()))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("inspect {}", entry.path().display()))?;
            if file_type.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        let mut items = Vec::new();
        for name in names {
            if name == CONFIG_FILE {
                continue;
            }
            let Ok(format) = ItemFormat::from_path(&name) else {
                warn!("skipping non-item file {} in {}", name, dir.display());
                continue;
            };
            let path = dir.join(&name);
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read item {}", path.display()))?;
            let uid = Path::new(&name)
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let item = Item::load(&uid, format, &contents)
                .with_context(|| format!("load item {}", path.display()))?;
            items.push(item);
        }
        items.sort_by(|a, b| {
            level_key(&a.level)
                .cmp(&level_key(&b.level))
                .then_with(|| a.uid.cmp(&b.uid))
        });

        Ok(Document {
            rel_path: rel_path.to_string(),
            config,
            items,
        })
    }

    /// The document's uid prefix.
    pub fn prefix(&self) -> &str {
        &self.config.settings.prefix
    }

    /// Custom attributes the document publishes.
    pub fn publish(&self) -> &[String] {
        &self.config.attributes.publish
    }
}

/// The set of documents assembled from staged directories.
#[derive(Debug, Default)]
pub struct Tree {
    pub documents: Vec<Document>,
}

impl Tree {
    /// Loads every document directory in `doc_paths`, keeping their order.
    ///
    /// An empty relative path addresses a document at the tree root itself.
    pub fn load(root: &Path, doc_paths: &[String]) -> Result<Self> {
        let mut documents = Vec::new();
        for rel_path in doc_paths {
            let dir = if rel_path.is_empty() {
                root.to_path_buf()
            } else {
                root.join(rel_path)
            };
            documents.push(Document::load(&dir, rel_path)?);
        }
        Ok(Tree { documents })
    }

    pub fn find_document(&self, prefix: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.prefix() == prefix)
    }

    pub fn find_item(&self, uid: &str) -> Option<&Item> {
        self.documents
            .iter()
            .flat_map(|doc| doc.items.iter())
            .find(|item| item.uid == uid)
    }

    /// Items anywhere in the tree that link to `uid`.
    pub fn child_items(&self, uid: &str) -> Vec<&Item> {
        self.documents
            .iter()
            .flat_map(|doc| doc.items.iter())
            .filter(|item| item.links.iter().any(|link| link == uid))
            .collect()
    }
}
