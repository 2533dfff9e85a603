//! Project-level configuration shared by the annotation and publishing passes.

use std::collections::HashSet;

use crate::application::annotate::markup::Markup;

/// Configuration for one annotation and publishing run.
///
/// Field classifications, document tags and decoration markup are data here
/// so a differently-shaped repository can be processed without code changes.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Fields whose changes never make an item change normative.
    pub non_normative_fields: HashSet<String>,
    /// Fields whose removed values are merged into a single block scalar.
    pub table_fields: HashSet<String>,
    /// Tag of the overview document; its files are staged undecorated.
    pub overview_document: String,
    /// Tag of the requirements document.
    pub requirements_document: String,
    /// Tag of the tables document.
    pub tables_document: String,
    /// Decoration markup for changed lines and blocks.
    pub markup: Markup,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            non_normative_fields: [
                "active", "derived", "header", "level", "normative", "reviewed",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            table_fields: ["primarykey", "typesize", "valuelist"]
                .into_iter()
                .map(String::from)
                .collect(),
            overview_document: "OVR".to_string(),
            requirements_document: "REQ".to_string(),
            tables_document: "TAB".to_string(),
            markup: Markup::default(),
        }
    }
}

impl ProjectConfig {
    pub fn is_non_normative_field(&self, field: &str) -> bool {
        self.non_normative_fields.contains(field)
    }

    pub fn is_table_field(&self, field: &str) -> bool {
        self.table_fields.contains(field)
    }
}
