//! Single-page publishing of a staged comparison tree.
//!
//! Every document renders into one HTML section. The overview, requirements
//! and tables documents come first in that order, any remaining documents
//! follow in tree order and fall back to the requirements layout.

pub mod markdown;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use handlebars::Handlebars;
use log::{error, warn};
use once_cell::sync::Lazy;
use pulldown_cmark::{Options, Parser, html};
use serde_json::json;

use crate::application::config::ProjectConfig;
use crate::domain::document::{Document, Tree};
use markdown::{overview_lines, requirements_lines, table_lines};

const PAGE_TEMPLATE: &str = include_str!("page.hbs");

static MARKDOWN_OPTIONS: Lazy<Options> = Lazy::new(|| {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
});

/// Renders the whole tree into `<public_dir>/index.html`, titled after the
/// project branch.
pub fn publish_project(
    config: &ProjectConfig,
    tree: &Tree,
    project_branch: &str,
    public_dir: &Path,
) -> Result<()> {
    let special = [
        config.overview_document.as_str(),
        config.requirements_document.as_str(),
        config.tables_document.as_str(),
    ];

    let mut body = String::new();
    for prefix in special {
        match tree.find_document(prefix) {
            Some(document) => body.push_str(&document_section(config, tree, document)),
            None => warn!("no {prefix} document in the comparison"),
        }
    }
    for document in &tree.documents {
        if special.contains(&document.prefix()) {
            continue;
        }
        body.push_str(&document_section(config, tree, document));
    }

    let page = render_page(project_branch, &body)?;
    let index_path = public_dir.join("index.html");
    fs::write(&index_path, page)
        .with_context(|| format!("write published page {}", index_path.display()))?;
    Ok(())
}

/// One document's HTML section, empty when the document has no items worth
/// showing.
fn document_section(config: &ProjectConfig, tree: &Tree, document: &Document) -> String {
    let prefix = document.prefix();
    let (heading, lines) = if prefix == config.overview_document {
        ("### Overview", overview_lines(tree, document))
    } else if prefix == config.tables_document {
        ("### Table Changes", table_lines(tree, document))
    } else {
        if prefix != config.requirements_document {
            error!(
                "unknown document type: {prefix} (options: {}, {}, {})",
                config.overview_document, config.requirements_document, config.tables_document
            );
        }
        ("### Requirements Changes", requirements_lines(tree, document))
    };

    let text = lines.join("\n");
    if text.is_empty() {
        return String::new();
    }
    markdown_to_html(&format!("{heading}\n{text}"))
}

fn render_page(title: &str, body: &str) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
        .render_template(PAGE_TEMPLATE, &json!({ "title": title, "body": body }))
        .map_err(|e| anyhow!("rendering page template failed: {e}"))
}

/// Converts a Markdown section to HTML.
fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, *MARKDOWN_OPTIONS);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::domain::document::DocumentConfig;
    use crate::domain::item::Item;

    fn document(prefix: &str, items: Vec<Item>) -> Document {
        let mut config = DocumentConfig::default();
        config.settings.prefix = prefix.to_string();
        Document {
            rel_path: prefix.to_lowercase(),
            config,
            items,
        }
    }

    fn item(uid: &str, contents: &str) -> Item {
        Item::load_yaml(uid, contents).unwrap()
    }

    #[test]
    fn test_markdown_to_html_renders_tables() {
        let html = markdown_to_html("| A | B |\n| --- | --- |\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_document_section_keeps_decoration_spans() {
        let config = ProjectConfig::default();
        let tree = Tree {
            documents: vec![document(
                "REQ",
                vec![item(
                    "REQ001",
                    "level: 1.1\ntext: |\n  <span style=\"color:blue\">The widget shall rotate.</span>\n",
                )],
            )],
        };
        let section = document_section(&config, &tree, &tree.documents[0]);
        assert!(section.contains("Requirements Changes"));
        assert!(section.contains("<span style=\"color:blue\">The widget shall rotate.</span>"));
    }

    #[test]
    fn test_document_section_empty_for_empty_document() {
        let config = ProjectConfig::default();
        let tree = Tree {
            documents: vec![document("REQ", Vec::new())],
        };
        assert_eq!(document_section(&config, &tree, &tree.documents[0]), "");
    }

    #[test]
    fn test_publish_project_writes_index_page() {
        let dir = tempdir().unwrap();
        let config = ProjectConfig::default();
        let tree = Tree {
            documents: vec![
                document(
                    "OVR",
                    vec![item(
                        "OVR001",
                        "level: 1.1\nheader: Widget project\ntext: |\n  Makes widgets rotate.\n",
                    )],
                ),
                document(
                    "REQ",
                    vec![item(
                        "REQ001",
                        "level: 1.1\ntext: |\n  The widget shall rotate.\n",
                    )],
                ),
            ],
        };

        publish_project(&config, &tree, "project/widget", dir.path()).unwrap();
        let page = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(page.contains("<title>project/widget</title>"));
        assert!(page.contains("Widget project"));
        // The overview section comes before the requirements section.
        let overview = page.find("Overview").unwrap();
        let requirements = page.find("Requirements Changes").unwrap();
        assert!(overview < requirements);
    }
}
