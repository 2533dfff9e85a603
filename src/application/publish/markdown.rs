//! Markdown line generators for the three document flavors.
//!
//! Each generator walks a document's items and yields the Markdown lines of
//! its section on the published page. Links are rendered as plain uids since
//! the whole comparison lands on a single page.

use serde_yaml::Value;

use crate::domain::document::{Document, Tree};
use crate::domain::item::{Item, ItemReference};

/// Marker prepended to the first cell of primary-key table rows.
pub const KEY_MARKER: &str = "&#128273; ";

/// Lines for a requirements document: one bullet per item, headings become
/// anchored bullets of their own.
pub fn requirements_lines(tree: &Tree, document: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for item in &document.items {
        let mut text_lines = owned_text_lines(item);
        if item.is_heading() {
            if let Some(header) = &item.header {
                text_lines.insert(0, header.clone());
            }
            let first = text_lines.first().cloned().unwrap_or_default();
            lines.push(String::new());
            lines.push(format!("- {first} {{#{} }}", item.uid));
            lines.extend(text_lines.into_iter().skip(1));
        } else {
            let first = text_lines.first().cloned().unwrap_or_default();
            let lead = match &item.header {
                Some(header) => format!("- {header} <small>{}</small>", item.uid),
                None => format!("- <small>[{}]</small>", item.uid),
            };
            lines.push(format!("{lead} {first}"));
            if !item.text.is_empty() {
                lines.extend(text_lines.into_iter().skip(1));
            }
            if let Some(path) = &item.item_ref {
                lines.push(String::new());
                lines.push(format_ref(path));
            }
            if !item.references.is_empty() {
                lines.push(String::new());
                lines.extend(format_references(&item.references));
            }
            if !item.links.is_empty() {
                lines.push(String::new());
                lines.push(format_label_links("Parent links:", &item.links));
            }
            let children = child_uids(tree, item);
            if !children.is_empty() {
                lines.push(String::new());
                lines.push(format_label_links("Child links:", &children));
            }
            lines.extend(attribute_table(document, item));
        }
    }
    lines
}

/// Lines for the overview document: headers become sub-headings and the
/// prose is passed through undecorated.
pub fn overview_lines(tree: &Tree, document: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for item in &document.items {
        if let Some(header) = &item.header {
            lines.push(String::new());
            lines.push(format!("##### {header}"));
            lines.push(String::new());
        }
        if !item.text.is_empty() {
            lines.extend(owned_text_lines(item));
        }
        if let Some(path) = &item.item_ref {
            lines.push(String::new());
            lines.push(format_ref(path));
        }
        if !item.references.is_empty() {
            lines.push(String::new());
            lines.extend(format_references(&item.references));
        }
        if !item.links.is_empty() {
            lines.push(String::new());
            lines.push(format_label_links("Parent links:", &item.links));
        }
        let children = child_uids(tree, item);
        if !children.is_empty() {
            lines.push(String::new());
            lines.push(format_label_links("Child links:", &children));
        }
        lines.extend(attribute_table(document, item));
    }
    lines
}

/// Lines for a tables document: headings open a Markdown table whose columns
/// come from the document's publish list, every other item becomes one row.
pub fn table_lines(tree: &Tree, document: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for item in &document.items {
        let mut text_lines = owned_text_lines(item);
        if item.is_heading() {
            if let Some(header) = &item.header {
                text_lines.insert(0, header.clone());
            }
            let first = text_lines.first().cloned().unwrap_or_default();
            let mut columns = vec!["Column".to_string()];
            columns.extend(document.publish().iter().cloned());
            columns.push("Notes".to_string());
            lines.push(String::new());
            lines.push(format!("### {} {first}", format_level(&item.level)));
            lines.push(String::new());
            lines.push(format!("|{}|", columns.join("|")));
            lines.push(format!("|{}", " ---- |".repeat(columns.len())));
        } else {
            let key = item.attribute("primarykey").and_then(Value::as_bool) == Some(true);
            let marker = if key { KEY_MARKER } else { "" };
            let first = text_lines.first().cloned().unwrap_or_default();
            let mut columns =
                vec![format!("{marker}{first} <small>[{}]</small>", item.uid)];
            for attr in document.publish() {
                columns.push(item.attribute(attr).map(value_to_string).unwrap_or_default());
            }

            // Everything beyond the first text line lands in the Notes cell.
            let mut notes: Vec<String> = text_lines.split_off(1.min(text_lines.len()));
            if let Some(path) = &item.item_ref {
                notes.push(format_ref(path));
            }
            notes.extend(format_references(&item.references));
            if !item.links.is_empty() {
                notes.push(format_label_links("Parent links:", &item.links));
            }
            let children = child_uids(tree, item);
            if !children.is_empty() {
                notes.push(format_label_links("Child links:", &children));
            }
            columns.push(notes.join("<br />"));
            lines.push(format!("|{}|", columns.join("|")));
        }
    }
    lines
}

fn owned_text_lines(item: &Item) -> Vec<String> {
    item.text_lines().iter().map(|line| line.to_string()).collect()
}

fn child_uids(tree: &Tree, item: &Item) -> Vec<String> {
    tree.child_items(&item.uid)
        .iter()
        .map(|child| child.uid.clone())
        .collect()
}

/// Attribute table appended to an item when the document's publish list
/// names attributes the item actually carries.
fn attribute_table(document: &Document, item: &Item) -> Vec<String> {
    let mut rows = Vec::new();
    let mut header_printed = false;
    for attr in document.publish() {
        let Some(value) = item.attribute(attr) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if !header_printed {
            header_printed = true;
            rows.push(String::new());
            rows.push("| Attribute | Value |".to_string());
            rows.push("| --------- | ----- |".to_string());
        }
        rows.push(format!("| {attr} | {} |", value_to_string(value)));
    }
    if header_printed {
        rows.push(String::new());
    }
    rows
}

/// Keeps the trailing zero on top levels and trims it everywhere else, so
/// `1.0` stays `1.0` while `1.2.0` prints as `1.2`.
pub fn format_level(level: &str) -> String {
    if level.ends_with(".0") && level.len() > 3 {
        level[..level.len() - 2].to_string()
    } else {
        level.to_string()
    }
}

fn format_ref(path: &str) -> String {
    format!("> `{}`", path.replace('\\', "/"))
}

fn format_references(references: &[ItemReference]) -> Vec<String> {
    references
        .iter()
        .map(|reference| format_ref(&reference.path))
        .collect()
}

fn format_label_links(label: &str, uids: &[String]) -> String {
    format!("*{label} {}*", uids.join(", "))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_default(),
    }
}
