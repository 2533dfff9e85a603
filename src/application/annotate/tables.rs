//! Merging of removed table-field values into one decorated block scalar.

use std::collections::HashMap;

use crate::application::annotate::markup::Markup;
use crate::application::annotate::{LineAction, LineKind, OutLine};

/// Collects the removed values of table fields and replays them as a single
/// block scalar when the same field reappears as an added or context line.
///
/// Rewriting the field as `name: |` keeps the reconstructed file valid YAML
/// while showing every superseded value next to the current one.
#[derive(Debug, Default)]
pub struct TableFieldMerger {
    removed_values: HashMap<String, Vec<String>>,
}

impl TableFieldMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one table-field declaration line.
    ///
    /// Returns `None` when nothing is buffered for the field and the line
    /// should continue down the pipeline untouched. A flush drains the
    /// field's buffer.
    pub fn observe(
        &mut self,
        kind: LineKind,
        name: &str,
        value: &str,
        markup: &Markup,
    ) -> Option<LineAction> {
        if kind == LineKind::Removed {
            self.removed_values
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
            return Some(LineAction::Suppress);
        }

        let buffered = self.removed_values.remove(name)?;
        if buffered.is_empty() {
            return None;
        }

        let mut lines = vec![OutLine::Text(format!("{name}: |"))];
        for removed in &buffered {
            lines.push(OutLine::Text(markup.removed_line(removed.trim())));
        }
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            if kind == LineKind::Added {
                lines.push(OutLine::Text(markup.added_line(trimmed)));
            } else {
                lines.push(OutLine::Text(format!("  {value}")));
            }
        }
        Some(LineAction::Emit(lines))
    }
}
