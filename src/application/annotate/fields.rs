//! Field tracking across the diff lines of a structured item file.

use crate::application::config::ProjectConfig;

/// A parsed field declaration: the name and everything after the colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLine<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Tracks which field the diff walk is currently inside and how many front
/// matter fences have passed.
///
/// A field declaration is a line starting with neither a space nor a dash
/// that contains a colon. A line without a colon is a continuation of the
/// current field, never an error.
#[derive(Debug, Default)]
pub struct FieldTracker {
    current_field: String,
    normative: bool,
    table: bool,
    delimiters: usize,
}

impl FieldTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies one raw line, updating the tracked field on declarations.
    ///
    /// Multi-line field values keep the tracker on the declaring field since
    /// their continuation lines are indented.
    pub fn classify<'a>(
        &mut self,
        config: &ProjectConfig,
        line: &'a str,
    ) -> Option<FieldLine<'a>> {
        if line.starts_with(' ') || line.starts_with('-') {
            return None;
        }
        let (name, value) = line.split_once(':')?;
        if name != self.current_field {
            self.current_field = name.to_string();
            self.normative = !config.is_non_normative_field(name);
            self.table = config.is_table_field(name);
        }
        Some(FieldLine { name, value })
    }

    /// Records one front matter fence.
    pub fn count_delimiter(&mut self) {
        self.delimiters += 1;
    }

    pub fn current_field(&self) -> &str {
        &self.current_field
    }

    /// Whether the current field counts toward normative changes.
    pub fn is_normative(&self) -> bool {
        self.normative
    }

    /// Whether the current field merges removed values into a block.
    pub fn is_table(&self) -> bool {
        self.table
    }

    /// Exactly one fence has passed: the walk is inside the front matter.
    pub fn in_front_matter(&self) -> bool {
        self.delimiters == 1
    }

    /// Both fences have passed: the walk is in the document body.
    pub fn past_front_matter(&self) -> bool {
        self.delimiters >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_declaration_updates_state() {
        let config = ProjectConfig::default();
        let mut tracker = FieldTracker::new();

        let field = tracker.classify(&config, "text: |").unwrap();
        assert_eq!(field.name, "text");
        assert_eq!(field.value, " |");
        assert!(tracker.is_normative());
        assert!(!tracker.is_table());

        let field = tracker.classify(&config, "reviewed: abc123").unwrap();
        assert_eq!(field.name, "reviewed");
        assert!(!tracker.is_normative());

        let field = tracker.classify(&config, "typesize: 50").unwrap();
        assert_eq!(field.name, "typesize");
        assert_eq!(field.value, " 50");
        assert!(tracker.is_normative());
        assert!(tracker.is_table());
    }

    #[test]
    fn test_continuations_keep_current_field() {
        let config = ProjectConfig::default();
        let mut tracker = FieldTracker::new();

        tracker.classify(&config, "text: |").unwrap();
        assert!(tracker.classify(&config, "  The widget shall spin.").is_none());
        assert!(tracker.classify(&config, "- a list entry").is_none());
        assert_eq!(tracker.current_field(), "text");
        assert!(tracker.is_normative());
    }

    #[test]
    fn test_line_without_colon_is_continuation() {
        let config = ProjectConfig::default();
        let mut tracker = FieldTracker::new();
        tracker.classify(&config, "header: Spin rate").unwrap();
        assert!(tracker.classify(&config, "").is_none());
        assert!(tracker.classify(&config, "no separator here").is_none());
        assert_eq!(tracker.current_field(), "header");
    }

    #[test]
    fn test_value_splits_at_first_colon() {
        let config = ProjectConfig::default();
        let mut tracker = FieldTracker::new();
        let field = tracker.classify(&config, "ref: sig:check_spin").unwrap();
        assert_eq!(field.name, "ref");
        assert_eq!(field.value, " sig:check_spin");
    }

    #[test]
    fn test_delimiter_counting() {
        let mut tracker = FieldTracker::new();
        assert!(!tracker.in_front_matter());
        assert!(!tracker.past_front_matter());
        tracker.count_delimiter();
        assert!(tracker.in_front_matter());
        tracker.count_delimiter();
        assert!(!tracker.in_front_matter());
        assert!(tracker.past_front_matter());
    }
}
