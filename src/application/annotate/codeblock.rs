//! Fenced code block handling in the body of an item.

use lazy_static::lazy_static;
use regex::Regex;

use crate::application::annotate::markup::Markup;
use crate::application::annotate::{LineAction, LineKind, OutLine};

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new("```").expect("code fence regex");
    static ref CODE_FENCE_ONE_LINE: Regex =
        Regex::new("```.*```").expect("one line code fence regex");
}

/// Returns true when the line opens or closes a fenced code block.
pub fn is_fence(line: &str) -> bool {
    CODE_FENCE.is_match(line)
}

/// Returns true when the line holds a complete one-line fenced block.
/// Checked before [`is_fence`], which also matches these lines.
pub fn is_one_line_fence(line: &str) -> bool {
    CODE_FENCE_ONE_LINE.is_match(line)
}

enum SpliceMode {
    Passthrough,
    Wrapped,
}

/// Buffers the contents of multi-line fenced blocks during the diff walk and
/// splices them back over their fence placeholders afterwards.
///
/// Context lines land in both buffers so each side of a changed block reads
/// as a complete listing.
#[derive(Debug, Default)]
pub struct CodeBlockTracker {
    in_block: bool,
    removed: Vec<Vec<String>>,
    added: Vec<Vec<String>>,
    changed: Vec<bool>,
}

impl CodeBlockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_block(&self) -> bool {
        self.in_block
    }

    /// Handles a fence line, emitting a placeholder for the splice pass.
    pub fn on_fence(&mut self, raw: &str) -> LineAction {
        if self.in_block {
            self.in_block = false;
        } else {
            self.in_block = true;
            self.removed.push(Vec::new());
            self.added.push(Vec::new());
            self.changed.push(false);
        }
        LineAction::Emit(vec![OutLine::Fence(raw.to_string())])
    }

    /// Buffers one line of the current block.
    pub fn buffer(&mut self, kind: LineKind, value: &str) -> LineAction {
        let (Some(removed), Some(added), Some(changed)) = (
            self.removed.last_mut(),
            self.added.last_mut(),
            self.changed.last_mut(),
        ) else {
            return LineAction::Buffered;
        };
        match kind {
            LineKind::Context => {
                removed.push(value.to_string());
                added.push(value.to_string());
            }
            LineKind::Removed => {
                removed.push(value.to_string());
                *changed = true;
            }
            LineKind::Added => {
                added.push(value.to_string());
                *changed = true;
            }
        }
        LineAction::Buffered
    }

    /// Replays the annotated lines, replacing fence placeholders with the
    /// buffered block contents.
    ///
    /// Unchanged blocks pass through exactly as they appeared. A changed
    /// block is re-emitted as a removed section and an added section, each a
    /// complete fenced block inside a decorated wrapper; a side with no
    /// lines is omitted.
    pub fn splice(&self, annotated: Vec<OutLine>, markup: &Markup) -> Vec<String> {
        let mut out = Vec::with_capacity(annotated.len());
        let mut ordinal = 0;
        let mut open: Option<SpliceMode> = None;
        for line in annotated {
            let raw = match line {
                OutLine::Text(text) => {
                    out.push(text);
                    continue;
                }
                OutLine::Fence(raw) => raw,
            };
            match open.take() {
                Some(SpliceMode::Passthrough) => out.push(raw),
                Some(SpliceMode::Wrapped) => {}
                None => {
                    let removed = self
                        .removed
                        .get(ordinal)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let added = self
                        .added
                        .get(ordinal)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let changed = self.changed.get(ordinal).copied().unwrap_or(true);
                    if !changed && !removed.is_empty() {
                        out.push(raw);
                        out.extend(removed.iter().cloned());
                        open = Some(SpliceMode::Passthrough);
                    } else {
                        if !removed.is_empty() {
                            out.push(markup.removed_block_start.clone());
                            out.push(raw.clone());
                            out.extend(removed.iter().cloned());
                            out.push(markup.fence_close.clone());
                            out.push(markup.block_end.clone());
                        }
                        if !added.is_empty() {
                            out.push(markup.added_block_start.clone());
                            out.push(raw);
                            out.extend(added.iter().cloned());
                            out.push(markup.fence_close.clone());
                            out.push(markup.block_end.clone());
                        }
                        open = Some(SpliceMode::Wrapped);
                    }
                    ordinal += 1;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_detection() {
        assert!(is_fence("  ```"));
        assert!(is_fence("  ```yaml"));
        assert!(!is_fence("  plain text"));
        assert!(is_one_line_fence("  ```let x = 1;```"));
        assert!(!is_one_line_fence("  ```yaml"));
    }

    #[test]
    fn test_changed_block_emits_both_sections() {
        let markup = Markup::default();
        let mut tracker = CodeBlockTracker::new();
        let mut annotated = Vec::new();

        if let LineAction::Emit(lines) = tracker.on_fence("  ```yaml") {
            annotated.extend(lines);
        }
        tracker.buffer(LineKind::Context, "  shared: line");
        tracker.buffer(LineKind::Removed, "  old: value");
        tracker.buffer(LineKind::Added, "  new: value");
        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }

        let out = tracker.splice(annotated, &markup);
        assert_eq!(
            out,
            vec![
                "  <div style=\"border-left: 5px solid red\">".to_string(),
                "  ```yaml".to_string(),
                "  shared: line".to_string(),
                "  old: value".to_string(),
                "  ```".to_string(),
                "  </div>".to_string(),
                "  <div style=\"border-left: 5px solid blue\">".to_string(),
                "  ```yaml".to_string(),
                "  shared: line".to_string(),
                "  new: value".to_string(),
                "  ```".to_string(),
                "  </div>".to_string(),
            ]
        );
    }

    #[test]
    fn test_unchanged_block_passes_through() {
        let markup = Markup::default();
        let mut tracker = CodeBlockTracker::new();
        let mut annotated = vec![OutLine::Text("text: |".to_string())];

        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }
        tracker.buffer(LineKind::Context, "  untouched");
        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }

        let out = tracker.splice(annotated, &markup);
        assert_eq!(
            out,
            vec![
                "text: |".to_string(),
                "  ```".to_string(),
                "  untouched".to_string(),
                "  ```".to_string(),
            ]
        );
    }

    #[test]
    fn test_added_only_block_emits_single_section() {
        let markup = Markup::default();
        let mut tracker = CodeBlockTracker::new();
        let mut annotated = Vec::new();

        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }
        tracker.buffer(LineKind::Added, "  brand_new");
        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }

        let out = tracker.splice(annotated, &markup);
        assert_eq!(
            out,
            vec![
                "  <div style=\"border-left: 5px solid blue\">".to_string(),
                "  ```".to_string(),
                "  brand_new".to_string(),
                "  ```".to_string(),
                "  </div>".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_block_disappears() {
        let markup = Markup::default();
        let mut tracker = CodeBlockTracker::new();
        let mut annotated = Vec::new();

        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }
        if let LineAction::Emit(lines) = tracker.on_fence("  ```") {
            annotated.extend(lines);
        }

        assert!(tracker.splice(annotated, &markup).is_empty());
    }

    #[test]
    fn test_splice_ignores_fenced_text_lines() {
        let markup = Markup::default();
        let tracker = CodeBlockTracker::new();
        let annotated = vec![OutLine::Text("  ```one liner```".to_string())];
        assert_eq!(
            tracker.splice(annotated, &markup),
            vec!["  ```one liner```".to_string()]
        );
    }
}
