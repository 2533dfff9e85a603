//! Decoration markup for annotated requirement files.

/// HTML decorations wrapped around changed lines and blocks.
///
/// The rendered strings are written verbatim into staged item files, so the
/// exact spelling (leading indentation included) is part of the on-disk
/// format consumed by the downstream renderer.
#[derive(Debug, Clone)]
pub struct Markup {
    pub removed_open: String,
    pub removed_close: String,
    pub added_open: String,
    pub added_close: String,
    pub removed_block_start: String,
    pub added_block_start: String,
    pub block_end: String,
    /// Closing fence appended when a code block is re-emitted inside a
    /// decorated block section.
    pub fence_close: String,
}

impl Default for Markup {
    fn default() -> Self {
        Markup {
            removed_open: "  <span style=\"color:red\"><del>".to_string(),
            removed_close: "</del></span>".to_string(),
            added_open: "  <span style=\"color:blue\">".to_string(),
            added_close: "</span>".to_string(),
            removed_block_start: "  <div style=\"border-left: 5px solid red\">".to_string(),
            added_block_start: "  <div style=\"border-left: 5px solid blue\">".to_string(),
            block_end: "  </div>".to_string(),
            fence_close: "  ```".to_string(),
        }
    }
}

impl Markup {
    /// Renders one removed line.
    pub fn removed_line(&self, text: &str) -> String {
        format!("{}{}{}", self.removed_open, text, self.removed_close)
    }

    /// Renders one added line.
    pub fn added_line(&self, text: &str) -> String {
        format!("{}{}{}", self.added_open, text, self.added_close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_line_markup() {
        let markup = Markup::default();
        assert_eq!(
            markup.removed_line("The widget shall spin."),
            "  <span style=\"color:red\"><del>The widget shall spin.</del></span>"
        );
    }

    #[test]
    fn test_added_line_markup() {
        let markup = Markup::default();
        assert_eq!(
            markup.added_line("The widget shall rotate."),
            "  <span style=\"color:blue\">The widget shall rotate.</span>"
        );
    }
}
