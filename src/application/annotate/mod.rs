//! Annotation engine: rebuilds a decorated copy of each patched item file
//! from its unified diff.
//!
//! The walk is a single pass over the diff lines of one file. Front matter
//! fences and field declarations update the trackers, table fields merge
//! through the [`tables::TableFieldMerger`], body lines are decorated, and
//! fenced code blocks are buffered for the [`codeblock::CodeBlockTracker`]
//! to splice back over their placeholders at the end.

pub mod codeblock;
pub mod fields;
pub mod markup;
pub mod tables;


use unidiff::PatchedFile;

use crate::application::config::ProjectConfig;
use crate::domain::item::{ItemFormat, TEXT_FIELD, is_front_matter_fence};

use self::codeblock::CodeBlockTracker;
use self::fields::FieldTracker;
use self::tables::TableFieldMerger;

/// Change tag of one diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Added,
    Removed,
    Context,
}

impl LineKind {
    fn of(line: &unidiff::Line) -> Self {
        if line.is_added() {
            LineKind::Added
        } else if line.is_removed() {
            LineKind::Removed
        } else {
            LineKind::Context
        }
    }
}

/// One reconstructed output line.
///
/// Fence placeholders keep the splice pass from confusing re-emitted fences
/// with ordinary output text that happens to contain backticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutLine {
    Text(String),
    Fence(String),
}

/// What the pipeline decided to do with one diff line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// The line leaves no trace in the output.
    Suppress,
    /// The line is replaced by these output lines.
    Emit(Vec<OutLine>),
    /// The line was captured by the code block tracker.
    Buffered,
}

/// Result of annotating one patched file.
#[derive(Debug, Clone)]
pub struct AnnotatedFile {
    /// Reconstructed lines, without terminators.
    pub lines: Vec<String>,
    /// Whether a normative field or body line changed.
    pub normative_change: bool,
}

/// Rebuilds one patched file with change decorations.
pub struct FileAnnotator<'a> {
    config: &'a ProjectConfig,
    format: ItemFormat,
    decorate: bool,
    whole_file_deleted: bool,
    fields: FieldTracker,
    tables: TableFieldMerger,
    code: CodeBlockTracker,
    normative_change: bool,
}

impl<'a> FileAnnotator<'a> {
    pub fn new(
        config: &'a ProjectConfig,
        format: ItemFormat,
        decorate: bool,
        whole_file_deleted: bool,
    ) -> Self {
        FileAnnotator {
            config,
            format,
            decorate,
            whole_file_deleted,
            fields: FieldTracker::new(),
            tables: TableFieldMerger::new(),
            code: CodeBlockTracker::new(),
            normative_change: false,
        }
    }

    /// Walks every hunk of `file` and returns the reconstructed lines.
    pub fn annotate(mut self, file: &PatchedFile) -> AnnotatedFile {
        let mut annotated = Vec::new();
        for hunk in file.hunks() {
            for line in hunk.lines() {
                match self.classify(LineKind::of(line), &line.value) {
                    LineAction::Emit(lines) => annotated.extend(lines),
                    LineAction::Suppress | LineAction::Buffered => {}
                }
            }
        }
        let lines = self.code.splice(annotated, &self.config.markup);
        AnnotatedFile {
            lines,
            normative_change: self.normative_change,
        }
    }

    fn classify(&mut self, kind: LineKind, value: &str) -> LineAction {
        // Added and context fences bound the front matter; a removed fence
        // is not counted and continues down the pipeline as content.
        if self.format == ItemFormat::Markdown
            && is_front_matter_fence(value)
            && kind != LineKind::Removed
        {
            self.fields.count_delimiter();
            return LineAction::Emit(vec![OutLine::Text(value.to_string())]);
        }

        // Field declarations only exist in the YAML section, which for
        // Markdown items means between the two front matter fences.
        let field_line = if self.format == ItemFormat::Yaml || self.fields.in_front_matter() {
            self.fields.classify(self.config, value)
        } else {
            None
        };

        if (self.fields.is_normative() || self.fields.past_front_matter())
            && kind != LineKind::Context
        {
            self.normative_change = true;
        }

        if let Some(field) = field_line
            && self.fields.is_normative()
            && self.normative_change
            && self.fields.is_table()
            && let Some(action) =
                self.tables
                    .observe(kind, field.name, field.value, &self.config.markup)
        {
            return action;
        }

        if self.decorate && self.in_body(value) {
            return self.annotate_body(kind, value);
        }

        // Removed lines from the remaining fields are dropped, unless the
        // whole file was deleted and every line must survive.
        if kind != LineKind::Removed || self.whole_file_deleted {
            return LineAction::Emit(vec![OutLine::Text(value.to_string())]);
        }
        LineAction::Suppress
    }

    /// Body lines are indented text-field continuations, anything past the
    /// Markdown front matter, and blank lines inside an open code block.
    fn in_body(&self, value: &str) -> bool {
        (self.fields.current_field() == TEXT_FIELD && value.starts_with(' '))
            || self.fields.past_front_matter()
            || (self.code.in_block() && value.trim().is_empty())
    }

    fn annotate_body(&mut self, kind: LineKind, value: &str) -> LineAction {
        let markup = &self.config.markup;
        if codeblock::is_one_line_fence(value) {
            return match kind {
                LineKind::Removed => LineAction::Emit(vec![
                    OutLine::Text(markup.removed_block_start.clone()),
                    OutLine::Text(value.trim().to_string()),
                    OutLine::Text(markup.block_end.clone()),
                ]),
                LineKind::Added => LineAction::Emit(vec![
                    OutLine::Text(markup.added_block_start.clone()),
                    OutLine::Text(value.trim().to_string()),
                    OutLine::Text(markup.block_end.clone()),
                ]),
                LineKind::Context => LineAction::Emit(vec![OutLine::Text(value.to_string())]),
            };
        }
        if codeblock::is_fence(value) {
            return self.code.on_fence(value);
        }
        if self.code.in_block() {
            return self.code.buffer(kind, value);
        }
        match kind {
            LineKind::Removed => {
                LineAction::Emit(vec![OutLine::Text(markup.removed_line(value.trim()))])
            }
            LineKind::Added => {
                LineAction::Emit(vec![OutLine::Text(markup.added_line(value.trim()))])
            }
            LineKind::Context => LineAction::Emit(vec![OutLine::Text(value.to_string())]),
        }
    }
}
