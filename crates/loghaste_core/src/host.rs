//! The editor services the commands run against.
//!
//! A [`Host`] owns the document. The engines only read from it, hand it one
//! batch of edits computed against the text they read, and ask it to format
//! afterwards. [`MemoryEditor`] is a complete in-memory host.

use serde::{Deserialize, Serialize};

use crate::edit::{apply_edits, Selection, TextEdit};
use crate::HasteError;

/// Per-document indentation settings, read but never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentOptions {
    pub insert_spaces: bool,
    pub tab_size: usize,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self { insert_spaces: true, tab_size: 4 }
    }
}

impl IndentOptions {
    /// One level of indentation.
    pub fn unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size)
        } else {
            "\t".to_string()
        }
    }

    /// Visual width of one level.
    pub fn unit_width(&self) -> usize {
        self.tab_size.max(1)
    }
}

/// Snippet text with editor tab stops (`$1`, `$0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub body: String,
}

impl Snippet {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// The snippet as inserted text, tab stops removed.
    pub fn plain_text(&self) -> String {
        self.body.replace("$1", "").replace("$0", "")
    }

    /// Offset of the first tab stop within [`Snippet::plain_text`].
    pub fn first_tab_stop(&self) -> Option<usize> {
        let idx = self.body.find("$1").or_else(|| self.body.find("$0"))?;
        Some(Snippet::new(&self.body[..idx]).plain_text().len())
    }
}

pub trait Host {
    fn language_id(&self) -> &str;

    fn text(&self) -> &str;

    fn selections(&self) -> Vec<Selection>;

    fn indent_options(&self) -> IndentOptions;

    /// Applies the whole batch atomically. Offsets refer to the text as it was
    /// before the batch.
    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), HasteError>;

    /// Replaces `at` with the snippet and puts the cursor on its first tab stop.
    fn insert_snippet(&mut self, snippet: &Snippet, at: Selection) -> Result<(), HasteError>;

    fn format_document(&mut self) -> Result<(), HasteError>;
}

/// In-memory document implementing [`Host`].
#[derive(Debug, Clone)]
pub struct MemoryEditor {
    language_id: String,
    text: String,
    selections: Vec<Selection>,
    indent: IndentOptions,
    /// Cursor positions left behind by inserted snippets.
    pub snippet_cursors: Vec<usize>,
    /// Number of batches applied.
    pub batches: usize,
    pub format_requests: usize,
}

impl MemoryEditor {
    pub fn new(language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language_id: language_id.into(),
            text: text.into(),
            selections: Vec::new(),
            indent: IndentOptions::default(),
            snippet_cursors: Vec::new(),
            batches: 0,
            format_requests: 0,
        }
    }

    pub fn with_selections(mut self, selections: impl IntoIterator<Item = Selection>) -> Self {
        self.selections = selections.into_iter().collect();
        self
    }

    pub fn with_indent(mut self, indent: IndentOptions) -> Self {
        self.indent = indent;
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Host for MemoryEditor {
    fn language_id(&self) -> &str {
        &self.language_id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn indent_options(&self) -> IndentOptions {
        self.indent
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), HasteError> {
        self.text = apply_edits(&self.text, edits)?;
        self.batches += 1;
        Ok(())
    }

    fn insert_snippet(&mut self, snippet: &Snippet, at: Selection) -> Result<(), HasteError> {
        let (start, end) = at.range();
        let edit = TextEdit::replace(start, end, snippet.plain_text());
        self.text = apply_edits(&self.text, &[edit])?;
        if let Some(stop) = snippet.first_tab_stop() {
            self.snippet_cursors.push(start + stop);
        }
        Ok(())
    }

    fn format_document(&mut self) -> Result<(), HasteError> {
        self.format_requests += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snippet_tab_stops() {
        let s = Snippet::new("console.log($1)$0");
        assert_eq!(s.plain_text(), "console.log()");
        assert_eq!(s.first_tab_stop(), Some("console.log(".len()));
    }

    #[test]
    fn memory_editor_inserts_snippet_over_selection() {
        let mut ed = MemoryEditor::new("javascript", "{ xx }");
        ed.insert_snippet(&Snippet::new("log($1)$0"), Selection::new(4, 2)).unwrap();
        assert_eq!(ed.text(), "{ log() }");
        assert_eq!(ed.snippet_cursors, vec![6]);
    }

    #[test]
    fn indent_unit() {
        assert_eq!(IndentOptions { insert_spaces: true, tab_size: 2 }.unit(), "  ");
        assert_eq!(IndentOptions { insert_spaces: false, tab_size: 8 }.unit(), "\t");
    }
}
