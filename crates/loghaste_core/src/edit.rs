use serde::{Deserialize, Serialize};

use crate::host::IndentOptions;
use crate::HasteError;

/// A cursor or selection in byte offsets. The direction matters: `active`
/// before `anchor` is a reversed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub active: usize,
}

impl Selection {
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    pub fn cursor(at: usize) -> Self {
        Self { anchor: at, active: at }
    }

    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    /// `(start, end)` as used for containment tests.
    pub fn range(&self) -> (usize, usize) {
        if self.is_reversed() {
            (self.active, self.anchor)
        } else {
            (self.anchor, self.active)
        }
    }

    pub fn start(&self) -> usize {
        self.range().0
    }
}

/// Byte-accurate edit against the original text. `start == end` is an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self { start: at, end: at, new_text: text.into() }
    }

    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self { start, end, new_text: text.into() }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Self { start, end, new_text: String::new() }
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// Two edits conflict when their replaced spans overlap, or when one is an
    /// insertion strictly inside the other's span.
    pub fn conflicts_with(&self, other: &TextEdit) -> bool {
        if self.is_insertion() && other.is_insertion() {
            return false;
        }
        if self.is_insertion() {
            return other.start < self.start && self.start < other.end;
        }
        if other.is_insertion() {
            return self.start < other.start && other.start < self.end;
        }
        self.start < other.end && other.start < self.end
    }
}

/// Applies a batch computed against `src`, bottom of the file first so no
/// offset needs remapping.
pub fn apply_edits(src: &str, edits: &[TextEdit]) -> Result<String, HasteError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    // a replacement sharing its start with an insertion goes first, otherwise
    // it would swallow the inserted text
    ordered.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut out = src.to_string();
    let mut floor = src.len();
    for e in ordered {
        if e.start > e.end || e.end > src.len() {
            return Err(HasteError::OutOfBounds { offset: e.end, len: src.len() });
        }
        if !src.is_char_boundary(e.start) || !src.is_char_boundary(e.end) {
            return Err(HasteError::OutOfBounds { offset: e.start, len: src.len() });
        }
        if e.end > floor {
            return Err(HasteError::ConflictingEdits { at: e.start });
        }
        out.replace_range(e.start..e.end, &e.new_text);
        floor = e.start;
    }
    Ok(out)
}

/// Offset of the first character of the line holding `offset`.
pub fn line_start(src: &str, offset: usize) -> usize {
    src[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset of the line break (or end of text) ending the line holding `offset`,
/// a `\r` before the `\n` excluded.
pub fn line_end(src: &str, offset: usize) -> usize {
    let end = src[offset..].find('\n').map_or(src.len(), |i| offset + i);
    if end > offset && src[..end].ends_with('\r') {
        end - 1
    } else {
        end
    }
}

/// Like [`line_end`] but past the line break.
pub fn line_end_including_break(src: &str, offset: usize) -> usize {
    src[offset..].find('\n').map_or(src.len(), |i| offset + i + 1)
}

/// Offset of the first non-blank character on the line holding `offset`.
pub fn first_non_whitespace(src: &str, offset: usize) -> usize {
    let start = line_start(src, offset);
    let line = &src[start..line_end(src, offset)];
    start + (line.len() - line.trim_start_matches([' ', '\t']).len())
}

/// Byte offset of a zero-based `(line, character)` position; characters are
/// counted in chars. Positions past the end clamp to the end of the line or text.
pub fn offset_at(src: &str, line: usize, character: usize) -> usize {
    let mut start = 0;
    for _ in 0..line {
        match src[start..].find('\n') {
            Some(i) => start += i + 1,
            None => return src.len(),
        }
    }
    let end = line_end(src, start);
    src[start..end]
        .char_indices()
        .nth(character)
        .map_or(end, |(i, _)| start + i)
}

/// Re-indents the continuation lines of an inserted text relative to the line
/// where it lands: one level deeper after a line ending in `{`, one level
/// shallower on a line starting with `}`. Text with a backtick is returned
/// untouched so template literals keep their contents.
pub fn indent_text(text: &str, base_indent: &str, options: &IndentOptions) -> String {
    if text.contains('`') {
        return text.to_string();
    }
    let unit = options.unit();
    let base_width = base_indent.chars().map(|c| if c == '\t' { options.unit_width() } else { 1 }).sum::<usize>();
    let mut level = base_width / options.unit_width().max(1);

    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());
    for (rank, line) in lines.iter().enumerate() {
        if rank == 0 {
            out.push(line.to_string());
            continue;
        }
        if lines[rank - 1].ends_with('{') {
            level += 1;
        }
        let line = line.trim_start_matches([' ', '\t']);
        if line.starts_with('}') {
            level = level.saturating_sub(1);
        }
        out.push(format!("{}{}", unit.repeat(level), line));
    }
    out.join("\n")
}

/// Applies [`indent_text`] to an edit, using the indentation of the line its
/// start lands on in `src`. Text that breaks the line right after a `{` is
/// indented one level deeper.
pub fn indent_edit(src: &str, edit: &TextEdit, options: &IndentOptions) -> TextEdit {
    let start = line_start(src, edit.start);
    let mut base = src[start..first_non_whitespace(src, edit.start).min(edit.start)].to_string();
    if edit.new_text.starts_with('\n') && src[start..edit.start].trim_end().ends_with('{') {
        base.push_str(&options.unit());
    }
    TextEdit { new_text: indent_text(&edit.new_text, &base, options), ..edit.clone() }
}
