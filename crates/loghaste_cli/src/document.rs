use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use loghaste_core::edit::offset_at;
use loghaste_core::{HasteError, Host, IndentOptions, MemoryEditor, ScriptKind, Selection, Snippet, TextEdit};
use walkdir::WalkDir;

use crate::formatter::Formatter;

/// Language id for files the tool does not understand; parsing it is a no-op.
const PLAIN_TEXT: &str = "plaintext";

/// A file on disk edited through an in-memory buffer.
pub struct FileDocument {
    path: PathBuf,
    editor: MemoryEditor,
    original: String,
    formatter: Option<Formatter>,
}

impl FileDocument {
    /// Reads `path`. The language comes from `language` when given, otherwise
    /// from the file extension.
    pub fn open(
        path: &Path,
        language: Option<&str>,
        indent: IndentOptions,
        formatter: Option<Formatter>,
    ) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let language_id = match language {
            Some(id) => id.to_string(),
            None => ScriptKind::from_path(path).map_or(PLAIN_TEXT, ScriptKind::language_id).to_string(),
        };
        Ok(Self {
            path: path.to_path_buf(),
            editor: MemoryEditor::new(language_id, text.clone()).with_indent(indent),
            original: text,
            formatter,
        })
    }

    pub fn with_selections(mut self, selections: impl IntoIterator<Item = Selection>) -> Self {
        self.editor = self.editor.with_selections(selections);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.editor.text() != self.original
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.editor.text()).with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn extension(&self) -> &str {
        self.path.extension().and_then(|e| e.to_str()).unwrap_or("js")
    }
}

impl Host for FileDocument {
    fn language_id(&self) -> &str {
        self.editor.language_id()
    }

    fn text(&self) -> &str {
        self.editor.text()
    }

    fn selections(&self) -> Vec<Selection> {
        self.editor.selections()
    }

    fn indent_options(&self) -> IndentOptions {
        self.editor.indent_options()
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) -> Result<(), HasteError> {
        self.editor.apply_edits(edits)
    }

    fn insert_snippet(&mut self, snippet: &Snippet, at: Selection) -> Result<(), HasteError> {
        self.editor.insert_snippet(snippet, at)
    }

    fn format_document(&mut self) -> Result<(), HasteError> {
        let Some(formatter) = &self.formatter else {
            return self.editor.format_document();
        };
        let formatted = formatter
            .format(self.editor.text(), self.extension())
            .map_err(|e| HasteError::Host(format!("{e:#}")))?;
        self.editor.set_text(formatted);
        Ok(())
    }
}

/// A 1-based `LINE:COL` position as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn offset_in(&self, text: &str) -> usize {
        offset_at(text, self.line - 1, self.column - 1)
    }
}

/// `LINE:COL` for a cursor, `LINE:COL..LINE:COL` for anchor and active ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionArg {
    pub anchor: Position,
    pub active: Position,
}

impl SelectionArg {
    pub fn resolve(&self, text: &str) -> Selection {
        Selection::new(self.anchor.offset_in(text), self.active.offset_in(text))
    }
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (line, column) = s.split_once(':').ok_or_else(|| format!("expected LINE:COL, got `{s}`"))?;
    let number = |part: &str| match part.trim().parse::<usize>() {
        Ok(0) => Err(format!("lines and columns start at 1 in `{s}`")),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("`{part}` in `{s}`: {e}")),
    };
    Ok(Position { line: number(line)?, column: number(column)? })
}

pub fn parse_selection_arg(s: &str) -> Result<SelectionArg, String> {
    match s.split_once("..") {
        Some((anchor, active)) => Ok(SelectionArg { anchor: parse_position(anchor)?, active: parse_position(active)? }),
        None => {
            let at = parse_position(s)?;
            Ok(SelectionArg { anchor: at, active: at })
        }
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

/// Files named on the command line, with directories expanded to the
/// ECMAScript sources below them.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            bail!("no such file or directory: {}", path.display());
        }
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).into_iter().filter_entry(|e| !is_skipped_dir(e)) {
            let entry = entry?;
            if entry.file_type().is_file() && ScriptKind::from_path(entry.path()).is_some() {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_and_selection_arguments() {
        let cursor = parse_selection_arg("3:7").unwrap();
        assert_eq!(cursor.anchor, Position { line: 3, column: 7 });
        assert_eq!(cursor.anchor, cursor.active);

        let reversed = parse_selection_arg("2:5..1:1").unwrap();
        assert_eq!(reversed.anchor, Position { line: 2, column: 5 });
        assert_eq!(reversed.active, Position { line: 1, column: 1 });
    }

    #[test]
    fn malformed_positions_are_rejected() {
        assert!(parse_selection_arg("12").is_err());
        assert!(parse_selection_arg("0:1").is_err());
        assert!(parse_selection_arg("1:x").is_err());
        assert!(parse_selection_arg("1:1..").is_err());
    }

    #[test]
    fn positions_resolve_to_byte_offsets() {
        let text = "const a = 1;\nconst b = 2;\n";
        let selection = parse_selection_arg("2:7..2:8").unwrap().resolve(text);
        assert_eq!(selection, Selection::new(19, 20));
        assert_eq!(&text[19..20], "b");
    }

    #[test]
    fn directories_expand_to_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/a.js"), "").unwrap();
        fs::write(dir.path().join("src/b.tsx"), "").unwrap();
        fs::write(dir.path().join("src/notes.md"), "").unwrap();
        fs::write(dir.path().join("src/node_modules/pkg/index.js"), "").unwrap();

        let files = collect_sources(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf()).collect();
        assert_eq!(names, vec![PathBuf::from("src/a.js"), PathBuf::from("src/b.tsx")]);
    }

    #[test]
    fn unknown_extensions_open_as_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "console.log(1);\n").unwrap();
        let doc = FileDocument::open(&path, None, IndentOptions::default(), None).unwrap();
        assert_eq!(doc.language_id(), PLAIN_TEXT);

        let forced = FileDocument::open(&path, Some("javascript"), IndentOptions::default(), None).unwrap();
        assert_eq!(forced.language_id(), "javascript");
    }
}
