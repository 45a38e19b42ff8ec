//! Inserts and removes `console.log` diagnostics in JavaScript and TypeScript
//! sources.
//!
//! The two commands, [`insert_log`] and [`delete_log`], drive a [`Host`] (the
//! editor owning the document). Both parse the document with tree-sitter into a
//! [`SyntaxTree`], compute edits against the text as it was read, hand them to
//! the host as one batch and ask it to format.

use thiserror::Error;

pub mod ast;
pub mod caption;
pub mod delete;
pub mod edit;
pub mod host;
pub mod insert;
pub mod syntax;

pub use ast::{parse_document, JsAst, NodeId, ScriptKind, SyntaxNode, SyntaxTree};
pub use delete::{delete_log, delete_log_in_all, DeleteOutcome};
pub use edit::{apply_edits, Selection, TextEdit};
pub use host::{Host, IndentOptions, MemoryEditor, Snippet};
pub use insert::{insert_log, InsertOutcome, Insertion, PositionRef};
pub use syntax::{Field, SyntaxKind};

#[derive(Debug, Error)]
pub enum HasteError {
    #[error("tree-sitter rejected the grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    #[error("edits overlap at byte {at}")]
    ConflictingEdits { at: usize },
    #[error("offset {offset} is outside a document of {len} bytes")]
    OutOfBounds { offset: usize, len: usize },
    #[error("host: {0}")]
    Host(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
