mod document;
mod formatter;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use loghaste_core::delete::plan_deletions;
use loghaste_core::insert::plan_insertions;
use loghaste_core::{delete_log_in_all, insert_log, parse_document, Host, IndentOptions};
use tracing::info;

use crate::document::{collect_sources, parse_selection_arg, FileDocument, SelectionArg};
use crate::formatter::Formatter;

/// Insert and remove console.log diagnostics in JavaScript and TypeScript files.
#[derive(Parser, Debug)]
#[command(name = "loghaste")]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log the expression at each cursor or selection
    Insert {
        file: PathBuf,

        /// Cursor as LINE:COL or selection as LINE:COL..LINE:COL, 1-based (repeatable)
        #[arg(long = "at", required = true, value_parser = parse_selection_arg)]
        at: Vec<SelectionArg>,

        #[command(flatten)]
        opts: CommonOpts,
    },
    /// Remove every console.log call; directories are searched for sources
    Delete {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        opts: CommonOpts,
    },
}

#[derive(Args, Debug, Clone)]
struct CommonOpts {
    /// Rewrite files in place instead of printing them
    #[arg(long)]
    write: bool,

    /// Print the planned edits as JSON and change nothing
    #[arg(long, conflicts_with = "write")]
    dry_run: bool,

    #[arg(long, default_value_t = 4)]
    tab_size: usize,

    #[arg(long)]
    use_tabs: bool,

    /// Language id (javascript, javascriptreact, typescript, typescriptreact);
    /// detected from the extension by default
    #[arg(long)]
    language: Option<String>,

    /// Formatter command run on a temporary copy of each changed file
    #[arg(long)]
    format_cmd: Option<String>,

    /// Additional args for the formatter (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    format_arg: Vec<String>,

    /// Timeout per formatter run (e.g., 500ms, 2s)
    #[arg(long, default_value = "10s")]
    format_timeout: humantime::Duration,
}

impl CommonOpts {
    fn indent(&self) -> IndentOptions {
        IndentOptions { insert_spaces: !self.use_tabs, tab_size: self.tab_size }
    }

    fn formatter(&self) -> Option<Formatter> {
        self.format_cmd.as_ref().map(|cmd| Formatter {
            cmd: cmd.clone(),
            args: self.format_arg.clone(),
            timeout: Duration::from(self.format_timeout),
        })
    }

    fn open(&self, path: &Path) -> Result<FileDocument> {
        FileDocument::open(path, self.language.as_deref(), self.indent(), self.formatter())
    }
}

fn main() -> Result<()> {
    // stderr so stdout stays clean for documents and JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Insert { file, at, opts } => run_insert(&file, &at, &opts),
        Command::Delete { paths, opts } => run_delete(&paths, &opts),
    }
}

fn run_insert(file: &Path, at: &[SelectionArg], opts: &CommonOpts) -> Result<()> {
    let doc = opts.open(file)?;
    let selections: Vec<_> = at.iter().map(|s| s.resolve(doc.text())).collect();
    let mut doc = doc.with_selections(selections);

    if opts.dry_run {
        let plan = match parse_document(doc.language_id(), doc.text())? {
            Some(tree) => plan_insertions(&tree, &doc.selections()),
            None => Vec::new(),
        };
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let outcome = insert_log(&mut doc).with_context(|| format!("failed to insert into {}", file.display()))?;
    eprintln!(
        "{}: {} inserted, {} snippets, {} skipped",
        file.display(),
        outcome.edits,
        outcome.snippets,
        outcome.skipped
    );
    emit(&[doc], opts.write)
}

fn run_delete(paths: &[PathBuf], opts: &CommonOpts) -> Result<()> {
    let files = collect_sources(paths)?;
    let mut docs = files.iter().map(|f| opts.open(f)).collect::<Result<Vec<_>>>()?;
    info!(files = docs.len(), "collected sources");

    if opts.dry_run {
        let mut planned = serde_json::Map::new();
        for doc in &docs {
            let edits = match parse_document(doc.language_id(), doc.text())? {
                Some(tree) => plan_deletions(&tree),
                None => Vec::new(),
            };
            planned.insert(doc.path().display().to_string(), serde_json::to_value(edits)?);
        }
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    let outcome = delete_log_in_all(docs.iter_mut())?;
    eprintln!("{} removed across {} files", outcome.removed, docs.len());
    emit(&docs, opts.write)
}

/// Saves changed documents, or prints them when not writing.
fn emit(docs: &[FileDocument], write: bool) -> Result<()> {
    let changed: Vec<&FileDocument> = docs.iter().filter(|d| d.is_dirty()).collect();
    if write {
        for doc in changed {
            doc.save()?;
            info!(path = %doc.path().display(), "wrote");
        }
        return Ok(());
    }
    match changed.as_slice() {
        [single] if docs.len() == 1 => print!("{}", single.text()),
        _ => {
            for doc in changed {
                println!("==> {} <==", doc.path().display());
                print!("{}", doc.text());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("loghaste").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn insert_arguments() {
        let cli = parse(&["insert", "a.ts", "--at", "1:5", "--at", "2:1..2:4", "--tab-size", "2", "--use-tabs"]);
        let Command::Insert { file, at, opts } = cli.command else { panic!("expected insert") };
        assert_eq!(file, PathBuf::from("a.ts"));
        assert_eq!(at.len(), 2);
        assert_eq!(opts.indent(), IndentOptions { insert_spaces: false, tab_size: 2 });
        assert!(opts.formatter().is_none());
    }

    #[test]
    fn formatter_arguments() {
        let cli = parse(&[
            "delete",
            "src",
            "--format-cmd",
            "prettier",
            "--format-arg=--write",
            "--format-timeout",
            "2s",
        ]);
        let Command::Delete { paths, opts } = cli.command else { panic!("expected delete") };
        assert_eq!(paths, vec![PathBuf::from("src")]);
        let formatter = opts.formatter().unwrap();
        assert_eq!(formatter.cmd, "prettier");
        assert_eq!(formatter.args, vec!["--write".to_string()]);
        assert_eq!(formatter.timeout, Duration::from_secs(2));
        assert!(!opts.write);
    }

    #[test]
    fn write_and_dry_run_conflict() {
        let err = Cli::try_parse_from(["loghaste", "delete", "x.js", "--write", "--dry-run"]);
        assert!(err.is_err());
    }

    #[test]
    fn insert_requires_a_position() {
        assert!(Cli::try_parse_from(["loghaste", "insert", "x.js"]).is_err());
    }

    #[test]
    fn insert_and_delete_rewrite_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.js");
        fs::write(&path, "function f() {\n    const total = 1;\n}\n").unwrap();
        let opts = match parse(&["delete", "unused", "--write"]).command {
            Command::Delete { opts, .. } => opts,
            Command::Insert { .. } => unreachable!(),
        };

        run_insert(&path, &[parse_selection_arg("2:12").unwrap()], &opts).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "function f() {\n    const total = 1;\n    console.log('*** total »', total)\n}\n"
        );

        run_delete(&[dir.path().to_path_buf()], &opts).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "function f() {\n    const total = 1;\n}\n");
    }
}
