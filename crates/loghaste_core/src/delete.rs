//! Removing every `console.log(...)` from a document.

use std::cmp::Reverse;

use tracing::{debug, info};

use crate::ast::{parse_document, NodeId, SyntaxTree};
use crate::edit::{first_non_whitespace, line_end, line_end_including_break, line_start, TextEdit};
use crate::host::Host;
use crate::syntax::{Field, SyntaxKind};
use crate::HasteError;

/// Stands in for a removed call used as a value.
pub const NEUTRAL_EXPRESSION: &str = "void 0";

/// Stands in for a removed call that was a body on its own.
pub const EMPTY_BLOCK: &str = "{}";

/// How a call site is cleaned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionSite {
    /// The call is a statement in a statement list: drop the statement.
    Statement(NodeId),
    /// An arrow body or a `case` clause statement: leave `{}`.
    EmptyBlock,
    /// Anywhere else: leave `void 0`.
    Neutral,
    /// The object of a member access: leave `(void 0)`, since `void 0.x`
    /// does not parse.
    NeutralObject,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: usize,
}

/// Removes every diagnostic log from the host document as one batch.
pub fn delete_log<H: Host + ?Sized>(host: &mut H) -> Result<DeleteOutcome, HasteError> {
    let Some(tree) = parse_document(host.language_id(), host.text())? else {
        debug!(language_id = host.language_id(), "not an ECMAScript document");
        return Ok(DeleteOutcome::default());
    };

    let edits = plan_deletions(&tree);
    if edits.is_empty() {
        return Ok(DeleteOutcome::default());
    }
    host.apply_edits(&edits)?;
    host.format_document()?;
    info!(removed = edits.len(), "deleted diagnostic logs");
    Ok(DeleteOutcome { removed: edits.len() })
}

/// Runs [`delete_log`] over several documents, one after another.
pub fn delete_log_in_all<'a, H, I>(hosts: I) -> Result<DeleteOutcome, HasteError>
where
    H: Host + ?Sized + 'a,
    I: IntoIterator<Item = &'a mut H>,
{
    let mut total = DeleteOutcome::default();
    for host in hosts {
        total.removed += delete_log(host)?.removed;
    }
    Ok(total)
}

/// Every `console.log(...)` call, outermost only: a log nested inside another
/// goes away with it.
pub fn find_log_calls(tree: &SyntaxTree) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(n) = stack.pop() {
        if tree.is_log_call(n) {
            out.push(n);
            continue;
        }
        stack.extend(tree.children(n).iter().rev().copied());
    }
    out
}

pub fn classify(tree: &SyntaxTree, call: NodeId) -> DeletionSite {
    let Some(parent) = tree.parent(call) else {
        return DeletionSite::Neutral;
    };
    let parent_kind = tree.kind(parent);
    let grandparent_kind = tree.parent_kind(parent);

    if parent_kind == SyntaxKind::ExpressionStatement
        && matches!(grandparent_kind, Some(SyntaxKind::StatementBlock | SyntaxKind::Program))
    {
        return DeletionSite::Statement(parent);
    }

    let arrow_body = parent_kind == SyntaxKind::ArrowFunction && tree.field(call) == Some(Field::Body);
    let case_statement = parent_kind == SyntaxKind::ExpressionStatement
        && matches!(grandparent_kind, Some(SyntaxKind::SwitchCase | SyntaxKind::SwitchDefault));
    if arrow_body || case_statement {
        DeletionSite::EmptyBlock
    } else if parent_kind == SyntaxKind::MemberExpression && tree.field(call) == Some(Field::Object) {
        DeletionSite::NeutralObject
    } else {
        DeletionSite::Neutral
    }
}

/// One edit per log call, bottom of the file first, all against the original text.
pub fn plan_deletions(tree: &SyntaxTree) -> Vec<TextEdit> {
    let src = tree.source();
    let mut calls = find_log_calls(tree);
    calls.sort_by_key(|&c| Reverse(tree.node(c).full_start));

    calls
        .into_iter()
        .map(|call| {
            let site = classify(tree, call);
            debug!(?site, start = tree.node(call).start, "removing log");
            let n = tree.node(call);
            match site {
                DeletionSite::Statement(statement) => statement_deletion(src, tree, statement),
                DeletionSite::EmptyBlock => TextEdit::replace(n.start, n.end, EMPTY_BLOCK),
                DeletionSite::Neutral => TextEdit::replace(n.start, n.end, NEUTRAL_EXPRESSION),
                DeletionSite::NeutralObject => TextEdit::replace(n.start, n.end, format!("({NEUTRAL_EXPRESSION})")),
            }
        })
        .collect()
}

/// Whole lines when the statement is alone on them, otherwise just its span.
fn statement_deletion(src: &str, tree: &SyntaxTree, statement: NodeId) -> TextEdit {
    let n = tree.node(statement);
    let owns_start = first_non_whitespace(src, n.start) == n.start;
    let rest_of_line = &src[n.end..line_end(src, n.end)];
    let owns_end = rest_of_line.trim_end_matches([' ', '\t']).is_empty();

    if owns_start && owns_end {
        TextEdit::delete(line_start(src, n.start), line_end_including_break(src, n.end))
    } else {
        TextEdit::delete(n.start, n.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{JsAst, ScriptKind};
    use crate::edit::apply_edits;
    use crate::host::MemoryEditor;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn delete_in(src: &str, script: ScriptKind) -> String {
        let tree = JsAst::new(script).unwrap().parse(src).unwrap();
        apply_edits(src, &plan_deletions(&tree)).unwrap()
    }

    #[rstest]
    #[case::own_line("a();\nconsole.log('a')\nb();\n", "a();\nb();\n")]
    #[case::indented_own_line(
        "function f() {\n    console.log('a');\n    return 1;\n}\n",
        "function f() {\n    return 1;\n}\n"
    )]
    #[case::multi_line_call(
        "start();\nconsole.log(\n  'a',\n  b,\n);\nend();\n",
        "start();\nend();\n"
    )]
    #[case::last_line_without_break("a();\nconsole.log(1)", "a();\n")]
    #[case::trailing_spaces("a();\nconsole.log(1);  \nb();", "a();\nb();")]
    #[case::shares_line("a(); console.log(1);\nb();", "a(); \nb();")]
    #[case::arrow_body("const f = () => console.log('a');", "const f = () => {};")]
    #[case::case_clause(
        "switch (x) {\n  case 1: console.log(x); break;\n}",
        "switch (x) {\n  case 1: {}; break;\n}"
    )]
    #[case::nested_expression("x = console.log('a');", "x = void 0;")]
    #[case::argument("foo(console.log(1), 2);", "foo(void 0, 2);")]
    #[case::if_without_block("if (debug) console.log(state);", "if (debug) void 0;")]
    #[case::member_object("console.log(1).then(f);", "(void 0).then(f);")]
    #[case::trailing_comment_shares_line("a(); console.log(1) // keep\nb();", "a();  // keep\nb();")]
    #[case::trailing_comment_own_line(
        "function f() {\n  console.log(1) // keep\n  return 2\n}\n",
        "function f() {\n   // keep\n  return 2\n}\n"
    )]
    #[case::comment_on_next_line(
        "a()\nconsole.log(1)\n// keep\nb()\n",
        "a()\n// keep\nb()\n"
    )]
    #[case::crlf("a();\r\nconsole.log(1);\r\nb();\r\n", "a();\r\nb();\r\n")]
    fn deletions(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(delete_in(src, ScriptKind::Js), expected);
    }

    #[test]
    fn other_console_methods_survive() {
        let src = "console.warn(1);\nconsole.log(2);\nlogger.log(3);\n";
        assert_eq!(delete_in(src, ScriptKind::Js), "console.warn(1);\nlogger.log(3);\n");
    }

    #[test]
    fn nested_logs_go_with_the_outer_call() {
        let src = "console.log(console.log(1));\n";
        let tree = JsAst::new(ScriptKind::Js).unwrap().parse(src).unwrap();
        assert_eq!(find_log_calls(&tree).len(), 1);
        assert_eq!(delete_in(src, ScriptKind::Js), "");
    }

    #[test]
    fn typescript_sources() {
        let src = "function f(a: number): number {\n  console.log('*** a »', a)\n  return a;\n}\n";
        assert_eq!(
            delete_in(src, ScriptKind::Ts),
            "function f(a: number): number {\n  return a;\n}\n"
        );
    }

    #[test]
    fn calls_are_planned_bottom_first() {
        let src = "console.log(1);\nx = console.log(2);\n";
        let tree = JsAst::new(ScriptKind::Js).unwrap().parse(src).unwrap();
        let starts: Vec<usize> = plan_deletions(&tree).iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![20, 0]);
    }

    #[test]
    fn documents_without_logs_are_untouched() {
        let mut editor = MemoryEditor::new("javascript", "a();\n");
        assert_eq!(delete_log(&mut editor).unwrap(), DeleteOutcome::default());
        assert_eq!(editor.batches, 0);
        assert_eq!(editor.format_requests, 0);
    }

    #[test]
    fn every_document_is_processed() {
        let mut editors = vec![
            MemoryEditor::new("javascript", "console.log(1);\n"),
            MemoryEditor::new("markdown", "console.log(1);\n"),
            MemoryEditor::new("typescript", "const f = () => console.log(2);\n"),
        ];
        let outcome = delete_log_in_all(editors.iter_mut()).unwrap();
        assert_eq!(outcome.removed, 2);
        assert_eq!(editors[0].text(), "");
        assert_eq!(editors[1].text(), "console.log(1);\n");
        assert_eq!(editors[2].text(), "const f = () => {};\n");
        assert_eq!(editors[0].format_requests, 1);
        assert_eq!(editors[1].format_requests, 0);
    }
}
