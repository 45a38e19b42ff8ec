//! Inserting `console.log` next to each cursor.
//!
//! Every selection goes through the same pipeline: find the smallest node that
//! contains it, [`expand`] that node to something worth logging, pick a
//! [`PositionRef`] for it, and [`render`] the reference into a [`TextEdit`]
//! against the original text.

use std::cmp::Reverse;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::ast::{parse_document, NodeId, SyntaxTree};
use crate::caption::{create_log, escape, truncate};
use crate::edit::{indent_edit, Selection, TextEdit};
use crate::host::{Host, Snippet};
use crate::syntax::{Field, SyntaxKind};
use crate::HasteError;

/// Inserted when the cursor sits directly in a statement list.
pub const SNIPPET_BODY: &str = "console.log($1)$0";

const RETURN_PREFIX: &str = "return ";

/// Where the log statement goes, relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionRef {
    /// In front of `node`, followed by `prefix` (`return ` for expression bodies).
    Before { node: NodeId, prefix: &'static str },
    After(NodeId),
    /// First statement of a block.
    Inside(NodeId),
}

/// One planned change for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Insertion {
    Snippet { at: Selection, snippet: Snippet },
    Edit(TextEdit),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub edits: usize,
    pub snippets: usize,
    pub skipped: usize,
}

/// Inserts a diagnostic log for every selection of the host document, then
/// asks the host to format if anything changed.
pub fn insert_log<H: Host + ?Sized>(host: &mut H) -> Result<InsertOutcome, HasteError> {
    let Some(tree) = parse_document(host.language_id(), host.text())? else {
        debug!(language_id = host.language_id(), "not an ECMAScript document");
        return Ok(InsertOutcome::default());
    };

    let selections = host.selections();
    let plan = plan_insertions(&tree, &selections);
    let indent = host.indent_options();
    let mut outcome = InsertOutcome { skipped: selections.len() - plan.len(), ..Default::default() };

    let mut pending: Vec<TextEdit> = Vec::new();
    for step in plan {
        match step {
            Insertion::Edit(edit) => pending.push(indent_edit(tree.source(), &edit, &indent)),
            Insertion::Snippet { at, snippet } => {
                // edits at or below the snippet cannot move it; the rest wait
                let (ready, rest): (Vec<_>, Vec<_>) =
                    pending.into_iter().partition(|e| e.start >= at.start());
                pending = rest;
                outcome.edits += flush(host, &ready)?;
                host.insert_snippet(&snippet, at)?;
                outcome.snippets += 1;
            }
        }
    }
    outcome.edits += flush(host, &pending)?;

    if outcome.edits + outcome.snippets > 0 {
        host.format_document()?;
    }
    info!(edits = outcome.edits, snippets = outcome.snippets, skipped = outcome.skipped, "inserted diagnostic logs");
    Ok(outcome)
}

fn flush<H: Host + ?Sized>(host: &mut H, edits: &[TextEdit]) -> Result<usize, HasteError> {
    if edits.is_empty() {
        return Ok(0);
    }
    host.apply_edits(edits)?;
    Ok(edits.len())
}

/// Plans one insertion per selection, bottom of the file first. Selections
/// without a target or placement, or whose edit would collide with an edit
/// already planned, are left out.
pub fn plan_insertions(tree: &SyntaxTree, selections: &[Selection]) -> Vec<Insertion> {
    let mut ordered = selections.to_vec();
    ordered.sort_by_key(|s| Reverse(s.anchor.min(s.active)));

    let mut claimed: Vec<TextEdit> = Vec::new();
    let mut out = Vec::new();
    for selection in ordered {
        let matched = find_matching_node(tree, selection.range()).unwrap_or(tree.root());

        if tree.is_block_like(matched) {
            let snippet = Snippet::new(SNIPPET_BODY);
            let (start, end) = selection.range();
            let footprint = TextEdit::replace(start, end, snippet.plain_text());
            if claimed.iter().any(|c| c.conflicts_with(&footprint)) {
                debug!(?selection, "snippet collides with another insertion");
                continue;
            }
            claimed.push(footprint);
            out.push(Insertion::Snippet { at: selection, snippet });
            continue;
        }

        let Some(target) = expand(tree, matched) else {
            debug!(?selection, kind = ?tree.kind(matched), "nothing to log here");
            continue;
        };
        let Some(reference) = position_reference(tree, target) else {
            debug!(?selection, kind = ?tree.kind(target), "no place to put the log");
            continue;
        };
        let (caption, expression) = describe(tree, target);
        let edit = render(tree, reference, &create_log(&caption, expression.as_deref()));
        if claimed.iter().any(|c| c.conflicts_with(&edit)) {
            debug!(?selection, "edit collides with another insertion");
            continue;
        }
        debug!(?reference, start = edit.start, end = edit.end, "planned log");
        claimed.push(edit.clone());
        out.push(Insertion::Edit(edit));
    }
    out
}

/// Smallest node whose span contains `range`; the first matching child wins
/// at every level. `None` when only the root contains it.
pub fn find_matching_node(tree: &SyntaxTree, range: (usize, usize)) -> Option<NodeId> {
    let (start, end) = range;
    let mut found = None;
    let mut current = tree.root();
    while let Some(child) = tree.children(current).iter().copied().find(|&c| {
        let n = tree.node(c);
        n.start <= start && end <= n.end
    }) {
        found = Some(child);
        current = child;
    }
    found
}

/// Grows `node` into the expression or statement worth logging. Stops at a
/// fixed point, so expanding the result again returns it unchanged.
pub fn expand(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    let mut node = node;
    loop {
        let parent = tree.parent(node)?;
        let kind = tree.kind(node);
        let parent_kind = tree.kind(parent);
        let field = tree.field(node);
        trace!(?kind, ?parent_kind, "expanding");

        if kind == SyntaxKind::Identifier && parent_kind.is_function_declaration() {
            node = parent;
            continue;
        }
        if kind.is_function_declaration() {
            return Some(node);
        }
        // `0` -> `array[0]`
        if kind.is_literal() && parent_kind == SyntaxKind::SubscriptExpression && field == Some(Field::Index) {
            node = parent;
            continue;
        }
        // the parentheses around `if (x)` belong to the statement
        if kind == SyntaxKind::ParenthesizedExpression && parent_kind.has_parenthesized_condition() {
            if let Some(&inner) = tree.children(node).first() {
                node = inner;
                continue;
            }
        }
        if kind.is_expression() {
            // `field` -> `object.field`
            if parent_kind == SyntaxKind::MemberExpression && field == Some(Field::Property) {
                node = parent;
                continue;
            }
            // `delegate` -> `delegate(...args)`
            let is_callee = (parent_kind == SyntaxKind::CallExpression && field == Some(Field::Function))
                || (parent_kind == SyntaxKind::NewExpression && field == Some(Field::Constructor));
            if is_callee {
                node = parent;
                continue;
            }
            return Some(node);
        }
        if tree.is_parameter(node) {
            return Some(node);
        }
        if kind == SyntaxKind::VariableDeclarator {
            return tree.child_by_field(node, Field::Name);
        }
        if kind.is_declaration_list() {
            let first = tree
                .children(node)
                .iter()
                .copied()
                .find(|&c| tree.kind(c) == SyntaxKind::VariableDeclarator)?;
            return tree.child_by_field(first, Field::Name);
        }
        if kind == SyntaxKind::ReturnStatement {
            return tree.children(node).first().copied();
        }
        if kind.is_statement() {
            // loops and conditionals are never replaced by a log
            return (kind == SyntaxKind::ExpressionStatement).then_some(node);
        }
        node = parent;
    }
}

/// Caption and echoed expression for a target.
pub fn describe(tree: &SyntaxTree, target: NodeId) -> (String, Option<String>) {
    let kind = tree.kind(target);
    if kind.is_function_declaration() {
        if let Some(name) = tree.child_by_field(target, Field::Name) {
            return (escape(tree.text(name)), None);
        }
    }

    if let Some(parent) = tree.parent(target).filter(|&p| tree.kind(p) == SyntaxKind::Pair) {
        let key = tree.child_by_field(parent, Field::Key);
        let value = tree.child_by_field(parent, Field::Value);
        if let (Some(key), Some(value)) = (key, value) {
            if tree.kind(key) != SyntaxKind::ComputedPropertyName {
                return (truncate(&escape(tree.text(key))), Some(tree.text(value).to_string()));
            }
        }
    }

    // a statement echoes its expression, never its semicolon
    if kind == SyntaxKind::ExpressionStatement {
        let echoed = tree.children(target).first().map_or(tree.text(target), |&e| tree.text(e));
        return (truncate(&escape(echoed)), Some(echoed.to_string()));
    }
    let is_declared_name =
        tree.field(target) == Some(Field::Name) && tree.parent_kind(target) == Some(SyntaxKind::VariableDeclarator);
    if tree.is_parameter(target) || is_declared_name {
        let binding = if is_declared_name { target } else { parameter_binding(tree, target) };
        return (truncate(&escape(tree.text(binding))), Some(without_defaults(tree, binding)));
    }
    (truncate(&escape(tree.text(target))), Some(tree.text(target).to_string()))
}

/// A binding read back as a value: destructuring defaults are dropped, so
/// `{a = 1, b: [c = 2]}` echoes as `{a, b: [c]}`.
fn without_defaults(tree: &SyntaxTree, binding: NodeId) -> String {
    let mut cuts = Vec::new();
    let mut stack = vec![binding];
    while let Some(n) = stack.pop() {
        if matches!(tree.kind(n), SyntaxKind::AssignmentPattern | SyntaxKind::ObjectAssignmentPattern) {
            if let Some(left) = tree.child_by_field(n, Field::Left) {
                cuts.push((tree.node(left).end, tree.node(n).end));
                stack.push(left);
                continue;
            }
        }
        stack.extend(tree.children(n).iter().copied());
    }
    cuts.sort_unstable();

    let src = tree.source();
    let mut out = String::new();
    let mut from = tree.node(binding).start;
    for (start, end) in cuts {
        out.push_str(&src[from..start]);
        from = end;
    }
    out.push_str(&src[from..tree.node(binding).end]);
    out
}

/// What a parameter binds, without its type annotation or default value.
fn parameter_binding(tree: &SyntaxTree, parameter: NodeId) -> NodeId {
    let mut node = parameter;
    loop {
        let inner = match tree.kind(node) {
            SyntaxKind::RequiredParameter | SyntaxKind::OptionalParameter => {
                tree.child_by_field(node, Field::Pattern).or_else(|| {
                    tree.children(node)
                        .iter()
                        .copied()
                        .find(|&c| tree.kind(c) == SyntaxKind::Identifier)
                })
            }
            SyntaxKind::AssignmentPattern => tree.child_by_field(node, Field::Left),
            _ => None,
        };
        match inner {
            Some(inner) => node = inner,
            None => return node,
        }
    }
}

/// Walks up from the target until a parent-specific rule says where the log goes.
pub fn position_reference(tree: &SyntaxTree, target: NodeId) -> Option<PositionRef> {
    let mut node = target;
    loop {
        let parent = tree.parent(node)?;
        let kind = tree.kind(node);
        let parent_kind = tree.kind(parent);
        let field = tree.field(node);

        if kind.is_function_declaration() {
            if let Some(body) = tree.child_by_field(node, Field::Body) {
                return Some(PositionRef::Inside(body));
            }
        }

        if parent_kind == SyntaxKind::ArrowFunction
            && field == Some(Field::Body)
            && kind != SyntaxKind::StatementBlock
        {
            return Some(PositionRef::Before { node, prefix: RETURN_PREFIX });
        }

        if tree.is_parameter(node) {
            let body = tree
                .parameter_owner(node)
                .and_then(|owner| tree.child_by_field(owner, Field::Body));
            if let Some(body) = body {
                return Some(if tree.kind(body) == SyntaxKind::StatementBlock {
                    PositionRef::Inside(body)
                } else {
                    PositionRef::Before { node: body, prefix: RETURN_PREFIX }
                });
            }
        }

        match parent_kind {
            SyntaxKind::IfStatement if field == Some(Field::Condition) => {
                return Some(PositionRef::Before { node: parent, prefix: "" });
            }
            SyntaxKind::WhileStatement | SyntaxKind::DoStatement => {
                if let Some(reference) = loop_body(tree, parent) {
                    return Some(reference);
                }
            }
            SyntaxKind::ForInStatement => match field {
                Some(Field::Left) => {
                    if let Some(reference) = loop_body(tree, parent) {
                        return Some(reference);
                    }
                }
                Some(Field::Right) => return Some(PositionRef::Before { node: parent, prefix: "" }),
                _ => {}
            },
            SyntaxKind::ForStatement => {
                if let Some(reference) = loop_body(tree, parent) {
                    return Some(reference);
                }
            }
            _ => {}
        }

        if kind == SyntaxKind::ReturnStatement {
            return Some(PositionRef::Before { node, prefix: "" });
        }
        if kind.is_statement() {
            return Some(PositionRef::After(lift_export(tree, node)));
        }
        node = parent;
    }
}

fn loop_body(tree: &SyntaxTree, statement: NodeId) -> Option<PositionRef> {
    let body = tree.child_by_field(statement, Field::Body)?;
    Some(if tree.is_block_like(body) {
        PositionRef::Inside(body)
    } else {
        PositionRef::Before { node: body, prefix: "" }
    })
}

/// `export const x = 1` is one statement as far as placement goes.
fn lift_export(tree: &SyntaxTree, node: NodeId) -> NodeId {
    let mut node = node;
    while let Some(parent) = tree.parent(node).filter(|&p| tree.kind(p) == SyntaxKind::ExportStatement) {
        node = parent;
    }
    node
}

/// Turns a reference into an edit. Next to a node whose parent cannot hold a
/// bare statement, the node is rewritten into a new block that carries both
/// its original text and the log.
pub fn render(tree: &SyntaxTree, reference: PositionRef, log: &str) -> TextEdit {
    let in_block = |id: NodeId| tree.parent(id).is_some_and(|p| tree.is_block_like(p));
    match reference {
        PositionRef::Inside(container) => {
            TextEdit::insert(tree.node(container).first_token_end, format!("\n{log}"))
        }
        PositionRef::Before { node, prefix } => {
            let n = tree.node(node);
            if in_block(node) {
                TextEdit::insert(n.start, format!("{log}\n{prefix}"))
            } else {
                TextEdit::replace(
                    n.full_start,
                    n.end,
                    format!(" {{\n{log}\n{prefix}{}\n}}", tree.text(node)),
                )
            }
        }
        PositionRef::After(node) => {
            let n = tree.node(node);
            if in_block(node) {
                TextEdit::insert(n.end, format!("\n{log}"))
            } else {
                TextEdit::replace(n.full_start, n.end, format!(" {{\n{}\n{log}\n}}", tree.text(node)))
            }
        }
    }
}
