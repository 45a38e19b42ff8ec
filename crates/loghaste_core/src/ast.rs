use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::syntax::{Field, SyntaxKind};
use crate::HasteError;

/// Dialect of the document, picked from the host's language id or a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Js,
    Jsx,
    Ts,
    Tsx,
}

impl ScriptKind {
    pub fn from_language_id(id: &str) -> Option<Self> {
        match id {
            "javascript" => Some(ScriptKind::Js),
            "javascriptreact" => Some(ScriptKind::Jsx),
            "typescript" => Some(ScriptKind::Ts),
            "typescriptreact" => Some(ScriptKind::Tsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "mjs" | "cjs" => Some(ScriptKind::Js),
            "jsx" => Some(ScriptKind::Jsx),
            "ts" | "mts" | "cts" => Some(ScriptKind::Ts),
            "tsx" => Some(ScriptKind::Tsx),
            _ => None,
        }
    }

    pub fn language_id(self) -> &'static str {
        match self {
            ScriptKind::Js => "javascript",
            ScriptKind::Jsx => "javascriptreact",
            ScriptKind::Ts => "typescript",
            ScriptKind::Tsx => "typescriptreact",
        }
    }

    fn grammar(self) -> Language {
        match self {
            // the JavaScript grammar parses JSX as well
            ScriptKind::Js | ScriptKind::Jsx => tree_sitter_javascript::language(),
            ScriptKind::Ts => tree_sitter_typescript::language_typescript(),
            ScriptKind::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }
}

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Role in the parent production, if the grammar names one.
    pub field: Option<Field>,
    /// First byte of the node itself, leading trivia excluded.
    pub start: usize,
    /// First byte after the preceding token, so leading trivia is included.
    pub full_start: usize,
    pub end: usize,
    /// End of the node's first token (the `{` of a block).
    pub first_token_end: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Immutable arena of the named, non-comment nodes of one parse. Parents are
/// plain indices, so walking upward never needs a back reference.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    source: String,
    has_errors: bool,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn field(&self, id: NodeId) -> Option<Field> {
        self.node(id).field
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn parent_kind(&self, id: NodeId) -> Option<SyntaxKind> {
        self.parent(id).map(|p| self.kind(p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child_by_field(&self, id: NodeId, field: Field) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.field(c) == Some(field))
    }

    pub fn text(&self, id: NodeId) -> &str {
        let n = self.node(id);
        &self.source[n.start..n.end]
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when tree-sitter had to recover from a syntax error somewhere.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_block_like(&self, id: NodeId) -> bool {
        self.kind(id).is_block_like()
    }

    /// A named child of a parameter list, or the bare parameter of `x => ...`.
    pub fn is_parameter(&self, id: NodeId) -> bool {
        match self.parent_kind(id) {
            Some(SyntaxKind::FormalParameters) => true,
            Some(SyntaxKind::ArrowFunction) => self.field(id) == Some(Field::Parameter),
            _ => false,
        }
    }

    /// The function that declares parameter `id`.
    pub fn parameter_owner(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let owner = match self.kind(parent) {
            SyntaxKind::FormalParameters => self.parent(parent)?,
            _ => parent,
        };
        self.kind(owner).is_function_like().then_some(owner)
    }

    /// `console.log(...)`, matched on identifier text only.
    pub fn is_log_call(&self, id: NodeId) -> bool {
        if self.kind(id) != SyntaxKind::CallExpression {
            return false;
        }
        let Some(callee) = self.child_by_field(id, Field::Function) else {
            return false;
        };
        if self.kind(callee) != SyntaxKind::MemberExpression {
            return false;
        }
        let object = self.child_by_field(callee, Field::Object);
        let property = self.child_by_field(callee, Field::Property);
        match (object, property) {
            (Some(o), Some(p)) => {
                self.kind(o) == SyntaxKind::Identifier
                    && self.text(o) == "console"
                    && self.kind(p) == SyntaxKind::PropertyIdentifier
                    && self.text(p) == "log"
            }
            _ => false,
        }
    }
}

/// tree-sitter parser bound to one dialect.
pub struct JsAst {
    parser: Parser,
}

impl JsAst {
    pub fn new(script: ScriptKind) -> Result<Self, HasteError> {
        let mut parser = Parser::new();
        parser.set_language(script.grammar())?;
        Ok(Self { parser })
    }

    /// Parses `src` into an arena. `None` only when tree-sitter gives up.
    pub fn parse(&mut self, src: &str) -> Option<SyntaxTree> {
        let tree = self.parser.parse(src, None)?;
        Some(build_arena(tree.root_node(), src))
    }
}

/// Parses a host document, or returns `None` for languages outside the family.
pub fn parse_document(language_id: &str, src: &str) -> Result<Option<SyntaxTree>, HasteError> {
    let Some(script) = ScriptKind::from_language_id(language_id) else {
        return Ok(None);
    };
    let tree = JsAst::new(script)?.parse(src);
    if tree.is_none() {
        tracing::warn!(language_id, "tree-sitter abandoned the parse");
    }
    Ok(tree)
}

struct Pending<'t> {
    node: Node<'t>,
    parent: Option<NodeId>,
    field: Option<Field>,
    parent_full_start: usize,
}

fn build_arena(root: Node<'_>, src: &str) -> SyntaxTree {
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let mut stack = vec![Pending { node: root, parent: None, field: None, parent_full_start: 0 }];

    while let Some(Pending { node, parent, field, parent_full_start }) = stack.pop() {
        let id = NodeId(nodes.len() as u32);
        let (start, end, full_start) = match parent {
            // the root always spans the whole document
            None => (0, src.len(), 0),
            Some(_) => (
                node.start_byte(),
                content_end(node),
                node.prev_sibling().map_or(parent_full_start, |s| s.end_byte()),
            ),
        };
        nodes.push(SyntaxNode {
            kind: SyntaxKind::from_grammar(node.kind()),
            field,
            start,
            full_start,
            end,
            first_token_end: first_token_end(node),
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            nodes[p.index()].children.push(id);
        }

        let mut pending = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() && child.kind() != "comment" {
                    pending.push(Pending {
                        node: child,
                        parent: Some(id),
                        field: cursor.field_name().and_then(Field::from_grammar),
                        parent_full_start: full_start,
                    });
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        // reversed so children are popped, and numbered, in document order
        stack.extend(pending.into_iter().rev());
    }

    SyntaxTree { nodes, source: src.to_string(), has_errors: root.has_error() }
}

/// End of the last real token under `node`. tree-sitter lets a statement
/// closed by an automatic semicolon run on over a trailing comment.
fn content_end(node: Node<'_>) -> usize {
    let mut n = node;
    loop {
        let last = (0..n.child_count())
            .rev()
            .filter_map(|i| n.child(i))
            .find(|c| c.kind() != "comment" && c.end_byte() > c.start_byte());
        match last {
            Some(c) => n = c,
            None => return n.end_byte(),
        }
    }
}

fn first_token_end(node: Node<'_>) -> usize {
    let mut n = node;
    while let Some(c) = n.child(0) {
        n = c;
    }
    n.end_byte()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> SyntaxTree {
        JsAst::new(ScriptKind::Js).unwrap().parse(src).unwrap()
    }

    fn find(tree: &SyntaxTree, kind: SyntaxKind) -> NodeId {
        (0..tree.len() as u32)
            .map(NodeId)
            .find(|&id| tree.kind(id) == kind)
            .unwrap()
    }

    #[test]
    fn children_are_in_document_order_with_parent_links() {
        let tree = parse("a();\nb();\nc();\n");
        let root = tree.root();
        let texts: Vec<&str> = tree.children(root).iter().map(|&c| tree.text(c)).collect();
        assert_eq!(texts, vec!["a();", "b();", "c();"]);
        for &c in tree.children(root) {
            assert_eq!(tree.parent(c), Some(root));
        }
    }

    #[test]
    fn full_start_includes_leading_trivia() {
        let tree = parse("if (x)   foo();");
        let stmt = find(&tree, SyntaxKind::ExpressionStatement);
        let node = tree.node(stmt);
        assert_eq!(node.full_start, "if (x)".len());
        assert_eq!(node.start, "if (x)   ".len());
    }

    #[test]
    fn block_first_token_is_the_brace() {
        let tree = parse("function f() {\n}");
        let block = find(&tree, SyntaxKind::StatementBlock);
        let node = tree.node(block);
        assert_eq!(node.first_token_end, node.start + 1);
    }

    #[test]
    fn comments_are_not_arena_nodes() {
        let tree = parse("// hello\nfoo();");
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn trailing_comment_is_not_part_of_the_statement() {
        let tree = parse("foo() // note\nbar()\n");
        let texts: Vec<&str> = tree.children(tree.root()).iter().map(|&c| tree.text(c)).collect();
        assert_eq!(texts, vec!["foo()", "bar()"]);

        let tree = parse("if (x) foo() // note\n");
        let stmt = tree.children(tree.root())[0];
        assert_eq!(tree.text(stmt), "if (x) foo()");
    }

    #[test]
    fn field_roles_are_recorded() {
        let tree = parse("obj.field;");
        let member = find(&tree, SyntaxKind::MemberExpression);
        let property = tree.child_by_field(member, Field::Property).unwrap();
        assert_eq!(tree.text(property), "field");
    }

    #[test]
    fn recognises_console_log_calls_only() {
        let tree = parse("console.log(1); console.warn(2); log(3);");
        let calls: Vec<&str> = (0..tree.len() as u32)
            .map(NodeId)
            .filter(|&id| tree.is_log_call(id))
            .map(|id| tree.text(id))
            .collect();
        assert_eq!(calls, vec!["console.log(1)"]);
    }

    #[test]
    fn arrow_shorthand_parameter_is_a_parameter() {
        let tree = parse("const f = x => x + 1;");
        let arrow = find(&tree, SyntaxKind::ArrowFunction);
        let param = tree.children(arrow)[0];
        assert!(tree.is_parameter(param));
        assert_eq!(tree.parameter_owner(param), Some(arrow));
    }

    #[test]
    fn language_ids_outside_the_family_are_not_parsed() {
        assert!(parse_document("python", "x = 1").unwrap().is_none());
        let tree = parse_document("typescriptreact", "const a = <div />;").unwrap().unwrap();
        assert!(!tree.has_errors());
    }

    #[test]
    fn extension_detection() {
        assert_eq!(ScriptKind::from_path(Path::new("a/b.MJS")), Some(ScriptKind::Js));
        assert_eq!(ScriptKind::from_path(Path::new("c.tsx")), Some(ScriptKind::Tsx));
        assert_eq!(ScriptKind::from_path(Path::new("README.md")), None);
    }
}
