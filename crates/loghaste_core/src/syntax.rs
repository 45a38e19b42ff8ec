/// Grammar productions the engines care about. Everything else collapses into
/// `Other`, parse errors into `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Program,
    StatementBlock,
    SwitchBody,
    SwitchCase,
    SwitchDefault,

    // names
    Identifier,
    PropertyIdentifier,
    ShorthandPropertyIdentifier,
    PrivatePropertyIdentifier,
    This,
    Super,

    // literals
    Number,
    String,
    TemplateString,
    Regex,
    True,
    False,
    Null,
    Undefined,

    // expressions
    MemberExpression,
    SubscriptExpression,
    CallExpression,
    NewExpression,
    ParenthesizedExpression,
    AssignmentExpression,
    AugmentedAssignmentExpression,
    BinaryExpression,
    UnaryExpression,
    UpdateExpression,
    TernaryExpression,
    AwaitExpression,
    YieldExpression,
    SequenceExpression,
    ArrowFunction,
    FunctionExpression,
    GeneratorFunction,
    ClassExpression,
    Array,
    Object,
    Pair,
    ComputedPropertyName,
    AsExpression,
    SatisfiesExpression,
    NonNullExpression,
    TypeAssertion,
    JsxElement,
    JsxSelfClosingElement,
    MetaProperty,
    Arguments,

    // declarations and parameters
    FunctionDeclaration,
    GeneratorFunctionDeclaration,
    ClassDeclaration,
    MethodDefinition,
    FormalParameters,
    RequiredParameter,
    OptionalParameter,
    AssignmentPattern,
    ObjectAssignmentPattern,
    LexicalDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    TypeDeclaration,

    // statements
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    ElseClause,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForInStatement,
    SwitchStatement,
    TryStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    EmptyStatement,
    LabeledStatement,
    DebuggerStatement,
    WithStatement,
    ImportStatement,
    ExportStatement,

    Comment,
    Error,
    Other,
}

impl SyntaxKind {
    /// Maps a tree-sitter node kind from the JavaScript or TypeScript grammar.
    pub fn from_grammar(kind: &str) -> Self {
        use SyntaxKind::*;
        match kind {
            "program" => Program,
            "statement_block" => StatementBlock,
            "switch_body" => SwitchBody,
            "switch_case" => SwitchCase,
            "switch_default" => SwitchDefault,

            "identifier" => Identifier,
            "property_identifier" => PropertyIdentifier,
            "shorthand_property_identifier" => ShorthandPropertyIdentifier,
            "private_property_identifier" => PrivatePropertyIdentifier,
            "this" => This,
            "super" => Super,

            "number" => Number,
            "string" => String,
            "template_string" => TemplateString,
            "regex" => Regex,
            "true" => True,
            "false" => False,
            "null" => Null,
            "undefined" => Undefined,

            "member_expression" => MemberExpression,
            "subscript_expression" => SubscriptExpression,
            "call_expression" => CallExpression,
            "new_expression" => NewExpression,
            "parenthesized_expression" => ParenthesizedExpression,
            "assignment_expression" => AssignmentExpression,
            "augmented_assignment_expression" => AugmentedAssignmentExpression,
            "binary_expression" => BinaryExpression,
            "unary_expression" => UnaryExpression,
            "update_expression" => UpdateExpression,
            "ternary_expression" => TernaryExpression,
            "await_expression" => AwaitExpression,
            "yield_expression" => YieldExpression,
            "sequence_expression" => SequenceExpression,
            "arrow_function" => ArrowFunction,
            // the 0.20 grammars call function expressions `function`
            "function" | "function_expression" => FunctionExpression,
            "generator_function" => GeneratorFunction,
            "class" => ClassExpression,
            "array" => Array,
            "object" => Object,
            "pair" => Pair,
            "computed_property_name" => ComputedPropertyName,
            "as_expression" => AsExpression,
            "satisfies_expression" => SatisfiesExpression,
            "non_null_expression" => NonNullExpression,
            "type_assertion" => TypeAssertion,
            "jsx_element" => JsxElement,
            "jsx_self_closing_element" => JsxSelfClosingElement,
            "meta_property" => MetaProperty,
            "arguments" => Arguments,

            "function_declaration" => FunctionDeclaration,
            "generator_function_declaration" => GeneratorFunctionDeclaration,
            "class_declaration" | "abstract_class_declaration" => ClassDeclaration,
            "method_definition" => MethodDefinition,
            "formal_parameters" => FormalParameters,
            "required_parameter" => RequiredParameter,
            "optional_parameter" => OptionalParameter,
            "assignment_pattern" => AssignmentPattern,
            "object_assignment_pattern" => ObjectAssignmentPattern,
            "lexical_declaration" => LexicalDeclaration,
            "variable_declaration" => VariableDeclaration,
            "variable_declarator" => VariableDeclarator,
            "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration"
            | "ambient_declaration"
            | "function_signature"
            | "import_alias"
            | "module" => TypeDeclaration,

            "expression_statement" => ExpressionStatement,
            "return_statement" => ReturnStatement,
            "if_statement" => IfStatement,
            "else_clause" => ElseClause,
            "while_statement" => WhileStatement,
            "do_statement" => DoStatement,
            "for_statement" => ForStatement,
            // covers both `for...in` and `for...of`
            "for_in_statement" => ForInStatement,
            "switch_statement" => SwitchStatement,
            "try_statement" => TryStatement,
            "throw_statement" => ThrowStatement,
            "break_statement" => BreakStatement,
            "continue_statement" => ContinueStatement,
            "empty_statement" => EmptyStatement,
            "labeled_statement" => LabeledStatement,
            "debugger_statement" => DebuggerStatement,
            "with_statement" => WithStatement,
            "import_statement" => ImportStatement,
            "export_statement" => ExportStatement,

            "comment" => Comment,
            "ERROR" => Error,
            _ => Other,
        }
    }

    /// A scope that holds a statement list directly, so a bare statement can be
    /// spliced into it without wrapping braces.
    pub fn is_block_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::Program
                | SyntaxKind::StatementBlock
                | SyntaxKind::SwitchCase
                | SyntaxKind::SwitchDefault
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::Number | SyntaxKind::String | SyntaxKind::TemplateString | SyntaxKind::Regex
        )
    }

    pub fn is_expression(self) -> bool {
        use SyntaxKind::*;
        self.is_literal()
            || matches!(
                self,
                Identifier
                    | PropertyIdentifier
                    | ShorthandPropertyIdentifier
                    | PrivatePropertyIdentifier
                    | This
                    | Super
                    | True
                    | False
                    | Null
                    | Undefined
                    | MemberExpression
                    | SubscriptExpression
                    | CallExpression
                    | NewExpression
                    | ParenthesizedExpression
                    | AssignmentExpression
                    | AugmentedAssignmentExpression
                    | BinaryExpression
                    | UnaryExpression
                    | UpdateExpression
                    | TernaryExpression
                    | AwaitExpression
                    | YieldExpression
                    | SequenceExpression
                    | ArrowFunction
                    | FunctionExpression
                    | GeneratorFunction
                    | ClassExpression
                    | Array
                    | Object
                    | AsExpression
                    | SatisfiesExpression
                    | NonNullExpression
                    | TypeAssertion
                    | JsxElement
                    | JsxSelfClosingElement
                    | MetaProperty
            )
    }

    pub fn is_statement(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            StatementBlock
                | FunctionDeclaration
                | GeneratorFunctionDeclaration
                | ClassDeclaration
                | LexicalDeclaration
                | VariableDeclaration
                | TypeDeclaration
                | ExpressionStatement
                | ReturnStatement
                | IfStatement
                | WhileStatement
                | DoStatement
                | ForStatement
                | ForInStatement
                | SwitchStatement
                | TryStatement
                | ThrowStatement
                | BreakStatement
                | ContinueStatement
                | EmptyStatement
                | LabeledStatement
                | DebuggerStatement
                | WithStatement
                | ImportStatement
                | ExportStatement
        )
    }

    pub fn is_function_declaration(self) -> bool {
        matches!(self, SyntaxKind::FunctionDeclaration | SyntaxKind::GeneratorFunctionDeclaration)
    }

    /// Anything that owns a parameter list and (usually) a body.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::GeneratorFunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::GeneratorFunction
                | SyntaxKind::ArrowFunction
                | SyntaxKind::MethodDefinition
        )
    }

    pub fn is_declaration_list(self) -> bool {
        matches!(self, SyntaxKind::LexicalDeclaration | SyntaxKind::VariableDeclaration)
    }

    /// Statements whose condition sits in parentheses owned by the statement.
    pub fn has_parenthesized_condition(self) -> bool {
        matches!(
            self,
            SyntaxKind::IfStatement
                | SyntaxKind::WhileStatement
                | SyntaxKind::DoStatement
                | SyntaxKind::SwitchStatement
                | SyntaxKind::WithStatement
        )
    }
}

/// The role a node plays in its parent, taken from the grammar's field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Value,
    Body,
    Condition,
    Consequence,
    Alternative,
    Function,
    Constructor,
    Arguments,
    Object,
    Property,
    Index,
    Key,
    Left,
    Right,
    Initializer,
    Increment,
    Parameters,
    Parameter,
    Pattern,
}

impl Field {
    pub fn from_grammar(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Field::Name,
            "value" => Field::Value,
            "body" => Field::Body,
            "condition" => Field::Condition,
            "consequence" => Field::Consequence,
            "alternative" => Field::Alternative,
            "function" => Field::Function,
            "constructor" => Field::Constructor,
            "arguments" => Field::Arguments,
            "object" => Field::Object,
            "property" => Field::Property,
            "index" => Field::Index,
            "key" => Field::Key,
            "left" => Field::Left,
            "right" => Field::Right,
            "initializer" => Field::Initializer,
            "increment" => Field::Increment,
            "parameters" => Field::Parameters,
            "parameter" => Field::Parameter,
            "pattern" => Field::Pattern,
            _ => return None,
        })
    }
}
