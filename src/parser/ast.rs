// Syntax tree definitions for the C front end

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location information for diagnostics and findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Grammar nonterminal a [`SyntaxNode`] was built from.
///
/// One variant per production the parser recognises. Binary expression
/// levels keep their own variant so that a tree dump reads like the
/// grammar it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Top level
    TranslationUnit,
    FunctionDefinition,
    DeclarationList,

    // Declarations
    Declaration,
    DeclarationSpecifiers,
    StorageClassSpecifier,
    TypeSpecifier,
    TypeQualifier,
    StructSpecifier,
    UnionSpecifier,
    EnumSpecifier,
    TypedefName,
    InitDeclaratorList,
    InitDeclarator,
    InitializerList,
    Declarator,
    DirectDeclarator,
    Pointer,
    ArrayDimension,
    ParameterList,
    ParameterDeclaration,
    IdentifierList,
    Ellipsis,
    TypeName,

    // Statements
    CompoundStatement,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    ReturnStatement,
    LabeledStatement,

    // Expressions, loosest binding first
    Expression,
    AssignmentExpression,
    AssignmentOperator,
    ConditionalExpression,
    LogicalOrExpression,
    LogicalAndExpression,
    InclusiveOrExpression,
    ExclusiveOrExpression,
    AndExpression,
    EqualityExpression,
    RelationalExpression,
    ShiftExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    CastExpression,
    UnaryExpression,
    PostfixExpression,
    FunctionCall,
    ArgumentExpressionList,
    ArrayAccess,
    Identifier,
    Constant,
    StringLiteral,
}

impl NodeKind {
    /// Grammar-style name, e.g. `function_definition`.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation_unit",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::DeclarationList => "declaration_list",
            NodeKind::Declaration => "declaration",
            NodeKind::DeclarationSpecifiers => "declaration_specifiers",
            NodeKind::StorageClassSpecifier => "storage_class_specifier",
            NodeKind::TypeSpecifier => "type_specifier",
            NodeKind::TypeQualifier => "type_qualifier",
            NodeKind::StructSpecifier => "struct_specifier",
            NodeKind::UnionSpecifier => "union_specifier",
            NodeKind::EnumSpecifier => "enum_specifier",
            NodeKind::TypedefName => "typedef_name",
            NodeKind::InitDeclaratorList => "init_declarator_list",
            NodeKind::InitDeclarator => "init_declarator",
            NodeKind::InitializerList => "initializer_list",
            NodeKind::Declarator => "declarator",
            NodeKind::DirectDeclarator => "direct_declarator",
            NodeKind::Pointer => "pointer",
            NodeKind::ArrayDimension => "array_dimension",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::ParameterDeclaration => "parameter_declaration",
            NodeKind::IdentifierList => "identifier_list",
            NodeKind::Ellipsis => "ellipsis",
            NodeKind::TypeName => "type_name",
            NodeKind::CompoundStatement => "compound_statement",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::IfStatement => "if_statement",
            NodeKind::WhileStatement => "while_statement",
            NodeKind::ReturnStatement => "return_statement",
            NodeKind::LabeledStatement => "labeled_statement",
            NodeKind::Expression => "expression",
            NodeKind::AssignmentExpression => "assignment_expression",
            NodeKind::AssignmentOperator => "assignment_operator",
            NodeKind::ConditionalExpression => "conditional_expression",
            NodeKind::LogicalOrExpression => "logical_or_expression",
            NodeKind::LogicalAndExpression => "logical_and_expression",
            NodeKind::InclusiveOrExpression => "inclusive_or_expression",
            NodeKind::ExclusiveOrExpression => "exclusive_or_expression",
            NodeKind::AndExpression => "and_expression",
            NodeKind::EqualityExpression => "equality_expression",
            NodeKind::RelationalExpression => "relational_expression",
            NodeKind::ShiftExpression => "shift_expression",
            NodeKind::AdditiveExpression => "additive_expression",
            NodeKind::MultiplicativeExpression => "multiplicative_expression",
            NodeKind::CastExpression => "cast_expression",
            NodeKind::UnaryExpression => "unary_expression",
            NodeKind::PostfixExpression => "postfix_expression",
            NodeKind::FunctionCall => "function_call",
            NodeKind::ArgumentExpressionList => "argument_expression_list",
            NodeKind::ArrayAccess => "array_access",
            NodeKind::Identifier => "identifier",
            NodeKind::Constant => "constant",
            NodeKind::StringLiteral => "string_literal",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the syntax tree.
///
/// Children are owned; the tree has no sharing and no back edges. `value`
/// holds the identifier name, literal lexeme or operator text when the
/// production has one, and `location` is the first token of the node's
/// content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub children: Vec<SyntaxNode>,
    pub value: Option<String>,
    pub location: Option<SourceLocation>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            kind,
            children: Vec::new(),
            value: None,
            location: Some(location),
        }
    }

    /// New node that starts where `first` starts and owns it as its first child.
    pub fn wrap(kind: NodeKind, first: SyntaxNode) -> Self {
        Self {
            kind,
            location: first.location,
            value: None,
            children: vec![first],
        }
    }

    pub fn leaf(kind: NodeKind, value: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(kind, location).with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: SyntaxNode) {
        self.children.push(child);
    }

    /// Line of the node, if it was built from a token.
    pub fn line(&self) -> Option<usize> {
        self.location.map(|loc| loc.line)
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn child(&self, index: usize) -> Option<&SyntaxNode> {
        self.children.get(index)
    }

    /// First direct child of the given kind.
    pub fn find_child(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Indented multi-line dump, one node per line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.kind.as_str());
        if let Some(value) = &self.value {
            out.push_str(&format!(" {:?}", value));
        }
        if let Some(line) = self.line() {
            out.push_str(&format!(" @{}", line));
        }
        out.push('\n');
        for child in &self.children {
            child.write_pretty(out, depth + 1);
        }
    }
}

/// Iterator returned by [`SyntaxNode::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
