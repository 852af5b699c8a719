//! Statement parsing implementation
//!
//! This module handles the statement forms of the C subset:
//!
//! - Compound statements: `{ ... }` holding declarations and statements
//! - Control flow: `if` with optional `else`, `while`
//! - Jump statements: `return`
//! - Labeled statements: `name: statement`
//! - Expression statements: function calls, assignments, empty `;`
//!
//! `for`, `do`, `switch`, `break`, `continue` and `goto` are not part of the
//! grammar; they surface as syntax errors from the expression parser.
//!
//! # Grammar
//!
//! ```text
//! compound_stmt ::= "{" (declaration | statement)* "}"
//! statement     ::= compound_stmt | if_stmt | while_stmt | return_stmt
//!                 | labeled_stmt | expr_stmt
//! if_stmt       ::= "if" "(" expression ")" statement ("else" statement)?
//! while_stmt    ::= "while" "(" expression ")" statement
//! return_stmt   ::= "return" expression? ";"
//! labeled_stmt  ::= identifier ":" statement
//! expr_stmt     ::= expression? ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::{NodeKind, SyntaxNode};
use crate::parser::lexer::{Keyword, TokenKind};
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse a brace-delimited block
    pub(crate) fn parse_compound_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let open = self.expect(TokenKind::LBrace, "to begin block")?;
        let mut block = SyntaxNode::new(NodeKind::CompoundStatement, open.location);

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            block.push(self.parse_block_item()?);
        }

        self.expect(TokenKind::RBrace, "to close block")?;
        Ok(block)
    }

    fn parse_block_item(&mut self) -> Result<SyntaxNode, ParseError> {
        if self.starts_declaration() {
            self.parse_declaration()
        } else {
            self.parse_statement()
        }
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> Result<SyntaxNode, ParseError> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenKind::Identifier if self.peek_nth_kind(1) == TokenKind::Colon => {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// Parse if statement: if (cond) then_stmt [else else_stmt]
    fn parse_if_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "after if condition")?;

        let mut node = SyntaxNode::new(NodeKind::IfStatement, keyword.location)
            .with_child(condition)
            .with_child(self.parse_statement()?);

        if self.check_keyword(Keyword::Else) {
            self.advance();
            node.push(self.parse_statement()?);
        }

        Ok(node)
    }

    /// Parse while statement: while (cond) body
    fn parse_while_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.advance();
        self.expect(TokenKind::LParen, "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "after while condition")?;
        let body = self.parse_statement()?;

        Ok(SyntaxNode::new(NodeKind::WhileStatement, keyword.location)
            .with_child(condition)
            .with_child(body))
    }

    /// Parse return statement: return [expr];
    fn parse_return_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.advance();
        let mut node = SyntaxNode::new(NodeKind::ReturnStatement, keyword.location);

        if !self.check(TokenKind::Semicolon) {
            node.push(self.parse_expression()?);
        }

        self.expect(TokenKind::Semicolon, "after return statement")?;
        Ok(node)
    }

    /// Parse labeled statement: label: stmt
    fn parse_labeled_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let label = self.advance();
        self.advance(); // ':'
        let statement = self.parse_statement()?;

        Ok(SyntaxNode::leaf(NodeKind::LabeledStatement, label.text, label.location)
            .with_child(statement))
    }

    /// Parse expression statement; a lone `;` has no children
    fn parse_expression_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut node = SyntaxNode::new(NodeKind::ExpressionStatement, self.current_location());

        if !self.check(TokenKind::Semicolon) {
            node.push(self.parse_expression()?);
        }

        self.expect(TokenKind::Semicolon, "after expression")?;
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{NodeKind, SyntaxNode};
    use crate::parser::parse::{parse, ParseError};

    fn body(source: &str) -> SyntaxNode {
        let tree = parse(source).unwrap();
        let func = &tree.children[0];
        func.find_child(NodeKind::CompoundStatement)
            .cloned()
            .expect("function body")
    }

    #[test]
    fn test_block_mixes_declarations_and_statements() {
        let block = body("void f() { char buf[8]; gets(buf); ; }");
        let kinds: Vec<NodeKind> = block.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Declaration,
                NodeKind::ExpressionStatement,
                NodeKind::ExpressionStatement,
            ]
        );
        assert!(block.children[2].children.is_empty());
    }

    #[test]
    fn test_if_else_chain() {
        let block = body(
            "void f(int x) {\n if (x) return;\n else if (x > 1) x = 2;\n else { x = 3; }\n}",
        );
        let stmt = &block.children[0];
        assert_eq!(stmt.kind, NodeKind::IfStatement);
        assert_eq!(stmt.line(), Some(2));
        assert_eq!(stmt.children.len(), 3);
        assert_eq!(stmt.children[1].kind, NodeKind::ReturnStatement);
        assert!(stmt.children[1].children.is_empty());

        // dangling else binds to the nearest if
        let nested = &stmt.children[2];
        assert_eq!(nested.kind, NodeKind::IfStatement);
        assert_eq!(nested.children.len(), 3);
        assert_eq!(nested.children[2].kind, NodeKind::CompoundStatement);
    }

    #[test]
    fn test_while_and_labeled() {
        let block = body("int f(int n) { again: while (n) n = n - 1; return n; }");
        let labeled = &block.children[0];
        assert_eq!(labeled.kind, NodeKind::LabeledStatement);
        assert_eq!(labeled.value(), Some("again"));
        assert_eq!(labeled.children[0].kind, NodeKind::WhileStatement);
        assert_eq!(block.children[1].kind, NodeKind::ReturnStatement);
        assert_eq!(block.children[1].children.len(), 1);
    }

    #[test]
    fn test_unsupported_loops_are_syntax_errors() {
        let err = parse("void f() { for (;;) {} }").unwrap_err();
        match err {
            ParseError::UnexpectedToken { found, .. } => assert_eq!(found, "'for'"),
            other => panic!("Expected unexpected token error, got {:?}", other),
        }
        assert!(parse("void f() { do { } while (1); }").is_err());
        assert!(parse("void f() { break; }").is_err());
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("void f() {\n gets(buf)\n}").unwrap_err();
        assert_eq!(err.line(), 3);
    }
}
