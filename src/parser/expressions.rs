//! Expression parsing implementation
//!
//! This module handles parsing of C expressions using one method per
//! precedence level for binary operators and recursive descent for the
//! other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, characters, strings (adjacent strings are merged)
//! - Identifiers
//! - Binary operators: arithmetic, shift, comparison, bitwise, logical
//! - Unary operators: `&`, `*`, `+`, `-`, `~`, `!`, `++`, `--`, `sizeof`
//! - Postfix: `[]`, `()`, `.`, `->`, `++`, `--`
//! - Ternary: `? :`
//! - Assignment and compound assignment (right-associative)
//! - Comma expressions
//! - Type casts: `(type)expr`
//!
//! # Tree shape
//!
//! Every binary level folds left: `a - b - c` becomes
//! `additive(additive(a, b), c)`. A level that matches no operator returns
//! its operand unchanged, so `x` parses to a bare `identifier` rather than a
//! tower of single-child wrappers. Binary nodes carry the operator text as
//! their value and the location of their left operand.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::{NodeKind, SyntaxNode};
use crate::parser::lexer::{Keyword, TokenKind};
use crate::parser::parse::{ParseError, Parser};

type LevelFn = fn(&mut Parser) -> Result<SyntaxNode, ParseError>;

impl Parser {
    /// Parse expression (top-level entry point, includes the comma operator)
    pub(crate) fn parse_expression(&mut self) -> Result<SyntaxNode, ParseError> {
        let first = self.parse_assignment()?;
        if !self.check(TokenKind::Comma) {
            return Ok(first);
        }

        let mut expr = SyntaxNode::wrap(NodeKind::Expression, first);
        while self.match_token(TokenKind::Comma) {
            expr.push(self.parse_assignment()?);
        }
        Ok(expr)
    }

    /// Parse assignment or conditional (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::assignment_expression)
    }

    fn assignment_expression(&mut self) -> Result<SyntaxNode, ParseError> {
        let lhs = self.parse_conditional()?;

        if !self.peek_kind().is_assignment_operator() {
            return Ok(lhs);
        }

        let op = self.advance();
        let operator = SyntaxNode::leaf(NodeKind::AssignmentOperator, op.text, op.location);
        let rhs = self.parse_assignment()?;

        Ok(SyntaxNode::wrap(NodeKind::AssignmentExpression, lhs)
            .with_child(operator)
            .with_child(rhs))
    }

    /// Parse ternary: condition ? true_expr : false_expr
    pub(crate) fn parse_conditional(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::conditional_expression)
    }

    fn conditional_expression(&mut self) -> Result<SyntaxNode, ParseError> {
        let condition = self.parse_logical_or()?;

        if !self.match_token(TokenKind::Question) {
            return Ok(condition);
        }

        let true_expr = self.parse_expression()?;
        self.expect(TokenKind::Colon, "in conditional expression")?;
        let false_expr = self.parse_conditional()?;

        Ok(SyntaxNode::wrap(NodeKind::ConditionalExpression, condition)
            .with_value("?")
            .with_child(true_expr)
            .with_child(false_expr))
    }

    /// Fold one left-associative binary level
    fn parse_binary_level(
        &mut self,
        kind: NodeKind,
        operators: &[TokenKind],
        operand: LevelFn,
    ) -> Result<SyntaxNode, ParseError> {
        let mut left = operand(self)?;

        while operators.contains(&self.peek_kind()) {
            let op = self.advance();
            let right = operand(self)?;
            left = SyntaxNode::wrap(kind, left)
                .with_value(op.text)
                .with_child(right);
        }

        Ok(left)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::LogicalOrExpression,
            &[TokenKind::OrOr],
            Parser::parse_logical_and,
        )
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::LogicalAndExpression,
            &[TokenKind::AndAnd],
            Parser::parse_inclusive_or,
        )
    }

    /// Parse bitwise OR (|)
    fn parse_inclusive_or(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::InclusiveOrExpression,
            &[TokenKind::Pipe],
            Parser::parse_exclusive_or,
        )
    }

    /// Parse bitwise XOR (^)
    fn parse_exclusive_or(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::ExclusiveOrExpression,
            &[TokenKind::Caret],
            Parser::parse_and,
        )
    }

    /// Parse bitwise AND (&)
    fn parse_and(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::AndExpression,
            &[TokenKind::Amp],
            Parser::parse_equality,
        )
    }

    /// Parse equality (==, !=)
    fn parse_equality(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::EqualityExpression,
            &[TokenKind::EqEq, TokenKind::NotEq],
            Parser::parse_relational,
        )
    }

    /// Parse relational (<, >, <=, >=)
    fn parse_relational(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::RelationalExpression,
            &[TokenKind::Lt, TokenKind::Gt, TokenKind::Le, TokenKind::Ge],
            Parser::parse_shift,
        )
    }

    /// Parse shift (<<, >>)
    fn parse_shift(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::ShiftExpression,
            &[TokenKind::LtLt, TokenKind::GtGt],
            Parser::parse_additive,
        )
    }

    /// Parse additive (+, -)
    fn parse_additive(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::AdditiveExpression,
            &[TokenKind::Plus, TokenKind::Minus],
            Parser::parse_multiplicative,
        )
    }

    /// Parse multiplicative (*, /, %)
    fn parse_multiplicative(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_binary_level(
            NodeKind::MultiplicativeExpression,
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Parser::parse_cast,
        )
    }

    /// Parse cast: (type) expr, or fall through to unary
    fn parse_cast(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::cast_expression)
    }

    fn cast_expression(&mut self) -> Result<SyntaxNode, ParseError> {
        if !(self.check(TokenKind::LParen) && self.type_name_starts_at(1)) {
            return self.parse_unary();
        }

        let open = self.advance();
        let type_name = self.parse_type_name()?;
        self.expect(TokenKind::RParen, "after cast type")?;
        let operand = self.parse_cast()?;

        Ok(SyntaxNode::new(NodeKind::CastExpression, open.location)
            .with_child(type_name)
            .with_child(operand))
    }

    /// Parse unary operators and `sizeof`
    fn parse_unary(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::unary_expression)
    }

    fn unary_expression(&mut self) -> Result<SyntaxNode, ParseError> {
        match self.peek_kind() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = self.advance();
                let operand = self.parse_unary()?;
                Ok(SyntaxNode::leaf(NodeKind::UnaryExpression, op.text, op.location)
                    .with_child(operand))
            }
            TokenKind::Amp
            | TokenKind::Star
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Tilde
            | TokenKind::Bang => {
                let op = self.advance();
                let operand = self.parse_cast()?;
                Ok(SyntaxNode::leaf(NodeKind::UnaryExpression, op.text, op.location)
                    .with_child(operand))
            }
            TokenKind::Keyword(Keyword::Sizeof) => self.parse_sizeof(),
            _ => self.parse_postfix(),
        }
    }

    /// Parse sizeof expr or sizeof(type)
    fn parse_sizeof(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.advance();
        let mut node = SyntaxNode::leaf(NodeKind::UnaryExpression, "sizeof", keyword.location);

        if self.check(TokenKind::LParen) && self.type_name_starts_at(1) {
            self.advance();
            node.push(self.parse_type_name()?);
            self.expect(TokenKind::RParen, "after sizeof type")?;
        } else {
            node.push(self.parse_unary()?);
        }

        Ok(node)
    }

    /// Parse postfix: primary followed by [], (), ., ->, ++, --
    fn parse_postfix(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "after array index")?;
                    expr = SyntaxNode::wrap(NodeKind::ArrayAccess, expr).with_child(index);
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut call = SyntaxNode::wrap(NodeKind::FunctionCall, expr);
                    if !self.check(TokenKind::RParen) {
                        call.push(self.parse_argument_list()?);
                    }
                    self.expect(TokenKind::RParen, "after function arguments")?;
                    expr = call;
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let op = self.advance();
                    let member = self.expect_identifier(&format!("after '{}'", op.text))?;
                    expr = SyntaxNode::wrap(NodeKind::PostfixExpression, expr)
                        .with_value(op.text)
                        .with_child(SyntaxNode::leaf(
                            NodeKind::Identifier,
                            member.text,
                            member.location,
                        ));
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = self.advance();
                    expr = SyntaxNode::wrap(NodeKind::PostfixExpression, expr).with_value(op.text);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_argument_list(&mut self) -> Result<SyntaxNode, ParseError> {
        let first = self.parse_assignment()?;
        let mut args = SyntaxNode::wrap(NodeKind::ArgumentExpressionList, first);
        while self.match_token(TokenKind::Comma) {
            args.push(self.parse_assignment()?);
        }
        Ok(args)
    }

    /// Parse primary: identifier, literal, or parenthesized expression
    fn parse_primary(&mut self) -> Result<SyntaxNode, ParseError> {
        match self.peek_kind() {
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(SyntaxNode::leaf(NodeKind::Identifier, token.text, token.location))
            }
            TokenKind::Number | TokenKind::CharLiteral => {
                let token = self.advance();
                Ok(SyntaxNode::leaf(NodeKind::Constant, token.text, token.location))
            }
            TokenKind::StringLiteral => {
                let first = self.advance();
                let mut text = first.text;
                while self.check(TokenKind::StringLiteral) {
                    text.push(' ');
                    text.push_str(&self.advance().text);
                }
                Ok(SyntaxNode::leaf(NodeKind::StringLiteral, text, first.location))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "after expression")?;
                Ok(inner)
            }
            _ => Err(self.error_expected("expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{NodeKind, SyntaxNode};
    use crate::parser::parse::parse;

    /// Expression of the first statement in `f`'s body
    fn expr(body: &str) -> SyntaxNode {
        let source = format!("void f() {{ {} }}", body);
        let tree = parse(&source).unwrap();
        let block = tree.children[0]
            .find_child(NodeKind::CompoundStatement)
            .unwrap();
        block.children[0].children[0].clone()
    }

    #[test]
    fn test_binary_left_associative() {
        let e = expr("a - b - c;");
        assert_eq!(e.kind, NodeKind::AdditiveExpression);
        assert_eq!(e.value(), Some("-"));
        assert_eq!(e.children[0].kind, NodeKind::AdditiveExpression);
        assert_eq!(e.children[1].value(), Some("c"));
    }

    #[test]
    fn test_precedence() {
        let e = expr("x = a + b * c == d;");
        assert_eq!(e.kind, NodeKind::AssignmentExpression);
        let rhs = &e.children[2];
        assert_eq!(rhs.kind, NodeKind::EqualityExpression);
        let sum = &rhs.children[0];
        assert_eq!(sum.kind, NodeKind::AdditiveExpression);
        assert_eq!(sum.children[1].kind, NodeKind::MultiplicativeExpression);
    }

    #[test]
    fn test_assignment_right_associative() {
        let e = expr("a = b += c;");
        assert_eq!(e.kind, NodeKind::AssignmentExpression);
        assert_eq!(e.children[1].kind, NodeKind::AssignmentOperator);
        assert_eq!(e.children[1].value(), Some("="));
        let inner = &e.children[2];
        assert_eq!(inner.kind, NodeKind::AssignmentExpression);
        assert_eq!(inner.children[1].value(), Some("+="));
    }

    #[test]
    fn test_function_call_arguments() {
        let e = expr("strcpy(dest, \"a\" \"b\");");
        assert_eq!(e.kind, NodeKind::FunctionCall);
        assert_eq!(e.children[0].value(), Some("strcpy"));
        let args = &e.children[1];
        assert_eq!(args.kind, NodeKind::ArgumentExpressionList);
        assert_eq!(args.children.len(), 2);
        assert_eq!(args.children[1].value(), Some("\"a\" \"b\""));

        let e = expr("rand();");
        assert_eq!(e.kind, NodeKind::FunctionCall);
        assert_eq!(e.children.len(), 1);
    }

    #[test]
    fn test_parenthesized_callee() {
        let e = expr("(gets)(buf);");
        assert_eq!(e.kind, NodeKind::FunctionCall);
        assert_eq!(e.children[0].kind, NodeKind::Identifier);
        assert_eq!(e.children[0].value(), Some("gets"));
    }

    #[test]
    fn test_postfix_chain() {
        let e = expr("p->items[i].name++;");
        assert_eq!(e.kind, NodeKind::PostfixExpression);
        assert_eq!(e.value(), Some("++"));
        let member = &e.children[0];
        assert_eq!(member.value(), Some("."));
        assert_eq!(member.children[0].kind, NodeKind::ArrayAccess);
    }

    #[test]
    fn test_casts_and_sizeof() {
        let e = expr("n = (size_t) len + sizeof(int) + sizeof buf;");
        let sum = &e.children[2];
        let inner = &sum.children[0];
        assert_eq!(inner.children[0].kind, NodeKind::CastExpression);
        assert_eq!(inner.children[1].value(), Some("sizeof"));
        assert_eq!(inner.children[1].children[0].kind, NodeKind::TypeName);
        assert_eq!(sum.children[1].children[0].kind, NodeKind::Identifier);

        let e = expr("p = (char *) malloc(10);");
        let cast = &e.children[2];
        assert_eq!(cast.kind, NodeKind::CastExpression);
        assert_eq!(cast.children[1].kind, NodeKind::FunctionCall);
    }

    #[test]
    fn test_conditional_and_comma() {
        let e = expr("a ? b : c ? d : e;");
        assert_eq!(e.kind, NodeKind::ConditionalExpression);
        assert_eq!(e.children[2].kind, NodeKind::ConditionalExpression);

        let e = expr("a = 1, b = 2;");
        assert_eq!(e.kind, NodeKind::Expression);
        assert_eq!(e.children.len(), 2);
    }

    #[test]
    fn test_call_line_is_callee_line() {
        let tree = parse("void f() {\n\n  system(\n cmd);\n}").unwrap();
        let call = tree
            .descendants()
            .find(|n| n.kind == NodeKind::FunctionCall)
            .unwrap();
        assert_eq!(call.line(), Some(3));
    }
}
