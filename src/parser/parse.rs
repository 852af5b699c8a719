//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, token helpers, and the translation-unit entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: declaration specifiers, declarators, function definitions
//! - `statements`: compound, expression, `if`, `while`, `return`, labeled
//! - `expressions`: the C precedence chain from comma down to primary
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! There is no error recovery. The first production that cannot be matched
//! aborts the parse with a [`ParseError`] naming the offending token.

use crate::parser::ast::{NodeKind, SourceLocation, SyntaxNode};
use crate::parser::lexer::{Keyword, LexDiagnostic, Lexer, Token, TokenKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Syntax error: the parser met a token no production could accept.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    #[error("syntax error at line {}: unexpected {found}, expected {expected}", .location.line)]
    UnexpectedToken {
        found: String,
        expected: String,
        location: SourceLocation,
    },

    #[error("syntax error at end of input (line {}): expected {expected}", .location.line)]
    UnexpectedEof {
        expected: String,
        location: SourceLocation,
    },

    #[error("syntax error at line {}: nesting too deep", .location.line)]
    NestingTooDeep { location: SourceLocation },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { location, .. } => *location,
            ParseError::UnexpectedEof { location, .. } => *location,
            ParseError::NestingTooDeep { location } => *location,
        }
    }

    pub fn line(&self) -> usize {
        self.location().line
    }
}

/// Recursion budget for nested productions. Every recursive cycle in the
/// grammar passes through a guarded method, so running out of budget is a
/// [`ParseError`] rather than a stack overflow.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    depth: usize,
    diagnostics: Vec<LexDiagnostic>,
}

impl Parser {
    /// Tokenize `source` and prepare to parse it.
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        let mut parser = Self::from_tokens(tokens);
        parser.diagnostics = lexer.diagnostics().to_vec();
        parser
    }

    /// Parse an already tokenized stream. A missing trailing `Eof` is added.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let location = tokens
                .last()
                .map(|t| t.location)
                .unwrap_or_else(|| SourceLocation::new(1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", location));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Lexical anomalies skipped while tokenizing.
    pub fn lex_diagnostics(&self) -> &[LexDiagnostic] {
        &self.diagnostics
    }

    /// Parse the whole input into a `translation_unit` node
    pub fn parse_translation_unit(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut unit = SyntaxNode::new(NodeKind::TranslationUnit, self.current_location());

        while !self.is_at_end() {
            let decl = self.parse_external_declaration()?;
            unit.push(decl);
        }

        log::debug!(
            "parsed translation unit with {} external declarations",
            unit.children.len()
        );
        Ok(unit)
    }

    // ===== Helper methods =====

    /// Run `production` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                location: self.current_location(),
            });
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Kind of the token `n` positions ahead; `Eof` past the end.
    pub(crate) fn peek_nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.position + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn check_keyword(&self, kw: Keyword) -> bool {
        self.peek().is_keyword(kw)
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token and return it. `Eof` is never consumed.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, ctx: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&format!("{} {}", kind, ctx)))
        }
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect(TokenKind::Identifier, ctx)
    }

    /// Build an error describing the current token.
    pub(crate) fn error_expected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                location: token.location,
            }
        } else {
            ParseError::UnexpectedToken {
                found: token.to_string(),
                expected: expected.to_string(),
                location: token.location,
            }
        }
    }

    // ===== Declaration lookahead =====

    /// Whether the token `n` ahead is a keyword that can open a specifier list.
    pub(crate) fn is_specifier_keyword_at(&self, n: usize) -> bool {
        match self.peek_nth_kind(n) {
            TokenKind::Keyword(kw) => {
                kw.is_storage_class()
                    || kw.is_type_specifier()
                    || kw.is_type_qualifier()
                    || kw.is_tag()
            }
            _ => false,
        }
    }

    /// Heuristic typedef-name test for the identifier at the cursor.
    ///
    /// Typedefs are not resolved, so an identifier counts as a type name when
    /// it is directly followed by another identifier (`size_t n`) or by a run
    /// of `*` and an identifier that ends a declarator (`FILE *fp;`).
    pub(crate) fn looks_like_typedef_name(&self) -> bool {
        if !self.check(TokenKind::Identifier) {
            return false;
        }
        match self.peek_nth_kind(1) {
            TokenKind::Identifier => true,
            TokenKind::Star => {
                let mut n = 1;
                loop {
                    match self.peek_nth_kind(n) {
                        TokenKind::Star => {}
                        TokenKind::Keyword(kw) if kw.is_type_qualifier() => {}
                        _ => break,
                    }
                    n += 1;
                }
                self.peek_nth_kind(n) == TokenKind::Identifier
                    && matches!(
                        self.peek_nth_kind(n + 1),
                        TokenKind::Semicolon
                            | TokenKind::Comma
                            | TokenKind::Eq
                            | TokenKind::LBracket
                            | TokenKind::RParen
                    )
            }
            _ => false,
        }
    }

    /// Whether a declaration (rather than a statement or bare declarator)
    /// starts at the cursor.
    pub(crate) fn starts_declaration(&self) -> bool {
        self.is_specifier_keyword_at(0) || self.looks_like_typedef_name()
    }
}

/// Parse `source` into a syntax tree.
pub fn parse(source: &str) -> Result<SyntaxNode, ParseError> {
    Parser::new(source).parse_translation_unit()
}
