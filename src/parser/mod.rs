//! C source code front end
//!
//! This module turns C source text into a generic syntax tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser entry point, error type and token helpers
//! - [`ast`]: Syntax tree node definitions
//!
//! The grammar itself is spread over `declarations`, `statements` and
//! `expressions`, each extending [`Parser`] with its own `impl` block.
//!
//! # Supported C Subset
//!
//! - Declarations: storage classes, qualifiers, the builtin type keywords,
//!   `struct`/`union`/`enum` with bodies, pointers, arrays, function
//!   prototypes with `...`, brace initializers
//! - Function definitions, including K&R parameter declarations
//! - Statements: blocks, expression statements, `if`/`else`, `while`,
//!   `return`, labels
//! - Expressions: the full C operator set except compound literals
//! - Preprocessor lines and comments are skipped by the lexer
//!
//! Typedef names are recognised heuristically (an identifier that is
//! followed by a declarator) since typedefs are never resolved.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence level
//! for binary operators. No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use ast::{NodeKind, SourceLocation, SyntaxNode};
pub use lexer::{tokenize, Keyword, LexDiagnostic, Lexer, Token, TokenKind};
pub use parse::{parse, ParseError, Parser};
