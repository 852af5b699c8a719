//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Comments, whitespace and preprocessor lines are skipped without producing
//! tokens. The lexer never fails: a character it cannot place in any token is
//! recorded as a [`LexDiagnostic`] and skipped, so a stray `@` or `$` in an
//! otherwise ordinary file costs one diagnostic rather than the whole scan.

use super::ast::SourceLocation;
use std::fmt;

/// Reserved words recognised by the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
    Bool,
    Complex,
    Imaginary,
}

impl Keyword {
    /// Keyword table lookup; `None` means the word is an ordinary identifier.
    pub fn lookup(word: &str) -> Option<Keyword> {
        let kw = match word {
            "auto" => Keyword::Auto,
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "char" => Keyword::Char,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "default" => Keyword::Default,
            "do" => Keyword::Do,
            "double" => Keyword::Double,
            "else" => Keyword::Else,
            "enum" => Keyword::Enum,
            "extern" => Keyword::Extern,
            "float" => Keyword::Float,
            "for" => Keyword::For,
            "goto" => Keyword::Goto,
            "if" => Keyword::If,
            "inline" => Keyword::Inline,
            "int" => Keyword::Int,
            "long" => Keyword::Long,
            "register" => Keyword::Register,
            "restrict" => Keyword::Restrict,
            "return" => Keyword::Return,
            "short" => Keyword::Short,
            "signed" => Keyword::Signed,
            "sizeof" => Keyword::Sizeof,
            "static" => Keyword::Static,
            "struct" => Keyword::Struct,
            "switch" => Keyword::Switch,
            "typedef" => Keyword::Typedef,
            "union" => Keyword::Union,
            "unsigned" => Keyword::Unsigned,
            "void" => Keyword::Void,
            "volatile" => Keyword::Volatile,
            "while" => Keyword::While,
            "_Bool" => Keyword::Bool,
            "_Complex" => Keyword::Complex,
            "_Imaginary" => Keyword::Imaginary,
            _ => return None,
        };
        Some(kw)
    }

    /// Storage-class specifiers (plus `typedef` and `inline`, which share the slot).
    pub fn is_storage_class(self) -> bool {
        matches!(
            self,
            Keyword::Extern
                | Keyword::Static
                | Keyword::Auto
                | Keyword::Register
                | Keyword::Typedef
                | Keyword::Inline
        )
    }

    /// Keywords that name a type on their own.
    pub fn is_type_specifier(self) -> bool {
        matches!(
            self,
            Keyword::Void
                | Keyword::Char
                | Keyword::Short
                | Keyword::Int
                | Keyword::Long
                | Keyword::Float
                | Keyword::Double
                | Keyword::Signed
                | Keyword::Unsigned
                | Keyword::Bool
                | Keyword::Complex
                | Keyword::Imaginary
        )
    }

    pub fn is_type_qualifier(self) -> bool {
        matches!(self, Keyword::Const | Keyword::Restrict | Keyword::Volatile)
    }

    /// `struct`, `union` and `enum`, which introduce a tagged type.
    pub fn is_tag(self) -> bool {
        matches!(self, Keyword::Struct | Keyword::Union | Keyword::Enum)
    }
}

/// Token categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    StringLiteral,
    CharLiteral,

    // Identifiers and reserved words
    Identifier,
    Keyword(Keyword),

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<
    GtGt,  // >>

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    LtLtEq,    // <<=
    GtGtEq,    // >>=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=

    // Increment/Decrement
    PlusPlus,   // ++
    MinusMinus, // --

    // Member access
    Dot,   // .
    Arrow, // ->

    // Ternary
    Question, // ?
    Colon,    // :

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Ellipsis,  // ...

    // End of file
    Eof,
}

impl TokenKind {
    /// Whether this is one of the eleven assignment operators.
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::LtLtEq
                | TokenKind::GtGtEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number => write!(f, "number"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::CharLiteral => write!(f, "char literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Keyword(kw) => write!(f, "keyword {:?}", kw),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Tilde => write!(f, "'~'"),
            TokenKind::LtLt => write!(f, "'<<'"),
            TokenKind::GtGt => write!(f, "'>>'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::PlusEq => write!(f, "'+='"),
            TokenKind::MinusEq => write!(f, "'-='"),
            TokenKind::StarEq => write!(f, "'*='"),
            TokenKind::SlashEq => write!(f, "'/='"),
            TokenKind::PercentEq => write!(f, "'%='"),
            TokenKind::LtLtEq => write!(f, "'<<='"),
            TokenKind::GtGtEq => write!(f, "'>>='"),
            TokenKind::AmpEq => write!(f, "'&='"),
            TokenKind::PipeEq => write!(f, "'|='"),
            TokenKind::CaretEq => write!(f, "'^='"),
            TokenKind::PlusPlus => write!(f, "'++'"),
            TokenKind::MinusMinus => write!(f, "'--'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::Question => write!(f, "'?'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Ellipsis => write!(f, "'...'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A lexeme with its category and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Keyword(_) => write!(f, "'{}'", self.text),
            TokenKind::Number | TokenKind::StringLiteral | TokenKind::CharLiteral => {
                write!(f, "{} {}", self.kind, self.text)
            }
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// A recoverable lexical anomaly. The offending input was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiagnostic {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

/// Multi-character operators, longest first so that `<<=` wins over `<<`
/// and `<<` wins over `<`.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::Ellipsis),
    ("<<=", TokenKind::LtLtEq),
    (">>=", TokenKind::GtGtEq),
    ("->", TokenKind::Arrow),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Eq),
    ("!", TokenKind::Bang),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    (".", TokenKind::Dot),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
];

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    diagnostics: Vec<LexDiagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire input. The result always ends with an `Eof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.current_location()));
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            if let Some(token) = self.next_token() {
                tokens.push(token);
            }
        }

        log::debug!(
            "tokenized {} tokens over {} lines ({} diagnostics)",
            tokens.len(),
            self.line,
            self.diagnostics.len()
        );
        tokens
    }

    /// Anomalies recorded so far.
    pub fn diagnostics(&self) -> &[LexDiagnostic] {
        &self.diagnostics
    }

    /// Get next token, or `None` if the current character had to be skipped
    fn next_token(&mut self) -> Option<Token> {
        let loc = self.current_location();
        let ch = self.peek()?;

        match ch {
            '0'..='9' => Some(self.number_literal()),
            '.' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => {
                Some(self.number_literal())
            }
            '"' => self.quoted_literal('"', TokenKind::StringLiteral),
            '\'' => self.quoted_literal('\'', TokenKind::CharLiteral),
            'a'..='z' | 'A'..='Z' | '_' => Some(self.identifier_or_keyword()),
            _ => {
                if let Some(token) = self.operator() {
                    return Some(token);
                }
                self.advance();
                self.report(format!("Illegal character '{}'", ch), loc);
                None
            }
        }
    }

    /// Numeric literal: decimal, hex or floating, with C suffixes
    fn number_literal(&mut self) -> Token {
        let loc = self.current_location();
        let start = self.position;

        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x' | 'X')) {
            self.advance();
            self.advance();
            self.take_while(|c| c.is_ascii_hexdigit());
            self.take_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
            return Token::new(TokenKind::Number, self.slice(start), loc);
        }

        self.take_while(|c| c.is_ascii_digit());

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.take_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let digits_at = match self.peek_ahead(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_ahead(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digits_at {
                    self.advance();
                }
                self.take_while(|c| c.is_ascii_digit());
            }
        }

        if is_float {
            if matches!(self.peek(), Some('f' | 'F' | 'l' | 'L')) {
                self.advance();
            }
        } else {
            self.take_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
        }

        Token::new(TokenKind::Number, self.slice(start), loc)
    }

    /// String or character literal, kept verbatim including its quotes.
    ///
    /// The literal must close on the line it opened on. An unterminated
    /// opener is reported and only the quote character is skipped.
    fn quoted_literal(&mut self, quote: char, kind: TokenKind) -> Option<Token> {
        let loc = self.current_location();
        let mut offset = 1;

        loop {
            match self.peek_ahead(offset) {
                Some(c) if c == quote => break,
                Some('\\') => match self.peek_ahead(offset + 1) {
                    Some('\n') | None => return self.unterminated(quote, loc),
                    Some(_) => offset += 2,
                },
                Some('\n') | None => return self.unterminated(quote, loc),
                Some(_) => offset += 1,
            }
        }

        let start = self.position;
        for _ in 0..=offset {
            self.advance();
        }
        Some(Token::new(kind, self.slice(start), loc))
    }

    fn unterminated(&mut self, quote: char, loc: SourceLocation) -> Option<Token> {
        self.advance();
        let what = if quote == '"' { "string" } else { "character" };
        self.report(format!("Unterminated {} literal", what), loc);
        None
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self) -> Token {
        let loc = self.current_location();
        let start = self.position;
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let ident = self.slice(start);

        match Keyword::lookup(&ident) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), ident, loc),
            None => Token::new(TokenKind::Identifier, ident, loc),
        }
    }

    /// Longest operator or punctuator at the cursor
    fn operator(&mut self) -> Option<Token> {
        let loc = self.current_location();
        let (text, kind) = OPERATORS.iter().find(|(text, _)| self.lookahead_is(text))?;
        for _ in 0..text.chars().count() {
            self.advance();
        }
        Some(Token::new(*kind, *text, loc))
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some('\x0b') | Some('\x0c') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip single-line comment (// ...), leaving the newline in place
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment up to the first `*/`
    fn skip_block_comment(&mut self) {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return;
            }
            self.advance();
        }

        self.report("Unterminated block comment".to_string(), start_loc);
    }

    /// Skip preprocessor directive (#include, #define, ...) to end of line
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn report(&mut self, message: String, location: SourceLocation) {
        log::warn!(
            "lexer: {} at line {}, column {}",
            message,
            location.line,
            location.column
        );
        self.diagnostics.push(LexDiagnostic { message, location });
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
    }

    fn lookahead_is(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_ahead(i) == Some(c))
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokenize `source`, discarding diagnostics.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("int main() { return 0; }");

        assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Int));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "main");
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[3].kind, TokenKind::RParen);
        assert_eq!(tokens[4].kind, TokenKind::LBrace);
        assert_eq!(tokens[5].kind, TokenKind::Keyword(Keyword::Return));
        assert_eq!(tokens[6].kind, TokenKind::Number);
        assert_eq!(tokens[6].text, "0");
        assert_eq!(tokens[7].kind, TokenKind::Semicolon);
        assert_eq!(tokens[8].kind, TokenKind::RBrace);
        assert_eq!(tokens[9].kind, TokenKind::Eof);
    }

    #[test]
    fn test_operators_longest_first() {
        assert_eq!(
            kinds("<<= << < >>= ... . -> ++ += |= ^="),
            vec![
                TokenKind::LtLtEq,
                TokenKind::LtLt,
                TokenKind::Lt,
                TokenKind::GtGtEq,
                TokenKind::Ellipsis,
                TokenKind::Dot,
                TokenKind::Arrow,
                TokenKind::PlusPlus,
                TokenKind::PlusEq,
                TokenKind::PipeEq,
                TokenKind::CaretEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        let texts: Vec<String> = tokenize("42 0x1Fu 3.14 .5f 1e10 2.5E-3L 10UL")
            .into_iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["42", "0x1Fu", "3.14", ".5f", "1e10", "2.5E-3L", "10UL"]);
    }

    #[test]
    fn test_string_and_char_literals_keep_lexeme() {
        let tokens = tokenize(r#"printf("a \"b\"\n", 'x', '\'');"#);
        assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[2].text, r#""a \"b\"\n""#);
        assert_eq!(tokens[4].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[4].text, "'x'");
        assert_eq!(tokens[6].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[6].text, r"'\''");
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let tokens = tokenize("int x; // comment\nint y; /* block\n\ncomment */ int z;");

        let idents: Vec<(String, usize)> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| (t.text.clone(), t.line()))
            .collect();
        assert_eq!(
            idents,
            vec![("x".to_string(), 1), ("y".to_string(), 2), ("z".to_string(), 4)]
        );
    }

    #[test]
    fn test_block_comment_is_non_greedy() {
        let tokens = tokenize("/* a */ gets /* b */");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "gets");
    }

    #[test]
    fn test_preprocessor_skip() {
        let tokens = tokenize("#include <stdio.h>\n#define N 10\nint x;");

        assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Int));
        assert_eq!(tokens[0].line(), 3);
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_illegal_character_is_skipped() {
        let mut lexer = Lexer::new("int @x = $1;");
        let tokens = lexer.tokenize();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["int", "x", "=", "1", ";", ""]);
        assert_eq!(lexer.diagnostics().len(), 2);
        assert_eq!(lexer.diagnostics()[0].location, SourceLocation::new(1, 5));
    }

    #[test]
    fn test_unterminated_string_skips_quote_only() {
        let mut lexer = Lexer::new("x = \"abc;\ny;");
        let tokens = lexer.tokenize();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["x", "=", "abc", ";", "y", ";", ""]);
        assert_eq!(lexer.diagnostics().len(), 1);
        assert_eq!(tokens[4].line(), 2);
    }

    #[test]
    fn test_unterminated_block_comment_is_reported() {
        let mut lexer = Lexer::new("int x; /* never closed\n gets(buf);");
        let tokens = lexer.tokenize();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["int", "x", ";", ""]);
        assert_eq!(tokens[3].kind, TokenKind::Eof);

        let diagnostics = lexer.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Unterminated block comment");
        assert_eq!(diagnostics[0].location, SourceLocation::new(1, 8));
    }

    #[test]
    fn test_keyword_table() {
        assert_eq!(Keyword::lookup("_Bool"), Some(Keyword::Bool));
        assert_eq!(Keyword::lookup("restrict"), Some(Keyword::Restrict));
        assert_eq!(Keyword::lookup("size_t"), None);
        assert_eq!(Keyword::lookup("NULL"), None);
    }
}
