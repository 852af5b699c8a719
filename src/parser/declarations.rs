//! Declaration parsing implementation
//!
//! This module handles the declaration side of the grammar:
//!
//! - External declarations: function definitions and file-scope declarations
//! - Declaration specifiers: storage class, type specifiers, qualifiers,
//!   `struct`/`union`/`enum` tags and typedef names
//! - Declarators: pointer prefixes around a direct declarator with array and
//!   parameter suffixes
//!
//! # Grammar
//!
//! ```text
//! external_decl     ::= function_def | declaration
//! function_def      ::= specifiers? declarator declaration* compound_stmt
//! declaration       ::= specifiers (init_declarator ("," init_declarator)*)? ";"
//! init_declarator   ::= declarator ("=" initializer)?
//! declarator        ::= pointer? direct_declarator
//! pointer           ::= "*" qualifier* pointer?
//! direct_declarator ::= (identifier | "(" declarator ")")
//!                       ("[" conditional? "]" | "(" params? ")")*
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::{NodeKind, SourceLocation, SyntaxNode};
use crate::parser::lexer::{Keyword, TokenKind};
use crate::parser::parse::{ParseError, Parser};

/// Where a specifier list is being read; decides when an identifier may be
/// taken as a typedef name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecifierContext {
    Declaration,
    TypeName,
}

impl Parser {
    /// Parse a function definition or a file-scope declaration
    pub(crate) fn parse_external_declaration(&mut self) -> Result<SyntaxNode, ParseError> {
        let start = self.current_location();

        let specifiers = if self.starts_declaration() {
            Some(self.parse_declaration_specifiers(SpecifierContext::Declaration)?)
        } else {
            None
        };

        // `struct tag;` and friends
        if let Some(spec) = &specifiers {
            if self.match_token(TokenKind::Semicolon) {
                return Ok(SyntaxNode::new(NodeKind::Declaration, start).with_child(spec.clone()));
            }
        }

        let declarator = self.parse_declarator()?;

        let is_definition = self.check(TokenKind::LBrace)
            || (is_function_declarator(&declarator) && self.starts_declaration());
        if is_definition {
            return self.finish_function_definition(start, specifiers, declarator);
        }

        match specifiers {
            Some(spec) => self.finish_declaration(start, spec, declarator),
            None => Err(self.error_expected("'{' to begin function body")),
        }
    }

    /// Parse the rest of a function definition after its declarator
    fn finish_function_definition(
        &mut self,
        start: SourceLocation,
        specifiers: Option<SyntaxNode>,
        declarator: SyntaxNode,
    ) -> Result<SyntaxNode, ParseError> {
        let mut func = SyntaxNode::new(NodeKind::FunctionDefinition, start);
        if let Some(spec) = specifiers {
            func.push(spec);
        }
        func.push(declarator);

        // K&R parameter declarations between `)` and `{`
        if !self.check(TokenKind::LBrace) {
            let mut list = SyntaxNode::new(NodeKind::DeclarationList, self.current_location());
            while self.starts_declaration() {
                list.push(self.parse_declaration()?);
            }
            func.push(list);
        }

        func.push(self.parse_compound_statement()?);
        Ok(func)
    }

    /// Parse a block-scope or K&R declaration
    pub(crate) fn parse_declaration(&mut self) -> Result<SyntaxNode, ParseError> {
        let start = self.current_location();
        let specifiers = self.parse_declaration_specifiers(SpecifierContext::Declaration)?;

        if self.match_token(TokenKind::Semicolon) {
            return Ok(SyntaxNode::new(NodeKind::Declaration, start).with_child(specifiers));
        }

        let declarator = self.parse_declarator()?;
        self.finish_declaration(start, specifiers, declarator)
    }

    /// Parse the init-declarator list that follows the first declarator
    fn finish_declaration(
        &mut self,
        start: SourceLocation,
        specifiers: SyntaxNode,
        first: SyntaxNode,
    ) -> Result<SyntaxNode, ParseError> {
        let first = self.finish_init_declarator(first)?;
        let mut list = SyntaxNode::wrap(NodeKind::InitDeclaratorList, first);

        while self.match_token(TokenKind::Comma) {
            let declarator = self.parse_declarator()?;
            list.push(self.finish_init_declarator(declarator)?);
        }

        self.expect(TokenKind::Semicolon, "after declaration")?;

        Ok(SyntaxNode::new(NodeKind::Declaration, start)
            .with_child(specifiers)
            .with_child(list))
    }

    fn finish_init_declarator(&mut self, declarator: SyntaxNode) -> Result<SyntaxNode, ParseError> {
        if !self.match_token(TokenKind::Eq) {
            return Ok(declarator);
        }
        let init = self.parse_initializer()?;
        Ok(SyntaxNode::wrap(NodeKind::InitDeclarator, declarator).with_child(init))
    }

    /// Parse initializer: assignment expression or `{ initializer, ... }`
    fn parse_initializer(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::initializer)
    }

    fn initializer(&mut self) -> Result<SyntaxNode, ParseError> {
        if !self.check(TokenKind::LBrace) {
            return self.parse_assignment();
        }

        let loc = self.advance().location;
        let mut list = SyntaxNode::new(NodeKind::InitializerList, loc);
        while !self.check(TokenKind::RBrace) {
            list.push(self.parse_initializer()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "to close initializer list")?;
        Ok(list)
    }

    /// Parse declaration specifiers: storage class, types, qualifiers, tags
    pub(crate) fn parse_declaration_specifiers(
        &mut self,
        ctx: SpecifierContext,
    ) -> Result<SyntaxNode, ParseError> {
        let mut specifiers =
            SyntaxNode::new(NodeKind::DeclarationSpecifiers, self.current_location());
        let mut seen_type = false;

        loop {
            let token = self.peek().clone();
            let node = match token.kind {
                TokenKind::Keyword(kw) if kw.is_storage_class() => {
                    self.advance();
                    SyntaxNode::leaf(NodeKind::StorageClassSpecifier, token.text, token.location)
                }
                TokenKind::Keyword(kw) if kw.is_type_qualifier() => {
                    self.advance();
                    SyntaxNode::leaf(NodeKind::TypeQualifier, token.text, token.location)
                }
                TokenKind::Keyword(kw) if kw.is_type_specifier() => {
                    self.advance();
                    seen_type = true;
                    SyntaxNode::leaf(NodeKind::TypeSpecifier, token.text, token.location)
                }
                TokenKind::Keyword(kw) if kw.is_tag() => {
                    seen_type = true;
                    self.parse_tag_specifier(kw)?
                }
                TokenKind::Identifier if !seen_type && self.typedef_name_allowed(ctx) => {
                    self.advance();
                    seen_type = true;
                    SyntaxNode::leaf(NodeKind::TypedefName, token.text, token.location)
                }
                _ => break,
            };
            specifiers.push(node);
        }

        if specifiers.children.is_empty() {
            return Err(self.error_expected("declaration specifier"));
        }
        Ok(specifiers)
    }

    fn typedef_name_allowed(&self, ctx: SpecifierContext) -> bool {
        match ctx {
            SpecifierContext::Declaration => self.looks_like_typedef_name(),
            SpecifierContext::TypeName => matches!(
                self.peek_nth_kind(1),
                TokenKind::RParen | TokenKind::Star
            ),
        }
    }

    /// Parse `struct`/`union` tag with optional member list, or `enum` tag
    /// with optional enumerator list
    fn parse_tag_specifier(&mut self, kw: Keyword) -> Result<SyntaxNode, ParseError> {
        self.nested(|p| p.tag_specifier(kw))
    }

    fn tag_specifier(&mut self, kw: Keyword) -> Result<SyntaxNode, ParseError> {
        let keyword = self.advance();
        let kind = match kw {
            Keyword::Struct => NodeKind::StructSpecifier,
            Keyword::Union => NodeKind::UnionSpecifier,
            _ => NodeKind::EnumSpecifier,
        };

        let mut node = SyntaxNode::new(kind, keyword.location);
        if self.check(TokenKind::Identifier) {
            node.value = Some(self.advance().text);
        }

        if !self.match_token(TokenKind::LBrace) {
            if node.value.is_none() {
                let expected = format!("tag name or '{{' after '{}'", keyword.text);
                return Err(self.error_expected(&expected));
            }
            return Ok(node);
        }

        if kw == Keyword::Enum {
            while self.check(TokenKind::Identifier) {
                let name = self.advance();
                let mut enumerator =
                    SyntaxNode::leaf(NodeKind::Identifier, name.text, name.location);
                if self.match_token(TokenKind::Eq) {
                    enumerator.push(self.parse_conditional()?);
                }
                node.push(enumerator);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        } else {
            while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                node.push(self.parse_declaration()?);
            }
        }

        self.expect(TokenKind::RBrace, &format!("to close '{}' body", keyword.text))?;
        Ok(node)
    }

    /// Parse declarator: pointer? direct_declarator
    pub(crate) fn parse_declarator(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::declarator)
    }

    fn declarator(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut declarator = SyntaxNode::new(NodeKind::Declarator, self.current_location());
        if self.check(TokenKind::Star) {
            declarator.push(self.parse_pointer()?);
        }
        declarator.push(self.parse_direct_declarator()?);
        Ok(declarator)
    }

    /// Parse pointer: "*" qualifier* pointer?
    pub(crate) fn parse_pointer(&mut self) -> Result<SyntaxNode, ParseError> {
        self.nested(Self::pointer)
    }

    fn pointer(&mut self) -> Result<SyntaxNode, ParseError> {
        let star = self.expect(TokenKind::Star, "in pointer declarator")?;
        let mut pointer = SyntaxNode::leaf(NodeKind::Pointer, "*", star.location);

        while let TokenKind::Keyword(kw) = self.peek_kind() {
            if !kw.is_type_qualifier() {
                break;
            }
            let qualifier = self.advance();
            pointer.push(SyntaxNode::leaf(
                NodeKind::TypeQualifier,
                qualifier.text,
                qualifier.location,
            ));
        }

        if self.check(TokenKind::Star) {
            pointer.push(self.parse_pointer()?);
        }
        Ok(pointer)
    }

    /// Parse direct declarator core and its array/function suffixes
    fn parse_direct_declarator(&mut self) -> Result<SyntaxNode, ParseError> {
        let loc = self.current_location();

        let mut direct = if self.check(TokenKind::Identifier) {
            let name = self.advance();
            SyntaxNode::leaf(NodeKind::DirectDeclarator, name.text, name.location)
        } else if self.match_token(TokenKind::LParen) {
            let inner = self.parse_declarator()?;
            self.expect(TokenKind::RParen, "after parenthesized declarator")?;
            SyntaxNode::new(NodeKind::DirectDeclarator, loc).with_child(inner)
        } else {
            return Err(self.error_expected("identifier or '(' in declarator"));
        };

        loop {
            if self.check(TokenKind::LBracket) {
                let open = self.advance();
                let mut dimension = SyntaxNode::new(NodeKind::ArrayDimension, open.location);
                if !self.check(TokenKind::RBracket) {
                    dimension.push(self.parse_conditional()?);
                }
                self.expect(TokenKind::RBracket, "after array size")?;
                direct = SyntaxNode::wrap(NodeKind::DirectDeclarator, direct).with_child(dimension);
            } else if self.check(TokenKind::LParen) {
                let open = self.advance();
                let suffix = self.parse_parameter_suffix(open.location)?;
                self.expect(TokenKind::RParen, "after parameter list")?;
                direct = SyntaxNode::wrap(NodeKind::DirectDeclarator, direct).with_child(suffix);
            } else {
                break;
            }
        }

        Ok(direct)
    }

    /// Parse the inside of a function declarator's parentheses
    fn parse_parameter_suffix(
        &mut self,
        open: SourceLocation,
    ) -> Result<SyntaxNode, ParseError> {
        if self.check(TokenKind::RParen) {
            return Ok(SyntaxNode::new(NodeKind::ParameterList, open));
        }

        if self.check(TokenKind::Identifier) && !self.looks_like_typedef_name() {
            return self.parse_identifier_list();
        }

        let mut params = SyntaxNode::new(NodeKind::ParameterList, self.current_location());
        loop {
            if self.check(TokenKind::Ellipsis) {
                let dots = self.advance();
                params.push(SyntaxNode::leaf(NodeKind::Ellipsis, dots.text, dots.location));
                break;
            }
            params.push(self.parse_parameter_declaration()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// Parse K&R identifier list: (a, b, c)
    fn parse_identifier_list(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut list = SyntaxNode::new(NodeKind::IdentifierList, self.current_location());
        loop {
            let name = self.expect_identifier("in identifier list")?;
            list.push(SyntaxNode::leaf(NodeKind::Identifier, name.text, name.location));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(list)
    }

    /// Parse parameter declaration: specifiers declarator?
    ///
    /// An abstract pointer declarator (`char *` with no name) is kept as a
    /// declarator holding only its pointer.
    fn parse_parameter_declaration(&mut self) -> Result<SyntaxNode, ParseError> {
        let specifiers = self.parse_declaration_specifiers(SpecifierContext::Declaration)?;
        let mut param = SyntaxNode::wrap(NodeKind::ParameterDeclaration, specifiers);

        if matches!(self.peek_kind(), TokenKind::Comma | TokenKind::RParen) {
            return Ok(param);
        }

        if self.check(TokenKind::Star) && self.is_abstract_pointer() {
            let mut declarator = SyntaxNode::new(NodeKind::Declarator, self.current_location());
            declarator.push(self.parse_pointer()?);
            param.push(declarator);
            return Ok(param);
        }

        param.push(self.parse_declarator()?);
        Ok(param)
    }

    /// `*`s and qualifiers running up to `,` or `)`
    fn is_abstract_pointer(&self) -> bool {
        let mut n = 0;
        loop {
            match self.peek_nth_kind(n) {
                TokenKind::Star => n += 1,
                TokenKind::Keyword(kw) if kw.is_type_qualifier() => n += 1,
                TokenKind::Comma | TokenKind::RParen => return true,
                _ => return false,
            }
        }
    }

    /// Parse type name used by casts and `sizeof`: specifiers pointer?
    pub(crate) fn parse_type_name(&mut self) -> Result<SyntaxNode, ParseError> {
        let specifiers = self.parse_declaration_specifiers(SpecifierContext::TypeName)?;
        let mut type_name = SyntaxNode::wrap(NodeKind::TypeName, specifiers);
        if self.check(TokenKind::Star) {
            type_name.push(self.parse_pointer()?);
        }
        Ok(type_name)
    }

    /// Whether a type name starts `n` tokens ahead, for `(type)` lookahead.
    ///
    /// A bare identifier only counts when it is followed by `*` or by `)` and
    /// then something that can only be a cast operand.
    pub(crate) fn type_name_starts_at(&self, n: usize) -> bool {
        if self.is_specifier_keyword_at(n) {
            return true;
        }
        if self.peek_nth_kind(n) != TokenKind::Identifier {
            return false;
        }
        match self.peek_nth_kind(n + 1) {
            TokenKind::Star => {
                let mut m = n + 1;
                while self.peek_nth_kind(m) == TokenKind::Star {
                    m += 1;
                }
                self.peek_nth_kind(m) == TokenKind::RParen
            }
            TokenKind::RParen => matches!(
                self.peek_nth_kind(n + 2),
                TokenKind::Identifier
                    | TokenKind::Number
                    | TokenKind::CharLiteral
                    | TokenKind::StringLiteral
            ),
            _ => false,
        }
    }
}

/// Whether the outermost direct declarator has a parameter suffix.
pub(crate) fn is_function_declarator(declarator: &SyntaxNode) -> bool {
    declarator
        .find_child(NodeKind::DirectDeclarator)
        .and_then(|direct| direct.child(1))
        .is_some_and(|suffix| {
            matches!(suffix.kind, NodeKind::ParameterList | NodeKind::IdentifierList)
        })
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::NodeKind;
    use crate::parser::parse::parse;

    #[test]
    fn test_declaration_shape() {
        let tree = parse("static const char *name = \"x\", buf[10];").unwrap();
        let decl = &tree.children[0];
        assert_eq!(decl.kind, NodeKind::Declaration);

        let specifiers: Vec<(NodeKind, &str)> = decl.children[0]
            .children
            .iter()
            .map(|c| (c.kind, c.value().unwrap()))
            .collect();
        assert_eq!(
            specifiers,
            vec![
                (NodeKind::StorageClassSpecifier, "static"),
                (NodeKind::TypeQualifier, "const"),
                (NodeKind::TypeSpecifier, "char"),
            ]
        );

        let list = &decl.children[1];
        assert_eq!(list.kind, NodeKind::InitDeclaratorList);
        assert_eq!(list.children[0].kind, NodeKind::InitDeclarator);
        assert_eq!(list.children[1].kind, NodeKind::Declarator);

        // buf[10]: direct_declarator[direct_declarator "buf", array_dimension[constant]]
        let array = &list.children[1].children[0];
        assert_eq!(array.kind, NodeKind::DirectDeclarator);
        assert_eq!(array.value(), None);
        assert_eq!(array.children[0].value(), Some("buf"));
        assert_eq!(array.children[1].kind, NodeKind::ArrayDimension);
        assert_eq!(array.children[1].children[0].value(), Some("10"));
    }

    #[test]
    fn test_pointer_declarator() {
        let tree = parse("char * const *p;").unwrap();
        let declarator = &tree.children[0].children[1].children[0];
        let pointer = &declarator.children[0];
        assert_eq!(pointer.kind, NodeKind::Pointer);
        assert_eq!(pointer.children[0].kind, NodeKind::TypeQualifier);
        assert_eq!(pointer.children[1].kind, NodeKind::Pointer);
        assert_eq!(declarator.children[1].value(), Some("p"));
    }

    #[test]
    fn test_function_with_parameters() {
        let tree = parse("int add(int a, char *b, ...) { return a; }").unwrap();
        let func = &tree.children[0];
        assert_eq!(func.kind, NodeKind::FunctionDefinition);

        let direct = &func.children[1].children[0];
        let params = &direct.children[1];
        assert_eq!(params.kind, NodeKind::ParameterList);
        assert_eq!(params.children.len(), 3);
        assert_eq!(params.children[2].kind, NodeKind::Ellipsis);
    }

    #[test]
    fn test_prototype_is_declaration() {
        let tree = parse("char *strcpy(char *, const char *);\nvoid f(void);").unwrap();
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children.iter().all(|c| c.kind == NodeKind::Declaration));
    }

    #[test]
    fn test_knr_definition() {
        let tree = parse("main(argc, argv) int argc; char **argv; { return 0; }").unwrap();
        let func = &tree.children[0];
        assert_eq!(func.kind, NodeKind::FunctionDefinition);
        // no specifiers: declarator, declaration_list, body
        assert_eq!(func.children[0].kind, NodeKind::Declarator);
        assert_eq!(func.children[1].kind, NodeKind::DeclarationList);
        assert_eq!(func.children[1].children.len(), 2);
        assert_eq!(func.children[2].kind, NodeKind::CompoundStatement);

        let direct = &func.children[0].children[0];
        assert_eq!(direct.children[1].kind, NodeKind::IdentifierList);
    }

    #[test]
    fn test_typedef_names() {
        let tree = parse("size_t n; FILE *fp; int f(size_t len, FILE *out);").unwrap();
        assert_eq!(tree.children.len(), 3);
        let spec = &tree.children[0].children[0];
        assert_eq!(spec.children[0].kind, NodeKind::TypedefName);
        assert_eq!(spec.children[0].value(), Some("size_t"));
        let spec = &tree.children[1].children[0];
        assert_eq!(spec.children[0].value(), Some("FILE"));
    }

    #[test]
    fn test_struct_and_enum_specifiers() {
        let tree = parse(
            "struct point { int x; int y; };\nenum color { RED, GREEN = 2, };\nstruct point p;",
        )
        .unwrap();
        let st = &tree.children[0].children[0].children[0];
        assert_eq!(st.kind, NodeKind::StructSpecifier);
        assert_eq!(st.value(), Some("point"));
        assert_eq!(st.children.len(), 2);

        let en = &tree.children[1].children[0].children[0];
        assert_eq!(en.kind, NodeKind::EnumSpecifier);
        assert_eq!(en.children.len(), 2);
        assert_eq!(en.children[1].children.len(), 1);
    }

    #[test]
    fn test_initializer_list() {
        let tree = parse("char buf[16] = {0};").unwrap();
        let init = &tree.children[0].children[1].children[0];
        assert_eq!(init.kind, NodeKind::InitDeclarator);
        assert_eq!(init.children[1].kind, NodeKind::InitializerList);
    }

    #[test]
    fn test_parenthesized_declarator() {
        let tree = parse("int (*handler)(int);").unwrap();
        let outer = &tree.children[0].children[1].children[0].children[0];
        assert_eq!(outer.kind, NodeKind::DirectDeclarator);
        assert_eq!(outer.children[0].kind, NodeKind::DirectDeclarator);
        assert_eq!(outer.children[0].children[0].kind, NodeKind::Declarator);
        assert_eq!(outer.children[1].kind, NodeKind::ParameterList);
    }

    #[test]
    fn test_declaration_without_specifiers_fails() {
        assert!(parse("x;").is_err());
    }
}
