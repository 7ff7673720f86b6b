//! Hierarchical parser producing a lossless rowan tree
//!
//! Tokens come from [`lex_with_trivia`](super::lex_with_trivia). Before
//! parsing, trivia is attached to the significant tokens around it: a
//! token's trailing trivia runs up to and including the first newline after
//! it, everything else before the next token is that token's leading trivia.
//! `bump` emits leading trivia, the token and trailing trivia into the node
//! that is open at that moment, so a node's text always starts with the
//! leading trivia of its first token and ends with the trailing trivia of its
//! last token.
//!
//! The parser never fails. Unexpected input is recorded as a [`ParseError`]
//! and wrapped in an `ErrorNode`, so the tree still round-trips.

use std::ops::Range;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::{CsSyntaxKind, CstToken, LexerError, lex_with_trivia};

use CsSyntaxKind as K;

/// A syntax error with the byte range it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

impl ParseError {
    fn from_lexer(error: LexerError) -> Self {
        Self {
            message: error.message,
            range: text_range(error.span),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {:?}", self.message, self.range)
    }
}

/// Entry points for parsing isolated pieces of syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Expression,
    Statement,
    Type,
}

/// Parse a whole source file into a `CompilationUnit` green tree
pub fn parse_source(source: &str) -> (GreenNode, Vec<ParseError>) {
    let (tokens, lex_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.compilation_unit();
    let (green, mut errors) = parser.finish();
    errors.extend(lex_errors.into_iter().map(ParseError::from_lexer));
    errors.sort_by_key(|e| e.range.start());
    (green, errors)
}

/// Parse a fragment whose root is the expression, statement or type itself
///
/// Used by the node factory; any input left after the fragment is an error.
pub fn parse_fragment(text: &str, kind: FragmentKind) -> (GreenNode, Vec<ParseError>) {
    let (tokens, lex_errors) = lex_with_trivia(text);
    let mut parser = Parser::new(&tokens);
    match kind {
        FragmentKind::Expression => parser.expr(),
        FragmentKind::Statement => parser.statement(),
        FragmentKind::Type => {
            parser.type_();
        }
    }
    if !parser.at(K::Eof) || !parser.current_lexeme().leading.is_empty() {
        parser.error("unexpected input after fragment");
    }
    let (green, mut errors) = parser.finish();
    errors.extend(lex_errors.into_iter().map(ParseError::from_lexer));
    (green, errors)
}

/// A significant token with the raw trivia tokens attached to it
#[derive(Debug, Clone)]
struct Lexeme {
    index: usize,
    leading: Range<usize>,
    trailing: Range<usize>,
}

fn attach_trivia(tokens: &[CstToken]) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let leading_start = i;
        while i < tokens.len() && tokens[i].kind.is_trivia() {
            i += 1;
        }
        if i == tokens.len() {
            break;
        }
        let index = i;
        i += 1;
        let trailing_start = i;
        if tokens[index].kind != K::Eof {
            while i < tokens.len() && tokens[i].kind.is_trivia() {
                let newline = tokens[i].kind == K::Newline;
                i += 1;
                if newline {
                    break;
                }
            }
        }
        lexemes.push(Lexeme {
            index,
            leading: leading_start..index,
            trailing: trailing_start..i,
        });
    }
    lexemes
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    lexemes: Vec<Lexeme>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        Self {
            tokens,
            lexemes: attach_trivia(tokens),
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (GreenNode, Vec<ParseError>) {
        (self.builder.finish(), self.errors)
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    fn current_lexeme(&self) -> &Lexeme {
        let last = self.lexemes.len() - 1;
        &self.lexemes[self.pos.min(last)]
    }

    fn kind_at(&self, position: usize) -> CsSyntaxKind {
        let last = self.lexemes.len() - 1;
        self.tokens[self.lexemes[position.min(last)].index].kind
    }

    fn text_at(&self, position: usize) -> &str {
        let last = self.lexemes.len() - 1;
        &self.tokens[self.lexemes[position.min(last)].index].text
    }

    fn current(&self) -> CsSyntaxKind {
        self.kind_at(self.pos)
    }

    fn nth(&self, n: usize) -> CsSyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn at(&self, kind: CsSyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_any(&self, kinds: &[CsSyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    fn current_range(&self) -> TextRange {
        text_range(self.tokens[self.current_lexeme().index].span.clone())
    }

    /// Emit the current token with its trivia into the open node
    fn bump(&mut self) {
        if self.pos >= self.lexemes.len() {
            return;
        }
        let lexeme = self.lexemes[self.pos].clone();
        for token in &self.tokens[lexeme.leading] {
            self.builder.token(token.kind.into(), &token.text);
        }
        let token = &self.tokens[lexeme.index];
        self.builder.token(token.kind.into(), &token.text);
        for token in &self.tokens[lexeme.trailing] {
            self.builder.token(token.kind.into(), &token.text);
        }
        self.pos += 1;
    }

    fn eat(&mut self, kind: CsSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: CsSyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {kind}, found {}", self.current()));
        false
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(ParseError {
            message: message.into(),
            range,
        });
    }

    fn error_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if self.at(K::Eof) {
            return;
        }
        self.start(K::ErrorNode);
        self.bump();
        self.finish_node();
    }

    fn start(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    /// Position just past a type starting at `start`, if one is there
    fn scan_type(&self, start: usize) -> Option<usize> {
        let mut i = match self.kind_at(start) {
            k if k.is_predefined_type() => start + 1,
            K::Ident => {
                let mut j = start + 1;
                loop {
                    if self.kind_at(j) == K::Lt {
                        j = self.scan_type_args(j)?;
                    }
                    if self.kind_at(j) == K::Dot && self.kind_at(j + 1) == K::Ident {
                        j += 2;
                        continue;
                    }
                    break;
                }
                j
            }
            _ => return None,
        };
        loop {
            match self.kind_at(i) {
                K::Question => i += 1,
                K::LBracket if self.kind_at(i + 1) == K::RBracket => i += 2,
                _ => break,
            }
        }
        Some(i)
    }

    fn scan_type_args(&self, start: usize) -> Option<usize> {
        let mut j = start + 1;
        loop {
            j = self.scan_type(j)?;
            match self.kind_at(j) {
                K::Comma => j += 1,
                K::Gt => return Some(j + 1),
                _ => return None,
            }
        }
    }

    fn generic_args_ahead(&self) -> bool {
        self.at(K::Lt)
            && self
                .scan_type_args(self.pos)
                .is_some_and(|end| self.kind_at(end) == K::LParen)
    }

    fn at_lambda_start(&self) -> bool {
        match self.current() {
            K::Ident => self.nth(1) == K::FatArrow,
            K::LParen => {
                let mut depth = 0usize;
                let mut i = self.pos;
                loop {
                    match self.kind_at(i) {
                        K::LParen => depth += 1,
                        K::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return self.kind_at(i + 1) == K::FatArrow;
                            }
                        }
                        K::Eof | K::Semicolon | K::LBrace | K::RBrace => return false,
                        _ => {}
                    }
                    i += 1;
                }
            }
            _ => false,
        }
    }

    fn at_local_decl(&self) -> bool {
        self.scan_type(self.pos).is_some_and(|end| {
            self.kind_at(end) == K::Ident
                && matches!(self.kind_at(end + 1), K::Eq | K::Semicolon | K::Comma)
        })
    }

    fn at_decl_expr(&self) -> bool {
        self.scan_type(self.pos)
            .is_some_and(|end| self.kind_at(end) == K::Ident)
    }

    fn at_expr_start(&self) -> bool {
        let kind = self.current();
        kind.is_literal()
            || kind.is_predefined_type()
            || matches!(
                kind,
                K::Ident
                    | K::ThisKw
                    | K::NewKw
                    | K::LParen
                    | K::LBracket
                    | K::Bang
                    | K::Minus
                    | K::Plus
                    | K::Tilde
                    | K::PlusPlus
                    | K::MinusMinus
            )
    }

    fn modifier_count(&self) -> usize {
        let mut n = 0;
        while self.nth(n).is_modifier() {
            n += 1;
        }
        n
    }

    fn bump_modifiers(&mut self) {
        while self.current().is_modifier() {
            self.bump();
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn compilation_unit(&mut self) {
        self.start(K::CompilationUnit);
        while self.at(K::UsingKw) {
            self.using_directive();
        }
        while !self.at(K::Eof) {
            self.namespace_member();
        }
        self.bump(); // EOF
        self.finish_node();
    }

    fn using_directive(&mut self) {
        self.start(K::UsingDirective);
        self.bump();
        self.qualified_name();
        self.expect(K::Semicolon);
        self.finish_node();
    }

    fn qualified_name(&mut self) {
        self.start(K::QualifiedName);
        self.expect(K::Ident);
        while self.at(K::Dot) && self.nth(1) == K::Ident {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    fn namespace_member(&mut self) {
        if self.at(K::NamespaceKw) {
            self.namespace_decl();
            return;
        }
        let n = self.modifier_count();
        if matches!(self.nth(n), K::ClassKw | K::StructKw | K::InterfaceKw) {
            self.type_decl();
        } else {
            self.error_and_bump("expected namespace or type declaration");
        }
    }

    fn namespace_decl(&mut self) {
        self.start(K::NamespaceDecl);
        self.bump();
        self.qualified_name();
        if self.eat(K::Semicolon) {
            while !self.at(K::Eof) {
                self.namespace_member();
            }
        } else {
            self.expect(K::LBrace);
            while !self.at(K::RBrace) && !self.at(K::Eof) {
                self.namespace_member();
            }
            self.expect(K::RBrace);
        }
        self.finish_node();
    }

    fn type_decl(&mut self) {
        self.start(K::TypeDecl);
        self.bump_modifiers();
        self.bump(); // class / struct / interface
        let name = self.text_at(self.pos).to_string();
        self.expect(K::Ident);
        if self.at(K::Lt) {
            self.type_param_list();
        }
        if self.at(K::Colon) {
            self.base_list();
        }
        self.expect(K::LBrace);
        while !self.at(K::RBrace) && !self.at(K::Eof) {
            self.member(&name);
        }
        self.expect(K::RBrace);
        self.finish_node();
    }

    fn type_param_list(&mut self) {
        self.start(K::TypeParamList);
        self.bump();
        self.expect(K::Ident);
        while self.eat(K::Comma) {
            self.expect(K::Ident);
        }
        self.expect(K::Gt);
        self.finish_node();
    }

    fn base_list(&mut self) {
        self.start(K::BaseList);
        self.bump();
        self.type_();
        while self.eat(K::Comma) {
            self.type_();
        }
        self.finish_node();
    }

    fn member(&mut self, type_name: &str) {
        let n = self.modifier_count();
        let head = self.pos + n;
        match self.kind_at(head) {
            K::ClassKw | K::StructKw | K::InterfaceKw => return self.type_decl(),
            K::Ident if self.kind_at(head + 1) == K::LParen && self.text_at(head) == type_name => {
                return self.constructor_decl();
            }
            _ => {}
        }
        let Some(end) = self.scan_type(head).filter(|&end| self.kind_at(end) == K::Ident) else {
            self.error_and_bump("expected member declaration");
            return;
        };
        match self.kind_at(end + 1) {
            K::LParen | K::Lt => self.method_decl(),
            K::FatArrow | K::LBrace => self.property_decl(),
            _ => self.field_decl(),
        }
    }

    fn method_decl(&mut self) {
        self.start(K::MethodDecl);
        self.bump_modifiers();
        self.type_();
        self.expect(K::Ident);
        if self.at(K::Lt) {
            self.type_param_list();
        }
        self.param_list();
        self.member_body();
        self.finish_node();
    }

    fn constructor_decl(&mut self) {
        self.start(K::ConstructorDecl);
        self.bump_modifiers();
        self.bump();
        self.param_list();
        self.member_body();
        self.finish_node();
    }

    fn member_body(&mut self) {
        match self.current() {
            K::LBrace => self.block(),
            K::FatArrow => {
                self.arrow_body();
                self.expect(K::Semicolon);
            }
            _ => {
                self.expect(K::Semicolon);
            }
        }
    }

    fn arrow_body(&mut self) {
        self.start(K::ArrowBody);
        self.bump();
        self.expr();
        self.finish_node();
    }

    fn property_decl(&mut self) {
        self.start(K::PropertyDecl);
        self.bump_modifiers();
        self.type_();
        self.expect(K::Ident);
        if self.at(K::FatArrow) {
            self.arrow_body();
            self.expect(K::Semicolon);
        } else {
            self.start(K::AccessorList);
            self.bump();
            while !self.at(K::RBrace) && !self.at(K::Eof) {
                self.bump();
            }
            self.expect(K::RBrace);
            self.finish_node();
            if self.eat(K::Eq) {
                self.expr();
                self.expect(K::Semicolon);
            }
        }
        self.finish_node();
    }

    fn field_decl(&mut self) {
        self.start(K::FieldDecl);
        self.bump_modifiers();
        self.type_();
        self.var_declarator();
        while self.eat(K::Comma) {
            self.var_declarator();
        }
        self.expect(K::Semicolon);
        self.finish_node();
    }

    fn var_declarator(&mut self) {
        self.start(K::VarDeclarator);
        self.expect(K::Ident);
        if self.eat(K::Eq) {
            self.expr();
        }
        self.finish_node();
    }

    fn param_list(&mut self) {
        self.start(K::ParamList);
        self.expect(K::LParen);
        if !self.at(K::RParen) {
            self.param();
            while self.eat(K::Comma) {
                self.param();
            }
        }
        self.expect(K::RParen);
        self.finish_node();
    }

    fn param(&mut self) {
        self.start(K::Param);
        if self.at_any(&[K::ThisKw, K::OutKw, K::RefKw, K::InKw]) {
            self.bump();
        }
        self.type_();
        self.expect(K::Ident);
        if self.eat(K::Eq) {
            self.expr();
        }
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Parse a type, returning the kind of the outermost type node
    fn type_(&mut self) -> Option<CsSyntaxKind> {
        let checkpoint = self.checkpoint();
        let mut kind = match self.current() {
            k if k.is_predefined_type() => {
                self.start(K::PredefinedType);
                self.bump();
                self.finish_node();
                K::PredefinedType
            }
            K::Ident => {
                self.start(K::NamedType);
                self.bump();
                if self.at(K::Lt) {
                    self.type_arg_list();
                }
                while self.at(K::Dot) && self.nth(1) == K::Ident {
                    self.bump();
                    self.bump();
                    if self.at(K::Lt) {
                        self.type_arg_list();
                    }
                }
                self.finish_node();
                K::NamedType
            }
            _ => {
                self.error("expected type");
                return None;
            }
        };
        loop {
            if self.at(K::Question) {
                self.start_at(checkpoint, K::NullableType);
                self.bump();
                self.finish_node();
                kind = K::NullableType;
            } else if self.at(K::LBracket) && self.nth(1) == K::RBracket {
                self.start_at(checkpoint, K::ArrayType);
                self.bump();
                self.bump();
                self.finish_node();
                kind = K::ArrayType;
            } else {
                break;
            }
        }
        Some(kind)
    }

    fn type_arg_list(&mut self) {
        self.start(K::TypeArgList);
        self.bump();
        self.type_();
        while self.eat(K::Comma) {
            self.type_();
        }
        self.expect(K::Gt);
        self.finish_node();
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) {
        self.start(K::Block);
        self.expect(K::LBrace);
        while !self.at(K::RBrace) && !self.at(K::Eof) {
            self.statement();
        }
        self.expect(K::RBrace);
        self.finish_node();
    }

    fn statement(&mut self) {
        match self.current() {
            K::LBrace => self.block(),
            K::Semicolon => {
                self.start(K::EmptyStmt);
                self.bump();
                self.finish_node();
            }
            K::ReturnKw => {
                self.start(K::ReturnStmt);
                self.bump();
                if !self.at(K::Semicolon) {
                    self.expr();
                }
                self.expect(K::Semicolon);
                self.finish_node();
            }
            K::IfKw => {
                self.start(K::IfStmt);
                self.bump();
                self.expect(K::LParen);
                self.expr();
                self.expect(K::RParen);
                self.statement();
                if self.at(K::ElseKw) {
                    self.start(K::ElseClause);
                    self.bump();
                    self.statement();
                    self.finish_node();
                }
                self.finish_node();
            }
            K::ForeachKw => {
                self.start(K::ForeachStmt);
                self.bump();
                self.expect(K::LParen);
                self.type_();
                self.expect(K::Ident);
                self.expect(K::InKw);
                self.expr();
                self.expect(K::RParen);
                self.statement();
                self.finish_node();
            }
            _ if self.at_local_decl() => {
                self.start(K::LocalDecl);
                self.type_();
                self.var_declarator();
                while self.eat(K::Comma) {
                    self.var_declarator();
                }
                self.expect(K::Semicolon);
                self.finish_node();
            }
            _ if self.at_expr_start() => {
                self.start(K::ExprStmt);
                self.expr();
                self.expect(K::Semicolon);
                self.finish_node();
            }
            _ => self.error_and_bump("expected statement"),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) {
        if self.at_lambda_start() {
            self.lambda();
            return;
        }
        let checkpoint = self.checkpoint();
        self.conditional_expr();
        if self.current().is_assignment_operator() {
            self.start_at(checkpoint, K::AssignExpr);
            self.bump();
            self.expr();
            self.finish_node();
        }
    }

    fn conditional_expr(&mut self) {
        let checkpoint = self.checkpoint();
        self.binary_expr(1);
        if self.at(K::Question) {
            self.start_at(checkpoint, K::ConditionalExpr);
            self.bump();
            self.expr();
            self.expect(K::Colon);
            self.expr();
            self.finish_node();
        }
    }

    fn binary_expr(&mut self, min_precedence: u8) {
        let checkpoint = self.checkpoint();
        self.unary_expr();
        while let Some(precedence) = self.current().binary_precedence() {
            if precedence < min_precedence {
                break;
            }
            self.start_at(checkpoint, K::BinaryExpr);
            self.bump();
            self.binary_expr(precedence + 1);
            self.finish_node();
        }
    }

    fn unary_expr(&mut self) {
        if self.at_any(&[
            K::Bang,
            K::Minus,
            K::Plus,
            K::Tilde,
            K::PlusPlus,
            K::MinusMinus,
        ]) {
            self.start(K::PrefixExpr);
            self.bump();
            self.unary_expr();
            self.finish_node();
        } else {
            self.postfix_expr();
        }
    }

    fn postfix_expr(&mut self) {
        let checkpoint = self.checkpoint();
        if !self.primary_expr() {
            return;
        }
        loop {
            match self.current() {
                K::Dot if matches!(self.nth(1), K::Ident) => {
                    self.start_at(checkpoint, K::MemberAccess);
                    self.bump();
                    self.name_ref();
                    self.finish_node();
                }
                K::LParen => {
                    self.start_at(checkpoint, K::Invocation);
                    self.arg_list();
                    self.finish_node();
                }
                K::LBracket => {
                    self.start_at(checkpoint, K::ElementAccess);
                    self.bump();
                    self.expr();
                    while self.eat(K::Comma) {
                        self.expr();
                    }
                    self.expect(K::RBracket);
                    self.finish_node();
                }
                K::PlusPlus | K::MinusMinus => {
                    self.start_at(checkpoint, K::PostfixExpr);
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    /// Parse a primary expression; returns false if nothing was consumed
    fn primary_expr(&mut self) -> bool {
        match self.current() {
            k if k.is_literal() => {
                self.start(K::Literal);
                self.bump();
                self.finish_node();
            }
            K::Ident if self.nth(1) == K::FatArrow => self.lambda(),
            K::Ident => self.name_ref(),
            k if k.is_predefined_type() => self.name_ref(),
            K::ThisKw => {
                self.start(K::NameRef);
                self.bump();
                self.finish_node();
            }
            K::LParen if self.at_lambda_start() => self.lambda(),
            K::LParen => {
                self.start(K::ParenExpr);
                self.bump();
                self.expr();
                self.expect(K::RParen);
                self.finish_node();
            }
            K::LBracket => self.collection_expr(),
            K::NewKw => self.new_expr(),
            _ => {
                self.error(format!("expected expression, found {}", self.current()));
                return false;
            }
        }
        true
    }

    fn name_ref(&mut self) {
        self.start(K::NameRef);
        self.bump();
        if self.generic_args_ahead() {
            self.type_arg_list();
        }
        self.finish_node();
    }

    fn lambda(&mut self) {
        self.start(K::Lambda);
        self.start(K::LambdaParamList);
        if self.at(K::LParen) {
            self.bump();
            while !self.at(K::RParen) && !self.at(K::Eof) {
                if self
                    .scan_type(self.pos)
                    .is_some_and(|end| self.kind_at(end) == K::Ident)
                {
                    self.type_();
                }
                self.expect(K::Ident);
                if !self.eat(K::Comma) {
                    break;
                }
            }
            self.expect(K::RParen);
        } else {
            self.expect(K::Ident);
        }
        self.finish_node();
        self.expect(K::FatArrow);
        if self.at(K::LBrace) {
            self.block();
        } else {
            self.expr();
        }
        self.finish_node();
    }

    fn arg_list(&mut self) {
        self.start(K::ArgList);
        self.bump();
        if !self.at(K::RParen) {
            self.arg();
            while self.eat(K::Comma) {
                self.arg();
            }
        }
        self.expect(K::RParen);
        self.finish_node();
    }

    fn arg(&mut self) {
        self.start(K::Arg);
        if self.at_any(&[K::OutKw, K::RefKw, K::InKw]) {
            self.bump();
            if self.at_decl_expr() {
                self.start(K::DeclExpr);
                self.type_();
                self.expect(K::Ident);
                self.finish_node();
            } else {
                self.expr();
            }
        } else {
            self.expr();
        }
        self.finish_node();
    }

    fn collection_expr(&mut self) {
        self.start(K::CollectionExpr);
        self.bump();
        while !self.at(K::RBracket) && !self.at(K::Eof) {
            if self.at(K::DotDot) {
                self.start(K::SpreadElement);
                self.bump();
                self.expr();
                self.finish_node();
            } else {
                let before = self.pos;
                self.expr();
                if self.pos == before {
                    break;
                }
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::RBracket);
        self.finish_node();
    }

    fn new_expr(&mut self) {
        if self.nth(1) == K::LBracket {
            self.start(K::ImplicitArrayCreation);
            self.bump();
            self.bump();
            self.expect(K::RBracket);
            self.initializer_list();
            self.finish_node();
            return;
        }
        let checkpoint = self.checkpoint();
        self.bump();
        if self.type_() == Some(K::ArrayType) {
            self.start_at(checkpoint, K::ArrayCreation);
            self.initializer_list();
        } else {
            self.start_at(checkpoint, K::ObjectCreation);
            if self.at(K::LParen) {
                self.arg_list();
            }
            if self.at(K::LBrace) {
                self.initializer_list();
            }
        }
        self.finish_node();
    }

    fn initializer_list(&mut self) {
        self.start(K::InitializerList);
        self.expect(K::LBrace);
        while !self.at(K::RBrace) && !self.at(K::Eof) {
            let before = self.pos;
            self.expr();
            if self.pos == before || !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::RBrace);
        self.finish_node();
    }
}

fn text_range(span: Range<usize>) -> TextRange {
    TextRange::new(TextSize::from(span.start as u32), TextSize::from(span.end as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::SyntaxNode;

    fn parse(source: &str) -> SyntaxNode {
        let (green, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        SyntaxNode::new_root(green)
    }

    fn kinds_of(node: &SyntaxNode) -> Vec<CsSyntaxKind> {
        node.descendants().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_lossless_round_trip() {
        let source = "using System.Linq;\n\nnamespace Tests;\n// lead\nclass Test\n{\n    void Do() // trailing\n    {\n        var x = new[] { 1 }.Append(2) /* c */ .ToList();\n    }\n}\n";
        let root = parse(source);
        assert_eq!(root.text().to_string(), source);
    }

    #[test]
    fn test_broken_input_still_round_trips() {
        let source = "class A { void M() { var = ; ) } }} #";
        let (green, errors) = parse_source(source);
        assert!(!errors.is_empty());
        assert_eq!(SyntaxNode::new_root(green).text().to_string(), source);
    }

    #[test]
    fn test_trailing_trivia_stops_at_newline() {
        let root = parse("class A\n{\n    int x = 1; // one\n    int y = 2;\n}\n");
        let fields: Vec<_> = root
            .descendants()
            .filter(|n| n.kind() == K::FieldDecl)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(fields, vec!["    int x = 1; // one\n", "    int y = 2;\n"]);
    }

    #[test]
    fn test_member_access_chain_is_left_nested() {
        let root = parse("class A { void M() { a.B(1).C(); } }");
        let outer = root
            .descendants()
            .find(|n| n.kind() == K::Invocation)
            .unwrap();
        assert_eq!(outer.text().to_string(), "a.B(1).C()");
        let callee = outer.first_child().unwrap();
        assert_eq!(callee.kind(), K::MemberAccess);
        assert_eq!(callee.first_child().unwrap().text().to_string(), "a.B(1)");
    }

    #[test]
    fn test_generic_call_vs_less_than() {
        let root = parse("class A { void M() { var e = Enumerable.Empty<int>(); var b = x < y; } }");
        let kinds = kinds_of(&root);
        assert!(kinds.contains(&K::TypeArgList));
        assert!(kinds.contains(&K::BinaryExpr));
    }

    #[test]
    fn test_out_arguments() {
        let root = parse("class A { void M() { F(out var a, out int b, out c, out _); } }");
        let decls = root.descendants().filter(|n| n.kind() == K::DeclExpr).count();
        assert_eq!(decls, 2);
    }

    #[test]
    fn test_collection_and_lambda_expressions() {
        let root = parse(
            "class A { void M() { int[] a = [1, ..b, 2]; xs.ForEach(n => F(n)); xs.ForEach((x) => { F(x); }); } }",
        );
        let kinds = kinds_of(&root);
        assert!(kinds.contains(&K::CollectionExpr));
        assert!(kinds.contains(&K::SpreadElement));
        assert_eq!(kinds.iter().filter(|k| **k == K::Lambda).count(), 2);
    }

    #[test]
    fn test_binary_precedence_and_conditional() {
        let root = parse("class A { int M() => !c ? 1 + 2 * 3 : 4; }");
        let conditional = root
            .descendants()
            .find(|n| n.kind() == K::ConditionalExpr)
            .unwrap();
        let children: Vec<_> = conditional.children().map(|n| n.kind()).collect();
        assert_eq!(children, vec![K::PrefixExpr, K::BinaryExpr, K::Literal]);
    }

    #[test]
    fn test_creation_expressions() {
        let root = parse(
            "class A { void M() { var a = new[] { 1 }; var b = new int[] { 6 }; var c = new List<int>() { 1 }; } }",
        );
        let kinds = kinds_of(&root);
        assert!(kinds.contains(&K::ImplicitArrayCreation));
        assert!(kinds.contains(&K::ArrayCreation));
        assert!(kinds.contains(&K::ObjectCreation));
    }

    #[test]
    fn test_declaration_only_members() {
        let root = parse(
            "namespace System.Linq\n{\n    public static class Enumerable\n    {\n        public static IEnumerable<T> Append<T>(this IEnumerable<T> source, T element);\n        public int Count { get; }\n    }\n}\n",
        );
        let kinds = kinds_of(&root);
        assert!(kinds.contains(&K::MethodDecl));
        assert!(kinds.contains(&K::PropertyDecl));
    }

    #[test]
    fn test_fragment_expression_root() {
        let (green, errors) = parse_fragment("[3, ..xs, 2]", FragmentKind::Expression);
        assert!(errors.is_empty());
        let node = SyntaxNode::new_root(green);
        assert_eq!(node.kind(), K::CollectionExpr);
        assert_eq!(node.text().to_string(), "[3, ..xs, 2]");
    }

    #[test]
    fn test_fragment_rejects_leftover_input() {
        let (_, errors) = parse_fragment("a b", FragmentKind::Expression);
        assert!(!errors.is_empty());
    }
}
