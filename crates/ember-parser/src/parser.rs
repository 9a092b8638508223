//! Recursive-descent parser for Ember declarations and type expressions.
//!
//! Error recovery is per-declaration: a parse error records a diagnostic
//! and skips to the next line, so one bad declaration does not hide the
//! rest of the file.

use ember_common::Span;
use ember_lexer::{Lexer, Token, TokenKind};

use crate::ast::{
    Decl, FuncDecl, ImplDecl, SourceFile, TraitDecl, TypeDecl, TypeDeclBody, TypeExpr,
    TypeExprKind, UnionVariant,
};

/// A parse-time diagnostic, converted to a rendered `Diagnostic` by the
/// driver.
#[derive(Clone, Debug)]
pub struct ParseDiagnostic {
    pub message: String,
    pub span: Span,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<ParseDiagnostic>,
}

type ParseResult<T> = Result<T, ParseDiagnostic>;

impl Parser {
    pub fn new(src: &str) -> Self {
        Parser {
            tokens: Lexer::new(src).tokenize(),
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parse a whole source file, recovering at line boundaries.
    pub fn parse_source_file(mut self) -> (SourceFile, Vec<ParseDiagnostic>) {
        let mut decls = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::Eof) {
                break;
            }
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(diag) => {
                    tracing::debug!("parse error, recovering at next line: {}", diag.message);
                    self.diagnostics.push(diag);
                    self.recover_to_newline();
                }
            }
        }
        (SourceFile { decls }, self.diagnostics)
    }

    /// Parse a single type expression from the input (REPL entry point).
    pub fn parse_standalone_type(mut self) -> ParseResult<TypeExpr> {
        self.skip_newlines();
        let ty = self.parse_type()?;
        self.skip_newlines();
        if !self.at(TokenKind::Eof) {
            return Err(self.err_here("expected end of input after type"));
        }
        Ok(ty)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_decl(&mut self) -> ParseResult<Decl> {
        match self.peek_kind() {
            TokenKind::KwType => self.parse_type_decl().map(Decl::Type),
            TokenKind::KwTrait => self.parse_trait_decl().map(Decl::Trait),
            TokenKind::KwImpl => self.parse_impl_decl().map(Decl::Impl),
            TokenKind::KwFn => self.parse_func_decl().map(Decl::Func),
            _ => Err(self.err_here("expected a declaration (type, trait, impl, or fn)")),
        }
    }

    fn parse_type_decl(&mut self) -> ParseResult<TypeDecl> {
        let start = self.expect(TokenKind::KwType)?.span;
        let name = self.expect_ident()?;

        let mut generics = Vec::new();
        if self.eat(TokenKind::Lt) {
            loop {
                let tv = self.expect(TokenKind::TypeVar)?;
                generics.push(tv.text().to_string());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Gt)?;
        }

        self.expect(TokenKind::Eq)?;

        let body = if self.at(TokenKind::Pipe) {
            let mut variants = Vec::new();
            while self.eat(TokenKind::Pipe) {
                let tag_tok = self.expect(TokenKind::Ident)?;
                let tag = tag_tok.text().to_string();
                let payload = if self.at_type_start() {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let span = match &payload {
                    Some(p) => tag_tok.span.merge(p.span),
                    None => tag_tok.span,
                };
                variants.push(UnionVariant { tag, payload, span });
            }
            TypeDeclBody::Union(variants)
        } else {
            let first = self.parse_type()?;
            if self.at(TokenKind::Comma) {
                let mut members = vec![first];
                while self.eat(TokenKind::Comma) {
                    members.push(self.parse_type()?);
                }
                TypeDeclBody::Record(members)
            } else {
                TypeDeclBody::Alias(first)
            }
        };

        let span = start.merge(self.prev_span());
        self.expect_line_end()?;
        Ok(TypeDecl {
            name,
            generics,
            body,
            span,
        })
    }

    fn parse_trait_decl(&mut self) -> ParseResult<TraitDecl> {
        let start = self.expect(TokenKind::KwTrait)?.span;
        let name = self.expect_ident()?;
        let span = start.merge(self.prev_span());
        self.expect_line_end()?;
        Ok(TraitDecl { name, span })
    }

    fn parse_impl_decl(&mut self) -> ParseResult<ImplDecl> {
        let start = self.expect(TokenKind::KwImpl)?.span;
        let trait_name = self.expect_ident()?;
        self.expect(TokenKind::KwFor)?;
        let type_name = self.expect_ident()?;
        let span = start.merge(self.prev_span());
        self.expect_line_end()?;
        Ok(ImplDecl {
            trait_name,
            type_name,
            span,
        })
    }

    fn parse_func_decl(&mut self) -> ParseResult<FuncDecl> {
        let start = self.expect(TokenKind::KwFn)?.span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;
        let ret = self.parse_type()?;

        let span = start.merge(self.prev_span());
        self.expect_line_end()?;
        Ok(FuncDecl {
            name,
            params,
            ret,
            span,
        })
    }

    // =========================================================================
    // Type expressions
    // =========================================================================

    /// type := modifier* core ('*')*
    pub fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span();

        let mut modifiers = Vec::new();
        while self.peek_kind().is_modifier() {
            modifiers.push(self.advance().kind);
        }

        let mut ty = self.parse_core_type()?;

        // Pointer suffixes bind tighter than the modifier prefix.
        while self.eat(TokenKind::Star) {
            let span = start.merge(self.prev_span());
            ty = TypeExpr::new(TypeExprKind::Ptr(Box::new(ty)), span);
        }

        // A parenthesized core may already carry its own modifiers;
        // prepend ours rather than dropping them.
        if !modifiers.is_empty() {
            let mut combined = modifiers;
            combined.append(&mut ty.modifiers);
            ty.modifiers = combined;
        }
        ty.span = start.merge(ty.span);
        Ok(ty)
    }

    fn parse_core_type(&mut self) -> ParseResult<TypeExpr> {
        match self.peek_kind() {
            TokenKind::Ident => {
                let tok = self.advance();
                let name = tok.text().to_string();
                let mut span = tok.span;

                let mut args = Vec::new();
                if self.eat(TokenKind::Lt) {
                    loop {
                        args.push(self.parse_type()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::Gt)?;
                    span = span.merge(self.prev_span());
                }

                Ok(TypeExpr::new(TypeExprKind::Named { name, args }, span))
            }
            TokenKind::TypeVar => {
                let tok = self.advance();
                let name = tok.text().to_string();
                Ok(TypeExpr::new(TypeExprKind::Var { name }, tok.span))
            }
            TokenKind::LBracket => {
                let start = self.advance().span;
                let len_tok = self.expect(TokenKind::IntLit)?;
                let len = match len_tok.int_value.unwrap_or(0) {
                    0 => None,
                    n => Some(n),
                };
                let elem = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let span = start.merge(self.prev_span());
                Ok(TypeExpr::new(
                    TypeExprKind::Array {
                        elem: Box::new(elem),
                        len,
                    },
                    span,
                ))
            }
            TokenKind::LParen => {
                let start = self.advance().span;

                if self.eat(TokenKind::RParen) {
                    let span = start.merge(self.prev_span());
                    // `() -> t` is a zero-parameter function type.
                    if self.eat(TokenKind::Arrow) {
                        let ret = self.parse_type()?;
                        let span = span.merge(self.prev_span());
                        return Ok(TypeExpr::new(
                            TypeExprKind::Function {
                                params: Vec::new(),
                                ret: Box::new(ret),
                            },
                            span,
                        ));
                    }
                    return Ok(TypeExpr::new(TypeExprKind::Unit, span));
                }

                let mut members = vec![self.parse_type()?];
                while self.eat(TokenKind::Comma) {
                    members.push(self.parse_type()?);
                }
                self.expect(TokenKind::RParen)?;
                let mut span = start.merge(self.prev_span());

                if self.eat(TokenKind::Arrow) {
                    let ret = self.parse_type()?;
                    span = span.merge(self.prev_span());
                    return Ok(TypeExpr::new(
                        TypeExprKind::Function {
                            params: members,
                            ret: Box::new(ret),
                        },
                        span,
                    ));
                }

                if members.len() == 1 {
                    // Parenthesized type, not a tuple.
                    return Ok(members.into_iter().next().unwrap());
                }
                Ok(TypeExpr::new(TypeExprKind::Tuple(members), span))
            }
            _ => Err(self.err_here("expected a type")),
        }
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident | TokenKind::TypeVar | TokenKind::LParen | TokenKind::LBracket
        ) || self.peek_kind().is_modifier()
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_span(&self) -> Span {
        self.peek().span
    }

    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            return Span::dummy();
        }
        self.tokens[self.pos - 1].span
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.err_here(&format!("expected {:?}, found {:?}", kind, self.peek_kind())))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        let tok = self.expect(TokenKind::Ident)?;
        Ok(tok.text().to_string())
    }

    fn expect_line_end(&mut self) -> ParseResult<()> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.err_here("expected end of line after declaration")),
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    fn recover_to_newline(&mut self) {
        while !self.at(TokenKind::Newline) && !self.at(TokenKind::Eof) {
            self.advance();
        }
        self.skip_newlines();
    }

    fn err_here(&self, message: &str) -> ParseDiagnostic {
        ParseDiagnostic {
            message: message.to_string(),
            span: self.peek_span(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> SourceFile {
        let (file, diags) = Parser::new(src).parse_source_file();
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        file
    }

    #[test]
    fn test_alias_vs_record() {
        let file = parse_ok("type A = i32\ntype B = i32, f64");
        assert_eq!(file.decls.len(), 2);
        match &file.decls[0] {
            Decl::Type(d) => assert!(matches!(d.body, TypeDeclBody::Alias(_))),
            other => panic!("expected type decl, got {other:?}"),
        }
        match &file.decls[1] {
            Decl::Type(d) => match &d.body {
                TypeDeclBody::Record(members) => assert_eq!(members.len(), 2),
                other => panic!("expected record, got {other:?}"),
            },
            other => panic!("expected type decl, got {other:?}"),
        }
    }

    #[test]
    fn test_tagged_union_decl() {
        let file = parse_ok("type Maybe<'t> = | Some 't | None");
        match &file.decls[0] {
            Decl::Type(d) => {
                assert_eq!(d.generics, vec!["'t"]);
                match &d.body {
                    TypeDeclBody::Union(variants) => {
                        assert_eq!(variants.len(), 2);
                        assert_eq!(variants[0].tag, "Some");
                        assert!(variants[0].payload.is_some());
                        assert!(variants[1].payload.is_none());
                    }
                    other => panic!("expected union, got {other:?}"),
                }
            }
            other => panic!("expected type decl, got {other:?}"),
        }
    }

    #[test]
    fn test_function_type_and_decl() {
        let file = parse_ok("fn add: (i32, i32) -> i32");
        match &file.decls[0] {
            Decl::Func(f) => {
                assert_eq!(f.name, "add");
                assert_eq!(f.params.len(), 2);
            }
            other => panic!("expected fn decl, got {other:?}"),
        }
    }

    #[test]
    fn test_pointer_and_array() {
        let ty = Parser::new("[4 i32*]").parse_standalone_type().unwrap();
        match ty.kind {
            TypeExprKind::Array { elem, len } => {
                assert_eq!(len, Some(4));
                assert!(matches!(elem.kind, TypeExprKind::Ptr(_)));
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_length_array_is_unknown() {
        let ty = Parser::new("[0 u8]").parse_standalone_type().unwrap();
        match ty.kind {
            TypeExprKind::Array { len, .. } => assert_eq!(len, None),
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_modifier_prefix() {
        let ty = Parser::new("mut i32").parse_standalone_type().unwrap();
        assert_eq!(ty.modifiers, vec![TokenKind::KwMut]);
    }

    #[test]
    fn test_recovery_keeps_later_decls() {
        let (file, diags) = Parser::new("type = broken\ntrait Eq").parse_source_file();
        assert_eq!(diags.len(), 1);
        assert_eq!(file.decls.len(), 1);
        assert!(matches!(file.decls[0], Decl::Trait(_)));
    }
}
