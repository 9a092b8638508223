//! AST node definitions.
//!
//! The parser's contract with the type layer is the [`TypeExpr`] node: a
//! kind tag, ordered child nodes, an optional name, optional generic
//! arguments and a list of modifier tokens. The type layer canonicalizes
//! these into interned types; nothing downstream looks at the AST again.

use ember_common::{Span, Spanned};
use ember_lexer::TokenKind;

/// A syntactic type expression, prior to canonicalization.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    /// Modifier tokens written before the type (`mut i32*`).
    pub modifiers: Vec<TokenKind>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeExprKind {
    /// A named type: primitive, declared data type, or generic
    /// instantiation `Name<args>`. Resolution happens in the type layer.
    Named {
        name: String,
        args: Vec<TypeExpr>,
    },
    /// A type variable, name stored with its leading `'`.
    Var { name: String },
    Ptr(Box<TypeExpr>),
    /// `[len elem]`; a length of 0 in source means unknown.
    Array {
        elem: Box<TypeExpr>,
        len: Option<u64>,
    },
    Tuple(Vec<TypeExpr>),
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
    /// `()` — the void type.
    Unit,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        TypeExpr {
            kind,
            modifiers: Vec::new(),
            span,
        }
    }
}

impl Spanned for TypeExpr {
    fn span(&self) -> Span {
        self.span
    }
}

/// A top-level declaration.
#[derive(Clone, Debug)]
pub enum Decl {
    Type(TypeDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    Func(FuncDecl),
}

impl Spanned for Decl {
    fn span(&self) -> Span {
        match self {
            Decl::Type(d) => d.span,
            Decl::Trait(d) => d.span,
            Decl::Impl(d) => d.span,
            Decl::Func(d) => d.span,
        }
    }
}

/// `type Name<'a, 'b> = <body>`
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    /// Ordered generic parameter names, each with its leading `'`.
    pub generics: Vec<String>,
    pub body: TypeDeclBody,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum TypeDeclBody {
    /// `type T = i32, f64` — ordered unnamed members.
    Record(Vec<TypeExpr>),
    /// `type T = | Tag ty | Other` — tagged union variants.
    Union(Vec<UnionVariant>),
    /// `type T = U` — a transparent alias.
    Alias(TypeExpr),
}

#[derive(Clone, Debug)]
pub struct UnionVariant {
    pub tag: String,
    pub payload: Option<TypeExpr>,
    pub span: Span,
}

/// `trait Name`
#[derive(Clone, Debug)]
pub struct TraitDecl {
    pub name: String,
    pub span: Span,
}

/// `impl Trait for Type`
#[derive(Clone, Debug)]
pub struct ImplDecl {
    pub trait_name: String,
    pub type_name: String,
    pub span: Span,
}

/// `fn name: (params) -> ret` — a signature declaration. Bodies are not
/// part of this front-end; signatures feed candidate resolution.
#[derive(Clone, Debug)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<TypeExpr>,
    pub ret: TypeExpr,
    pub span: Span,
}

/// One parsed source file.
#[derive(Clone, Debug, Default)]
pub struct SourceFile {
    pub decls: Vec<Decl>,
}
