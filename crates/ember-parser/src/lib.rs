//! AST and recursive-descent parser for the Ember language.
//!
//! The contract with the type layer is `ast::TypeExpr`; the contract with
//! the driver is `Parser::parse_source_file` plus `ParseDiagnostic`.

pub mod ast;
pub mod parser;
pub mod print;

pub use ast::{
    Decl, FuncDecl, ImplDecl, SourceFile, TraitDecl, TypeDecl, TypeDeclBody, TypeExpr,
    TypeExprKind, UnionVariant,
};
pub use parser::{ParseDiagnostic, Parser};
