//! Parse-tree printer backing the `-p` flag.

use crate::ast::{Decl, SourceFile, TypeDeclBody, TypeExpr, TypeExprKind};

/// Render the parse tree of a file as an indented listing.
pub fn print_source_file(file: &SourceFile) -> String {
    let mut out = String::new();
    for decl in &file.decls {
        print_decl(decl, 0, &mut out);
    }
    out
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn print_decl(decl: &Decl, depth: usize, out: &mut String) {
    indent(depth, out);
    match decl {
        Decl::Type(d) => {
            out.push_str("TypeDecl ");
            out.push_str(&d.name);
            if !d.generics.is_empty() {
                out.push('<');
                out.push_str(&d.generics.join(", "));
                out.push('>');
            }
            out.push('\n');
            match &d.body {
                TypeDeclBody::Record(members) => {
                    for m in members {
                        print_type(m, depth + 1, out);
                    }
                }
                TypeDeclBody::Union(variants) => {
                    for v in variants {
                        indent(depth + 1, out);
                        out.push_str("Variant ");
                        out.push_str(&v.tag);
                        out.push('\n');
                        if let Some(payload) = &v.payload {
                            print_type(payload, depth + 2, out);
                        }
                    }
                }
                TypeDeclBody::Alias(ty) => {
                    indent(depth + 1, out);
                    out.push_str("Alias\n");
                    print_type(ty, depth + 2, out);
                }
            }
        }
        Decl::Trait(d) => {
            out.push_str("TraitDecl ");
            out.push_str(&d.name);
            out.push('\n');
        }
        Decl::Impl(d) => {
            out.push_str("ImplDecl ");
            out.push_str(&d.trait_name);
            out.push_str(" for ");
            out.push_str(&d.type_name);
            out.push('\n');
        }
        Decl::Func(d) => {
            out.push_str("FuncDecl ");
            out.push_str(&d.name);
            out.push('\n');
            for p in &d.params {
                print_type(p, depth + 1, out);
            }
            indent(depth + 1, out);
            out.push_str("-> \n");
            print_type(&d.ret, depth + 2, out);
        }
    }
}

fn print_type(ty: &TypeExpr, depth: usize, out: &mut String) {
    indent(depth, out);
    match &ty.kind {
        TypeExprKind::Named { name, args } => {
            out.push_str("Named ");
            out.push_str(name);
            out.push('\n');
            for arg in args {
                print_type(arg, depth + 1, out);
            }
        }
        TypeExprKind::Var { name } => {
            out.push_str("Var ");
            out.push_str(name);
            out.push('\n');
        }
        TypeExprKind::Ptr(inner) => {
            out.push_str("Ptr\n");
            print_type(inner, depth + 1, out);
        }
        TypeExprKind::Array { elem, len } => {
            out.push_str("Array ");
            match len {
                Some(n) => out.push_str(&n.to_string()),
                None => out.push('?'),
            }
            out.push('\n');
            print_type(elem, depth + 1, out);
        }
        TypeExprKind::Tuple(members) => {
            out.push_str("Tuple\n");
            for m in members {
                print_type(m, depth + 1, out);
            }
        }
        TypeExprKind::Function { params, ret } => {
            out.push_str("Function\n");
            for p in params {
                print_type(p, depth + 1, out);
            }
            indent(depth + 1, out);
            out.push_str("-> \n");
            print_type(ret, depth + 2, out);
        }
        TypeExprKind::Unit => out.push_str("Unit\n"),
    }
}
