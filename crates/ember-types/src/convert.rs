//! Canonicalization of syntactic type expressions.
//!
//! `from_syntactic` is the parser-facing entry point of the type layer:
//! it recursively interns a `TypeExpr` into a `TypeId`. Unknown names are
//! not an error here — a named reference becomes a stub and later passes
//! decide whether that is a problem.

use ember_parser::{TypeExpr, TypeExprKind};

use crate::canon::data_ref;
use crate::intern::TypeInterner;
use crate::modifier::ModifierSet;
use crate::tag::Prim;
use crate::ty::TypeId;

/// Intern the type denoted by a syntactic type expression.
pub fn from_syntactic(interner: &TypeInterner, expr: &TypeExpr) -> TypeId {
    let core = match &expr.kind {
        TypeExprKind::Named { name, args } => {
            if args.is_empty() {
                if let Some(prim) = Prim::from_name(name) {
                    interner.primitive(prim)
                } else {
                    interner.data_by_name(name)
                }
            } else {
                let arg_ids: Vec<TypeId> = args
                    .iter()
                    .map(|a| from_syntactic(interner, a))
                    .collect();
                data_ref(interner, name, &arg_ids)
            }
        }
        TypeExprKind::Var { name } => interner.type_var(name),
        TypeExprKind::Ptr(inner) => {
            let elem = from_syntactic(interner, inner);
            interner.ptr_to(elem)
        }
        TypeExprKind::Array { elem, len } => {
            let elem = from_syntactic(interner, elem);
            interner.array_of(elem, *len)
        }
        TypeExprKind::Tuple(members) => {
            let members = members
                .iter()
                .map(|m| from_syntactic(interner, m))
                .collect();
            interner.tuple(members)
        }
        TypeExprKind::Function { params, ret } => {
            let ret = from_syntactic(interner, ret);
            let params = params
                .iter()
                .map(|p| from_syntactic(interner, p))
                .collect();
            interner.function(ret, params, false)
        }
        TypeExprKind::Unit => TypeId::VOID,
    };

    let mut mods = ModifierSet::empty();
    for &token in &expr.modifiers {
        if let Some(flag) = ModifierSet::from_token(token) {
            mods |= flag;
        }
    }
    interner.with_modifier_set(core, mods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::format_type;
    use ember_parser::Parser;

    fn convert(interner: &TypeInterner, src: &str) -> TypeId {
        let expr = Parser::new(src)
            .parse_standalone_type()
            .unwrap_or_else(|e| panic!("parse of `{src}` failed: {}", e.message));
        from_syntactic(interner, &expr)
    }

    #[test]
    fn test_primitives_resolve() {
        let interner = TypeInterner::new();
        assert_eq!(convert(&interner, "i32"), TypeId::I32);
        assert_eq!(convert(&interner, "bool"), TypeId::BOOL);
    }

    #[test]
    fn test_structures_canonicalize() {
        let interner = TypeInterner::new();
        let t = convert(&interner, "(i32, [4 u8])*");
        assert_eq!(format_type(&interner, t), "(i32, [4 u8])*");
        assert_eq!(t, convert(&interner, "(i32, [4 u8])*"));
    }

    #[test]
    fn test_unknown_name_becomes_stub() {
        let interner = TypeInterner::new();
        let t = convert(&interner, "Widget");
        let did = interner.data_id_of(t).expect("named type");
        assert!(interner.with_data(did, |d| d.is_stub()));
    }

    #[test]
    fn test_modifiers_apply() {
        let interner = TypeInterner::new();
        let t = convert(&interner, "mut i32");
        assert!(interner.has_modifier(t, ModifierSet::MUT));
        assert_eq!(interner.strip_modifiers(t), TypeId::I32);
    }

    #[test]
    fn test_function_expr() {
        let interner = TypeInterner::new();
        let t = convert(&interner, "(i32, bool) -> void");
        assert_eq!(
            t,
            interner.function(TypeId::VOID, vec![TypeId::I32, TypeId::BOOL], false)
        );
    }
}
