//! The canonical type printer.
//!
//! The printed form doubles as the identity authority of the arena: two
//! types print equally iff they are the same interned id. The grammar is
//! stable; diagnostics, intern keys for named variants, and the REPL all
//! share it.

use crate::intern::TypeInterner;
use crate::ty::{DataDef, TypeId, TypeKind};

/// Render a type in its canonical string form.
pub fn format_type(interner: &TypeInterner, ty: TypeId) -> String {
    match interner.kind(ty) {
        TypeKind::Prim(p) => p.name().to_string(),
        TypeKind::Ptr { elem } => format!("{}*", format_type(interner, elem)),
        TypeKind::Array { elem, len } => {
            format!(
                "[{} {}]",
                len.unwrap_or(0),
                format_type(interner, elem)
            )
        }
        TypeKind::Tuple { members } => {
            let inner: Vec<String> = members.iter().map(|&m| format_type(interner, m)).collect();
            format!("({})", inner.join(", "))
        }
        TypeKind::Function { ret, params, .. } => {
            let inner: Vec<String> = params.iter().map(|&p| format_type(interner, p)).collect();
            format!("({}) -> {}", inner.join(", "), format_type(interner, ret))
        }
        TypeKind::Var { name } => name,
        TypeKind::Data(did) => {
            let def = interner.data(did);
            display_name(interner, &def)
        }
        TypeKind::Modified { mods, base } => {
            format!("{}{}", mods.prefix(), format_type(interner, base))
        }
    }
}

/// The display name of a data definition: bound variants print their
/// arguments inside angle brackets, collapsing to the bare name when no
/// non-variable arguments remain.
pub fn display_name(interner: &TypeInterner, def: &DataDef) -> String {
    if !def.is_variant() {
        return def.name.clone();
    }
    let all_vars = def
        .bound_args
        .iter()
        .all(|&(_, ty)| matches!(interner.kind(ty), TypeKind::Var { .. }));
    if all_vars {
        return def.name.clone();
    }
    bound_name(interner, &def.name, def.bound_args.iter().map(|&(_, ty)| ty))
}

/// The unique interned name of a variant: base name plus the
/// comma-separated canonical forms of its arguments. Used as the arena
/// key, so it never collapses.
pub fn bound_name(
    interner: &TypeInterner,
    base: &str,
    args: impl IntoIterator<Item = TypeId>,
) -> String {
    let rendered: Vec<String> = args
        .into_iter()
        .map(|ty| format_type(interner, ty))
        .collect();
    if rendered.is_empty() {
        return base.to_string();
    }
    format!("{}<{}>", base, rendered.join(","))
}
