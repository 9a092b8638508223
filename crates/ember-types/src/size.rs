//! Bit-width computation for closed types.

use crate::error::TypeError;
use crate::intern::TypeInterner;
use crate::scope::TypeVarScope;
use crate::ty::{DataId, DataKind, TypeId, TypeKind};

/// Compute the size of a type in bits.
///
/// Aggregates sum their members, arrays multiply by length, and a tagged
/// union is as large as its largest member. Type variables consult the
/// surrounding scope; with `force` set, an unbound variable falls back to
/// the native pointer width instead of erroring. Stubs always error with
/// `IncompleteType`.
pub fn size_in_bits(
    interner: &TypeInterner,
    scope: &TypeVarScope,
    ty: TypeId,
    force: bool,
) -> Result<u64, TypeError> {
    let ptr_width = interner.ptr_width();
    match interner.kind(ty) {
        TypeKind::Prim(p) => Ok(p.bit_width(ptr_width)),
        TypeKind::Ptr { .. } | TypeKind::Function { .. } => Ok(ptr_width),
        TypeKind::Array { elem, len } => {
            let elem_size = size_in_bits(interner, scope, elem, force)?;
            Ok(len.unwrap_or(0) * elem_size)
        }
        TypeKind::Tuple { members } => {
            let mut total = 0;
            for member in members {
                total += size_in_bits(interner, scope, member, force)?;
            }
            Ok(total)
        }
        TypeKind::Var { name } => match scope.lookup(&name) {
            Some(binding) if binding == ty => Err(TypeError::SelfReferentialTypeVar(name)),
            Some(binding) => size_in_bits(interner, scope, binding, force),
            None if force => Ok(ptr_width),
            None => Err(TypeError::UnboundTypeVar(name)),
        },
        TypeKind::Data(did) => data_size(interner, scope, did, force),
        TypeKind::Modified { base, .. } => size_in_bits(interner, scope, base, force),
    }
}

fn data_size(
    interner: &TypeInterner,
    scope: &TypeVarScope,
    did: DataId,
    force: bool,
) -> Result<u64, TypeError> {
    let def = interner.data(did);
    if let Some(aliased) = def.alias_of {
        return size_in_bits(interner, scope, aliased, force);
    }
    if def.is_stub() {
        return Err(TypeError::IncompleteType(def.name));
    }
    match def.kind {
        DataKind::Record => {
            let mut total = 0;
            for member in def.members {
                total += size_in_bits(interner, scope, member, force)?;
            }
            Ok(total)
        }
        // The discriminant is not counted; the largest member dominates.
        DataKind::TaggedUnion => {
            let mut largest = 0;
            for member in def.members {
                largest = largest.max(size_in_bits(interner, scope, member, force)?);
            }
            Ok(largest)
        }
    }
}

/// The member of a tagged union with the greatest size; lowering uses it
/// as the union's body. Members whose size cannot be computed count as
/// zero-sized.
pub fn largest_member(
    interner: &TypeInterner,
    scope: &TypeVarScope,
    did: DataId,
    force: bool,
) -> Option<TypeId> {
    let members = interner.with_data(did, |def| def.members.clone());
    let mut largest: Option<TypeId> = None;
    let mut largest_size = 0u64;
    for member in members {
        let size = match size_in_bits(interner, scope, member, force) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!("cannot size union member: {err}");
                0
            }
        };
        if largest.is_none() || size > largest_size {
            largest = Some(member);
            largest_size = size;
        }
    }
    largest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::DataKind;
    use indexmap::IndexMap;

    fn size(interner: &TypeInterner, ty: TypeId) -> Result<u64, TypeError> {
        let scope = TypeVarScope::new();
        size_in_bits(interner, &scope, ty, false)
    }

    #[test]
    fn test_primitive_sizes() {
        let interner = TypeInterner::new();
        assert_eq!(size(&interner, TypeId::I8), Ok(8));
        assert_eq!(size(&interner, TypeId::BOOL), Ok(1));
        assert_eq!(size(&interner, TypeId::USZ), Ok(64));
    }

    #[test]
    fn test_aggregate_is_additive_array_is_multiplicative() {
        let interner = TypeInterner::new();
        let tup = interner.tuple(vec![TypeId::I32, TypeId::F64]);
        assert_eq!(size(&interner, tup), Ok(96));
        let arr = interner.array_of(tup, Some(3));
        assert_eq!(size(&interner, arr), Ok(288));
        let unknown = interner.array_of(TypeId::I32, None);
        assert_eq!(size(&interner, unknown), Ok(0));
    }

    #[test]
    fn test_pointers_and_functions_are_word_sized() {
        let interner = TypeInterner::with_ptr_width(32);
        let ptr = interner.ptr_to(TypeId::I64);
        assert_eq!(
            size_in_bits(&interner, &TypeVarScope::new(), ptr, false),
            Ok(32)
        );
        let f = interner.function(TypeId::VOID, vec![TypeId::I64], false);
        assert_eq!(
            size_in_bits(&interner, &TypeVarScope::new(), f, false),
            Ok(32)
        );
    }

    #[test]
    fn test_stub_is_incomplete() {
        let interner = TypeInterner::new();
        let stub = interner.data_by_name("Later");
        assert_eq!(
            size(&interner, stub),
            Err(TypeError::IncompleteType("Later".to_string()))
        );
    }

    #[test]
    fn test_union_takes_largest_member() {
        let interner = TypeInterner::new();
        let mut tags = IndexMap::new();
        tags.insert("None".to_string(), 0u16);
        tags.insert("Some".to_string(), 1u16);
        let union = interner.declare_data(
            "Maybe64",
            vec![TypeId::VOID, TypeId::I64],
            DataKind::TaggedUnion,
            Vec::new(),
            tags,
        );
        assert_eq!(size(&interner, union), Ok(64));
    }

    #[test]
    fn test_unbound_var_errors_unless_forced() {
        let interner = TypeInterner::new();
        let v = interner.type_var("'x");
        let scope = TypeVarScope::new();
        assert_eq!(
            size_in_bits(&interner, &scope, v, false),
            Err(TypeError::UnboundTypeVar("'x".to_string()))
        );
        assert_eq!(size_in_bits(&interner, &scope, v, true), Ok(64));
    }

    #[test]
    fn test_bound_var_uses_scope() {
        let interner = TypeInterner::new();
        let v = interner.type_var("'x");
        let mut scope = TypeVarScope::new();
        scope.bind("'x", TypeId::I16);
        assert_eq!(size_in_bits(&interner, &scope, v, false), Ok(16));
    }
}
