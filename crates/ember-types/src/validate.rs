//! Declaration validation.
//!
//! A declared type is usable when it is not recursive outside a pointer,
//! references only declared data types, and uses no type variables beyond
//! the declaration's own generic parameters. Validation runs *before* the
//! declaration's stub is filled, which is what makes direct self-reference
//! detectable: the root's own name still resolves to a stub.

use rustc_hash::FxHashSet;

use crate::error::TypeError;
use crate::intern::TypeInterner;
use crate::scope::TypeVarScope;
use crate::ty::{DataId, TypeId, TypeKind};

/// Validate one member (or alias target) of the declaration named
/// `root_name` with generic parameters `root_generics`.
pub fn validate_declared(
    interner: &TypeInterner,
    scope: &TypeVarScope,
    root_name: &str,
    root_generics: &[String],
    ty: TypeId,
) -> Result<(), TypeError> {
    let mut visited = FxHashSet::default();
    validate_inner(interner, scope, root_name, root_generics, ty, &mut visited)
}

fn validate_inner(
    interner: &TypeInterner,
    scope: &TypeVarScope,
    root_name: &str,
    root_generics: &[String],
    ty: TypeId,
    visited: &mut FxHashSet<DataId>,
) -> Result<(), TypeError> {
    match interner.kind(ty) {
        TypeKind::Data(did) => {
            if !visited.insert(did) {
                return Ok(());
            }
            let (name, is_stub, members, alias) = interner.with_data(did, |def| {
                (
                    def.name.clone(),
                    def.is_stub(),
                    def.members.clone(),
                    def.alias_of,
                )
            });
            if let Some(aliased) = alias {
                return validate_inner(
                    interner,
                    scope,
                    root_name,
                    root_generics,
                    aliased,
                    visited,
                );
            }
            if is_stub {
                if name == root_name {
                    return Err(TypeError::RecursiveType(name));
                }
                return Err(TypeError::UndeclaredType(name));
            }
            for member in members {
                validate_inner(interner, scope, root_name, root_generics, member, visited)?;
            }
            Ok(())
        }
        TypeKind::Tuple { members } => {
            for member in members {
                validate_inner(interner, scope, root_name, root_generics, member, visited)?;
            }
            Ok(())
        }
        TypeKind::Array { elem, .. } => {
            validate_inner(interner, scope, root_name, root_generics, elem, visited)
        }
        // Self-reference behind a pointer is fine, and a function member
        // only stores a pointer-sized reference.
        TypeKind::Ptr { .. } | TypeKind::Function { .. } => Ok(()),
        TypeKind::Var { name } => {
            if let Some(binding) = scope.lookup(&name) {
                if binding == ty {
                    return Ok(());
                }
                return validate_inner(
                    interner,
                    scope,
                    root_name,
                    root_generics,
                    binding,
                    visited,
                );
            }
            if root_generics.iter().any(|g| g == &name) {
                return Ok(());
            }
            Err(TypeError::UnboundTypeVar(name))
        }
        TypeKind::Modified { base, .. } => {
            validate_inner(interner, scope, root_name, root_generics, base, visited)
        }
        TypeKind::Prim(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::DataKind;
    use indexmap::IndexMap;

    fn validate(interner: &TypeInterner, root: &str, generics: &[String], ty: TypeId) -> Result<(), TypeError> {
        let scope = TypeVarScope::new();
        validate_declared(interner, &scope, root, generics, ty)
    }

    #[test]
    fn test_direct_recursion_is_rejected() {
        // type T = T
        let interner = TypeInterner::new();
        let t = interner.data_by_name("T");
        assert_eq!(
            validate(&interner, "T", &[], t),
            Err(TypeError::RecursiveType("T".to_string()))
        );
    }

    #[test]
    fn test_recursion_behind_pointer_is_fine() {
        // type T = T*
        let interner = TypeInterner::new();
        let t_ptr = interner.ptr_to(interner.data_by_name("T"));
        assert_eq!(validate(&interner, "T", &[], t_ptr), Ok(()));
    }

    #[test]
    fn test_undeclared_reference_is_rejected() {
        let interner = TypeInterner::new();
        let member = interner.tuple(vec![TypeId::I32, interner.data_by_name("Missing")]);
        assert_eq!(
            validate(&interner, "T", &[], member),
            Err(TypeError::UndeclaredType("Missing".to_string()))
        );
    }

    #[test]
    fn test_declared_generic_param_is_allowed() {
        let interner = TypeInterner::new();
        let v = interner.type_var("'e");
        assert_eq!(validate(&interner, "T", &["'e".to_string()], v), Ok(()));
        assert_eq!(
            validate(&interner, "T", &[], v),
            Err(TypeError::UnboundTypeVar("'e".to_string()))
        );
    }

    #[test]
    fn test_members_of_declared_types_are_walked() {
        let interner = TypeInterner::new();
        interner.declare_data(
            "Inner",
            vec![TypeId::I32],
            DataKind::Record,
            Vec::new(),
            IndexMap::new(),
        );
        let inner = interner.data_by_name("Inner");
        assert_eq!(validate(&interner, "Outer", &[], inner), Ok(()));
    }
}
