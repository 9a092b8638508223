//! Lexical type-variable scope and the trait registry.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ty::TypeId;

/// A stack of type-variable binding scopes. Lookup walks innermost-out.
#[derive(Debug, Default)]
pub struct TypeVarScope {
    scopes: Vec<FxHashMap<String, TypeId>>,
}

impl TypeVarScope {
    pub fn new() -> Self {
        TypeVarScope {
            scopes: vec![FxHashMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            self.scopes[0].clear();
        }
    }

    /// Bind `name` in the innermost scope.
    pub fn bind(&mut self, name: impl Into<String>, ty: TypeId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), ty);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&ty) = scope.get(name) {
                return Some(ty);
            }
        }
        None
    }
}

/// The set of declared trait names. Trait resolution is name matching
/// against each data type's implementor list — nothing more.
#[derive(Debug, Default)]
pub struct TraitRegistry {
    names: FxHashSet<String>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        TraitRegistry::default()
    }

    pub fn declare(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_shadowing() {
        let mut scope = TypeVarScope::new();
        scope.bind("'t", TypeId::I32);
        scope.push_scope();
        scope.bind("'t", TypeId::BOOL);
        assert_eq!(scope.lookup("'t"), Some(TypeId::BOOL));
        scope.pop_scope();
        assert_eq!(scope.lookup("'t"), Some(TypeId::I32));
    }

    #[test]
    fn test_trait_registry() {
        let mut traits = TraitRegistry::new();
        traits.declare("Print");
        assert!(traits.contains("Print"));
        assert!(!traits.contains("Eq"));
    }
}
