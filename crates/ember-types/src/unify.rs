//! Type equivalence with accumulated bindings — the central operation of
//! the compiler.
//!
//! `type_eq` decides whether two types match and, when the match depends
//! on type-variable assignments, which bindings the caller must adopt.
//! Failure is the *normal* signal that a candidate does not apply; the
//! one genuinely fatal condition — a type variable bound to itself in the
//! surrounding scope — travels separately in `TypeCheckResult::fatal` so
//! candidate filtering cannot swallow it. Match counts tally atomic
//! equality steps so overload resolution can prefer the most specific
//! candidate.

use crate::bind::{TypeBinding, find_binding};
use crate::error::TypeError;
use crate::intern::TypeInterner;
use crate::scope::{TraitRegistry, TypeVarScope};
use crate::ty::{DataDef, DataId, TypeId, TypeKind};

/// Outcome of an equivalence check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    /// Identical closed types (or identical under already-accumulated
    /// bindings).
    Success,
    /// Equal only if the accumulated bindings are adopted by the caller.
    SuccessWithTypeVars,
    /// No assignment of bindings can make the types equal.
    Failure,
}

/// The mutable result threaded through an equivalence check.
#[derive(Clone, Debug)]
pub struct TypeCheckResult {
    pub status: CheckStatus,
    /// Atomic equality steps performed; the overload-ranking metric.
    pub match_count: u32,
    /// Append-only: on a repeated name the first binding stands and later
    /// occurrences are checked against it.
    pub bindings: Vec<TypeBinding>,
    /// Set when the check tripped over a genuinely fatal condition — a
    /// self-referential type-variable binding — as opposed to the
    /// ordinary `Failure` that just means a candidate does not apply.
    /// Callers that treat `Failure` as "try the next candidate" must
    /// check this first.
    pub fatal: Option<TypeError>,
}

impl TypeCheckResult {
    pub fn new() -> Self {
        TypeCheckResult {
            status: CheckStatus::Success,
            match_count: 0,
            bindings: Vec::new(),
            fatal: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.status == CheckStatus::Failure
    }

    pub fn succeeded(&self) -> bool {
        !self.failed()
    }

    fn success(&mut self, matches: u32) {
        if self.status != CheckStatus::Failure {
            self.match_count += matches;
        }
    }

    fn success_one(&mut self) {
        self.success(1);
    }

    fn success_with_type_vars(&mut self) {
        if self.status != CheckStatus::Failure {
            self.status = CheckStatus::SuccessWithTypeVars;
        }
    }

    fn failure(&mut self) {
        self.status = CheckStatus::Failure;
    }

    fn fatal_failure(&mut self, err: TypeError) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.status = CheckStatus::Failure;
    }

    fn success_if(&mut self, cond: bool) {
        if cond {
            self.success_one();
        } else {
            self.failure();
        }
    }
}

impl Default for TypeCheckResult {
    fn default() -> Self {
        TypeCheckResult::new()
    }
}

/// Borrows everything an equivalence check consults: the arena, the
/// lexical type-variable scope, and the trait registry.
pub struct Unifier<'a> {
    pub types: &'a TypeInterner,
    pub scope: &'a TypeVarScope,
    pub traits: &'a TraitRegistry,
}

impl<'a> Unifier<'a> {
    pub fn new(
        types: &'a TypeInterner,
        scope: &'a TypeVarScope,
        traits: &'a TraitRegistry,
    ) -> Self {
        Unifier {
            types,
            scope,
            traits,
        }
    }

    /// Check two types for equivalence.
    pub fn type_eq(&self, l: TypeId, r: TypeId) -> TypeCheckResult {
        let mut tcr = TypeCheckResult::new();
        self.eq_helper(l, r, &mut tcr);
        tcr
    }

    /// List equivalence: pairwise over equal-length lists, sharing one
    /// accumulated binding set. Used for call-site argument matching.
    pub fn type_eq_list(&self, ls: &[TypeId], rs: &[TypeId]) -> TypeCheckResult {
        let mut tcr = TypeCheckResult::new();
        if ls.len() != rs.len() {
            tcr.failure();
            return tcr;
        }
        for (&l, &r) in ls.iter().zip(rs.iter()) {
            self.eq_helper(l, r, &mut tcr);
            if tcr.failed() {
                return tcr;
            }
        }
        tcr
    }

    fn eq_helper(&self, l: TypeId, r: TypeId, tcr: &mut TypeCheckResult) {
        if tcr.failed() {
            return;
        }

        // Modifiers never affect matching.
        let l = self.types.strip_modifiers(l);
        let r = self.types.strip_modifiers(r);

        // Interned-id equality is exact structural equality for closed
        // types; credit the whole subtree's atoms at once.
        if l == r && !self.types.is_generic(l) {
            tcr.success(self.types.atom_count(l));
            return;
        }

        // Alias unwrap.
        if let Some(aliased) = self.alias_of(l) {
            return self.eq_helper(aliased, r, tcr);
        }
        if let Some(aliased) = self.alias_of(r) {
            return self.eq_helper(l, aliased, tcr);
        }

        let lkind = self.types.kind(l);
        let rkind = self.types.kind(r);

        if let (TypeKind::Data(ld), TypeKind::Data(rd)) = (&lkind, &rkind) {
            return self.eq_data(*ld, *rd, tcr);
        }

        if matches!(lkind, TypeKind::Var { .. }) || matches!(rkind, TypeKind::Var { .. }) {
            return self.eq_vars(l, r, tcr);
        }

        match (lkind, rkind) {
            (TypeKind::Prim(a), TypeKind::Prim(b)) => tcr.success_if(a == b),
            (TypeKind::Ptr { elem: le }, TypeKind::Ptr { elem: re }) => {
                tcr.success_one();
                self.eq_helper(le, re, tcr);
            }
            (
                TypeKind::Array { elem: le, len: ll },
                TypeKind::Array { elem: re, len: rl },
            ) => {
                tcr.success_one();
                if ll != rl {
                    tcr.failure();
                    return;
                }
                self.eq_helper(le, re, tcr);
            }
            (TypeKind::Tuple { members: lm }, TypeKind::Tuple { members: rm }) => {
                self.eq_members(&lm, &rm, tcr);
            }
            (
                TypeKind::Function {
                    ret: lret,
                    params: lparams,
                    is_meta: lmeta,
                },
                TypeKind::Function {
                    ret: rret,
                    params: rparams,
                    is_meta: rmeta,
                },
            ) => {
                if lmeta != rmeta {
                    tcr.failure();
                    return;
                }
                // Position 0 is the return type.
                let mut lm = vec![lret];
                lm.extend(lparams);
                let mut rm = vec![rret];
                rm.extend(rparams);
                self.eq_members(&lm, &rm, tcr);
            }
            _ => tcr.failure(),
        }
    }

    fn alias_of(&self, ty: TypeId) -> Option<TypeId> {
        match self.types.kind(ty) {
            TypeKind::Data(did) => self.types.with_data(did, |def| def.alias_of),
            _ => None,
        }
    }

    /// Member lists must be the same length and match pairwise; a final
    /// atomic step credits the structure itself.
    fn eq_members(&self, ls: &[TypeId], rs: &[TypeId], tcr: &mut TypeCheckResult) {
        if ls.len() != rs.len() {
            tcr.failure();
            return;
        }
        for (&l, &r) in ls.iter().zip(rs.iter()) {
            self.eq_helper(l, r, tcr);
            if tcr.failed() {
                return;
            }
        }
        tcr.success_one();
    }

    // =========================================================================
    // Named data types
    // =========================================================================

    fn eq_data(&self, ld: DataId, rd: DataId, tcr: &mut TypeCheckResult) {
        let ldef = self.types.data(ld);
        let rdef = self.types.data(rd);

        // Same nominal identity, neither instantiated. A tagged union and
        // its record projection share the name, so the kinds may differ.
        if ldef.name == rdef.name && !ldef.is_variant() && !rdef.is_variant() {
            tcr.success_one();
            return;
        }

        // Two variants of the same declaration match member-by-member on
        // their arguments.
        if let (Some(lp), Some(rp)) = (ldef.parent, rdef.parent) {
            if lp == rp {
                return self.eq_bound_args(&ldef, &rdef, tcr);
            }
        }

        if ldef.name == rdef.name {
            return self.eq_variants(&ldef, &rdef, tcr);
        }

        // Different names: trait fallback. Exactly one side must be a
        // registered trait; bound variants and stubs never satisfy it.
        if ldef.is_variant() || rdef.is_variant() {
            tcr.failure();
            return;
        }
        let (trait_name, concrete_name) = if self.traits.contains(&ldef.name) {
            (&ldef.name, &rdef.name)
        } else if self.traits.contains(&rdef.name) {
            (&rdef.name, &ldef.name)
        } else {
            tcr.failure();
            return;
        };
        match self.types.lookup_data(concrete_name) {
            Some(did) if !self.types.with_data(did, |d| d.is_stub()) => {
                let implements = self.types.with_data(did, |d| d.implements_trait(trait_name));
                tracing::debug!(
                    "trait fallback: {concrete_name} implements {trait_name}: {implements}"
                );
                tcr.success_if(implements);
            }
            _ => tcr.failure(),
        }
    }

    fn eq_bound_args(&self, ldef: &DataDef, rdef: &DataDef, tcr: &mut TypeCheckResult) {
        if ldef.bound_args.len() != rdef.bound_args.len() {
            tcr.failure();
            return;
        }
        for ((_, lv), (_, rv)) in ldef.bound_args.iter().zip(rdef.bound_args.iter()) {
            self.eq_helper(*lv, *rv, tcr);
            if tcr.failed() {
                return;
            }
        }
        tcr.success_one();
    }

    fn eq_variants(&self, ldef: &DataDef, rdef: &DataDef, tcr: &mut TypeCheckResult) {
        match (ldef.is_variant(), rdef.is_variant()) {
            (true, true) => self.eq_bound_args(ldef, rdef, tcr),
            // One side is the un-instantiated parent: collect the bound
            // side's arguments as fresh bindings.
            (true, false) => self.collect_bound_args(&ldef.bound_args, tcr),
            (false, true) => self.collect_bound_args(&rdef.bound_args, tcr),
            // Both are parents of the same name.
            (false, false) => tcr.success_one(),
        }
    }

    fn collect_bound_args(&self, bound: &[(String, TypeId)], tcr: &mut TypeCheckResult) {
        for (name, ty) in bound {
            if let Some(existing) = find_binding(&tcr.bindings, name) {
                let existing_ty = existing.ty;
                let mut sub = TypeCheckResult::new();
                self.eq_helper(*ty, existing_ty, &mut sub);
                if sub.failed() {
                    match sub.fatal.take() {
                        Some(err) => tcr.fatal_failure(err),
                        None => tcr.failure(),
                    }
                    return;
                }
            } else {
                tcr.bindings.push(TypeBinding::new(name.clone(), *ty));
            }
        }
        tcr.success_one();
        tcr.success_with_type_vars();
    }

    // =========================================================================
    // Type variables
    // =========================================================================

    fn eq_vars(&self, l: TypeId, r: TypeId, tcr: &mut TypeCheckResult) {
        let lname = self.var_name(l);
        let rname = self.var_name(r);

        match (lname, rname) {
            (Some(ln), Some(rn)) => {
                if l == r {
                    // `'t == 't` holds whether or not 't is bound; a scope
                    // binding is still surfaced so the caller can adopt it.
                    match self.scope.lookup(&ln) {
                        Some(bound) if bound == l => {
                            tcr.fatal_failure(TypeError::SelfReferentialTypeVar(ln));
                        }
                        Some(bound) => {
                            tcr.bindings.push(TypeBinding::new(ln, bound));
                            tcr.success_with_type_vars();
                        }
                        None => tcr.success_one(),
                    }
                    return;
                }

                let lv = self.scope.lookup(&ln);
                let rv = self.scope.lookup(&rn);
                if lv == Some(l) {
                    tcr.fatal_failure(TypeError::SelfReferentialTypeVar(ln));
                    return;
                }
                if rv == Some(r) {
                    tcr.fatal_failure(TypeError::SelfReferentialTypeVar(rn));
                    return;
                }
                match (lv, rv) {
                    (Some(lv), Some(rv)) => {
                        tcr.bindings.push(TypeBinding::new(ln, lv));
                        tcr.bindings.push(TypeBinding::new(rn, rv));
                        tcr.success_with_type_vars();
                        self.eq_helper(lv, rv, tcr);
                    }
                    (Some(lv), None) => {
                        tcr.bindings.push(TypeBinding::new(ln, lv));
                        self.assign_var(&rn, lv, tcr);
                    }
                    (None, Some(rv)) => {
                        tcr.bindings.push(TypeBinding::new(rn, rv));
                        self.assign_var(&ln, rv, tcr);
                    }
                    // Two distinct unbound variables are compatible.
                    (None, None) => tcr.success_one(),
                }
            }
            (Some(ln), None) => self.assign_var(&ln, r, tcr),
            (None, Some(rn)) => self.assign_var(&rn, l, tcr),
            (None, None) => tcr.failure(),
        }
    }

    /// Unify a variable with a concrete side through the accumulated
    /// bindings: first occurrence binds, later occurrences are checked
    /// against the existing binding in a *fresh* sub-result so the
    /// binding's own matches are not double-counted.
    fn assign_var(&self, name: &str, ty: TypeId, tcr: &mut TypeCheckResult) {
        match find_binding(&tcr.bindings, name) {
            None => {
                tcr.bindings.push(TypeBinding::new(name, ty));
                tcr.success_with_type_vars();
            }
            Some(existing) => {
                let existing_ty = existing.ty;
                let mut sub = TypeCheckResult::new();
                self.eq_helper(existing_ty, ty, &mut sub);
                if sub.failed() {
                    match sub.fatal.take() {
                        Some(err) => tcr.fatal_failure(err),
                        None => tcr.failure(),
                    }
                    return;
                }
                if sub.status == CheckStatus::SuccessWithTypeVars {
                    tcr.success_with_type_vars();
                    tcr.bindings.extend(sub.bindings);
                }
            }
        }
    }

    fn var_name(&self, ty: TypeId) -> Option<String> {
        match self.types.kind(ty) {
            TypeKind::Var { name } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(types: &TypeInterner, l: TypeId, r: TypeId) -> TypeCheckResult {
        let scope = TypeVarScope::new();
        let traits = TraitRegistry::new();
        Unifier::new(types, &scope, &traits).type_eq(l, r)
    }

    #[test]
    fn test_identical_closed_types_credit_all_atoms() {
        let types = TypeInterner::new();
        let t = types.tuple(vec![TypeId::I32, types.ptr_to(TypeId::BOOL)]);
        let result = check(&types, t, t);
        assert_eq!(result.status, CheckStatus::Success);
        assert_eq!(result.match_count, types.atom_count(t));
    }

    #[test]
    fn test_var_against_concrete_binds() {
        let types = TypeInterner::new();
        let a = types.type_var("'a");
        let result = check(&types, a, TypeId::I32);
        assert_eq!(result.status, CheckStatus::SuccessWithTypeVars);
        assert_eq!(result.match_count, 0);
        assert_eq!(result.bindings.len(), 1);
        assert_eq!(result.bindings[0].ty, TypeId::I32);
    }

    #[test]
    fn test_repeated_var_consistent() {
        let types = TypeInterner::new();
        let a = types.type_var("'a");
        let l = types.tuple(vec![a, a]);
        let r = types.tuple(vec![TypeId::I32, TypeId::I32]);
        let result = check(&types, l, r);
        assert_eq!(result.status, CheckStatus::SuccessWithTypeVars);
        assert_eq!(result.bindings.len(), 1, "single binding entry for 'a");
        assert_eq!(result.match_count, 1, "only the tuple structure counts");
    }

    #[test]
    fn test_repeated_var_conflict_fails() {
        let types = TypeInterner::new();
        let a = types.type_var("'a");
        let l = types.tuple(vec![a, a]);
        let r = types.tuple(vec![TypeId::I32, TypeId::BOOL]);
        let result = check(&types, l, r);
        assert_eq!(result.status, CheckStatus::Failure);
    }

    #[test]
    fn test_array_lengths_must_match() {
        let types = TypeInterner::new();
        let a4 = types.array_of(TypeId::I32, Some(4));
        let a8 = types.array_of(TypeId::I32, Some(8));
        let unknown = types.array_of(TypeId::I32, None);
        assert!(check(&types, a4, a8).failed());
        assert!(check(&types, a4, unknown).failed(), "unknown is a distinct length");
        assert!(check(&types, a4, a4).succeeded());
    }

    #[test]
    fn test_modifiers_do_not_affect_matching() {
        let types = TypeInterner::new();
        let m = types.add_modifier(TypeId::I32, crate::modifier::ModifierSet::MUT);
        assert!(check(&types, m, TypeId::I32).succeeded());
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let types = TypeInterner::new();
        let ptr = types.ptr_to(TypeId::I32);
        assert!(check(&types, ptr, TypeId::I32).failed());
    }

    #[test]
    fn test_meta_functions_do_not_match_plain() {
        let types = TypeInterner::new();
        let f = types.function(TypeId::I32, vec![TypeId::I32], false);
        let mf = types.function(TypeId::I32, vec![TypeId::I32], true);
        assert!(check(&types, f, mf).failed());
    }

    #[test]
    fn test_self_referential_scope_binding_is_fatal() {
        let types = TypeInterner::new();
        let t = types.type_var("'t");
        let mut scope = TypeVarScope::new();
        scope.bind("'t", t);
        let traits = TraitRegistry::new();
        let unifier = Unifier::new(&types, &scope, &traits);

        let result = unifier.type_eq(t, t);
        assert!(result.failed());
        assert_eq!(
            result.fatal,
            Some(TypeError::SelfReferentialTypeVar("'t".to_string()))
        );

        // The fatal marker also travels when the bad variable meets a
        // different variable.
        let u = types.type_var("'u");
        let result = unifier.type_eq(t, u);
        assert!(result.fatal.is_some());

        // An ordinary mismatch stays a plain failure.
        let plain = unifier.type_eq(types.ptr_to(TypeId::I32), TypeId::I32);
        assert!(plain.failed());
        assert!(plain.fatal.is_none());
    }

    #[test]
    fn test_scope_binding_surfaces_for_same_var() {
        let types = TypeInterner::new();
        let t = types.type_var("'t");
        let mut scope = TypeVarScope::new();
        scope.bind("'t", TypeId::I32);
        let traits = TraitRegistry::new();
        let result = Unifier::new(&types, &scope, &traits).type_eq(t, t);
        assert_eq!(result.status, CheckStatus::SuccessWithTypeVars);
        assert_eq!(result.bindings[0].ty, TypeId::I32);
    }
}
