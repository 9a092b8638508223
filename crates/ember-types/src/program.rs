//! Declaration processing: the entry points the driver and REPL use to
//! feed parsed declarations into the type layer.
//!
//! Errors here are not fatal — each failing declaration is recorded in the
//! diagnostic buffer and dropped, and processing continues so one run
//! surfaces as many problems as it can.

use ember_common::{Diagnostic, DiagnosticBuffer, Span, Spanned};
use ember_parser::{Decl, SourceFile, TypeDecl, TypeDeclBody};
use indexmap::IndexMap;

use crate::convert::from_syntactic;
use crate::display::format_type;
use crate::error::TypeError;
use crate::intern::TypeInterner;
use crate::resolve::{CandidateMatch, ResolvedCall, resolve_call};
use crate::scope::{TraitRegistry, TypeVarScope};
use crate::ty::{DataKind, TypeId};
use crate::unify::Unifier;
use crate::validate::validate_declared;

/// A declared function signature.
#[derive(Clone, Debug)]
pub struct FuncSig {
    pub name: String,
    /// Interned `Function` type.
    pub ty: TypeId,
    pub span: Span,
}

/// All state one compilation accumulates: the arena, the lexical
/// type-variable scope, declared traits, and function candidates.
pub struct Program {
    pub types: TypeInterner,
    pub scope: TypeVarScope,
    pub traits: TraitRegistry,
    pub functions: IndexMap<String, Vec<FuncSig>>,
}

impl Program {
    pub fn new() -> Self {
        Self::with_ptr_width(64)
    }

    pub fn with_ptr_width(ptr_width: u64) -> Self {
        Program {
            types: TypeInterner::with_ptr_width(ptr_width),
            scope: TypeVarScope::new(),
            traits: TraitRegistry::new(),
            functions: IndexMap::new(),
        }
    }

    pub fn unifier(&self) -> Unifier<'_> {
        Unifier::new(&self.types, &self.scope, &self.traits)
    }

    /// Drop all user declarations between independent input files.
    pub fn clear_declared_types(&mut self) {
        self.types.clear_declared_types();
        self.traits.clear();
        self.functions.clear();
        self.scope = TypeVarScope::new();
    }

    /// Process every declaration of a parsed file.
    pub fn declare_source_file(
        &mut self,
        file: &SourceFile,
        file_name: &str,
        diagnostics: &mut DiagnosticBuffer,
    ) {
        for decl in &file.decls {
            if let Err(err) = self.declare(decl) {
                tracing::debug!("declaration dropped: {err}");
                diagnostics.push(Diagnostic::error(
                    file_name,
                    decl.span(),
                    err.to_string(),
                    err.code(),
                ));
            }
        }
    }

    /// Process a single declaration.
    pub fn declare(&mut self, decl: &Decl) -> Result<(), TypeError> {
        match decl {
            Decl::Type(type_decl) => self.declare_type(type_decl),
            Decl::Trait(trait_decl) => {
                self.traits.declare(trait_decl.name.clone());
                Ok(())
            }
            Decl::Impl(impl_decl) => {
                if !self.traits.contains(&impl_decl.trait_name) {
                    return Err(TypeError::UndeclaredType(impl_decl.trait_name.clone()));
                }
                self.types
                    .add_trait_impl(&impl_decl.type_name, &impl_decl.trait_name);
                Ok(())
            }
            Decl::Func(func_decl) => {
                let ret = from_syntactic(&self.types, &func_decl.ret);
                let params: Vec<TypeId> = func_decl
                    .params
                    .iter()
                    .map(|p| from_syntactic(&self.types, p))
                    .collect();
                let ty = self.types.function(ret, params, false);
                self.functions
                    .entry(func_decl.name.clone())
                    .or_default()
                    .push(FuncSig {
                        name: func_decl.name.clone(),
                        ty,
                        span: func_decl.span,
                    });
                Ok(())
            }
        }
    }

    fn declare_type(&mut self, decl: &TypeDecl) -> Result<(), TypeError> {
        // Register the declaration header first so references to the type
        // inside its own body (`Node<'e>` in the members of `Node`) find a
        // generic declaration rather than an opaque stub.
        let decl_ty = self.types.data_by_name(&decl.name);
        let decl_did = self
            .types
            .data_id_of(decl_ty)
            .expect("data_by_name returns Data");
        let generics = decl.generics.clone();
        self.types.update_data(decl_did, |def| {
            def.generics = generics;
        });
        self.types.refresh_data_metadata(decl_did);

        match &decl.body {
            TypeDeclBody::Alias(target) => {
                let target = from_syntactic(&self.types, target);
                validate_declared(&self.types, &self.scope, &decl.name, &decl.generics, target)?;
                self.types.declare_alias(&decl.name, target);
                crate::bind::refill_variants_of(&self.types, decl_did);
                Ok(())
            }
            TypeDeclBody::Record(member_exprs) => {
                let members: Vec<TypeId> = member_exprs
                    .iter()
                    .map(|m| from_syntactic(&self.types, m))
                    .collect();
                for &member in &members {
                    validate_declared(
                        &self.types,
                        &self.scope,
                        &decl.name,
                        &decl.generics,
                        member,
                    )?;
                }
                self.types.declare_data(
                    &decl.name,
                    members,
                    DataKind::Record,
                    decl.generics.clone(),
                    IndexMap::new(),
                );
                crate::bind::refill_variants_of(&self.types, decl_did);
                Ok(())
            }
            TypeDeclBody::Union(variants) => {
                let mut members = Vec::with_capacity(variants.len());
                let mut tags = IndexMap::new();
                for (index, variant) in variants.iter().enumerate() {
                    let member = match &variant.payload {
                        Some(payload) => from_syntactic(&self.types, payload),
                        // A payloadless variant is represented by its tag
                        // word alone.
                        None => TypeId::USZ,
                    };
                    validate_declared(
                        &self.types,
                        &self.scope,
                        &decl.name,
                        &decl.generics,
                        member,
                    )?;
                    members.push(member);
                    tags.insert(variant.tag.clone(), index as u16);
                }
                self.types.declare_data(
                    &decl.name,
                    members,
                    DataKind::TaggedUnion,
                    decl.generics.clone(),
                    tags,
                );
                crate::bind::refill_variants_of(&self.types, decl_did);
                Ok(())
            }
        }
    }

    /// Resolve a call to `name` with the given argument types to its best
    /// candidate, surfacing `TypeMismatch` and `AmbiguousMatch` per the
    /// error model.
    pub fn resolve_function(
        &self,
        name: &str,
        args: &[TypeId],
    ) -> Result<CandidateMatch, TypeError> {
        let mismatch = || TypeError::TypeMismatch {
            name: name.to_string(),
            args: format!(
                "({})",
                args.iter()
                    .map(|&a| format_type(&self.types, a))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };

        let sigs = self.functions.get(name).ok_or_else(mismatch)?;
        let candidates: Vec<TypeId> = sigs.iter().map(|s| s.ty).collect();
        match resolve_call(&self.unifier(), &candidates, args)? {
            ResolvedCall::Unique(best) => Ok(best),
            ResolvedCall::NoMatch => Err(mismatch()),
            ResolvedCall::Ambiguous(tied) => Err(TypeError::AmbiguousMatch {
                name: name.to_string(),
                count: tied.len(),
            }),
        }
    }
}

impl Default for Program {
    fn default() -> Self {
        Program::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_parser::Parser;

    fn program_from(src: &str) -> (Program, DiagnosticBuffer) {
        let (file, parse_diags) = Parser::new(src).parse_source_file();
        assert!(parse_diags.is_empty(), "parse failed: {parse_diags:?}");
        let mut program = Program::new();
        let mut diagnostics = DiagnosticBuffer::new();
        program.declare_source_file(&file, "test.em", &mut diagnostics);
        (program, diagnostics)
    }

    #[test]
    fn test_declare_and_query() {
        let (program, diagnostics) = program_from(
            "type Point = f64, f64\ntrait Print\nimpl Print for Point\nfn add: (i32, i32) -> i32",
        );
        assert!(diagnostics.is_empty());
        let point = program.types.data_by_name("Point");
        let did = program.types.data_id_of(point).unwrap();
        assert!(!program.types.with_data(did, |d| d.is_stub()));
        assert!(program.types.with_data(did, |d| d.implements_trait("Print")));
        assert!(program.functions.contains_key("add"));
    }

    #[test]
    fn test_recursive_decl_is_dropped_with_diagnostic() {
        let (program, diagnostics) = program_from("type T = T");
        assert_eq!(diagnostics.error_count(), 1);
        let t = program.types.data_by_name("T");
        let did = program.types.data_id_of(t).unwrap();
        assert!(program.types.with_data(did, |d| d.is_stub()), "declaration dropped");
    }

    #[test]
    fn test_recursion_behind_pointer_declares() {
        let (program, diagnostics) = program_from("type T = i32, T*");
        assert!(diagnostics.is_empty());
        let t = program.types.data_by_name("T");
        let did = program.types.data_id_of(t).unwrap();
        assert!(!program.types.with_data(did, |d| d.is_stub()));
    }

    #[test]
    fn test_union_tags_in_declaration_order() {
        let (program, _) = program_from("type Maybe<'t> = | None | Some 't");
        let maybe = program.types.data_by_name("Maybe");
        let did = program.types.data_id_of(maybe).unwrap();
        program.types.with_data(did, |def| {
            assert_eq!(def.tag_value("None"), Some(0));
            assert_eq!(def.tag_value("Some"), Some(1));
            assert_eq!(def.members[0], TypeId::USZ);
        });
    }

    #[test]
    fn test_resolution_prefers_specific_overload() {
        let (program, _) =
            program_from("fn id: ('a) -> 'a\nfn id: (i32) -> i32");
        let best = program.resolve_function("id", &[TypeId::I32]).unwrap();
        assert_eq!(best.index, 1);
        assert!(matches!(
            program.resolve_function("id", &[TypeId::BOOL]),
            Ok(m) if m.index == 0
        ));
    }

    #[test]
    fn test_no_match_and_ambiguity_surface_as_errors() {
        let (program, _) = program_from("fn f: (i32) -> i32\nfn f: (i32) -> bool");
        assert!(matches!(
            program.resolve_function("f", &[TypeId::I32]),
            Err(TypeError::AmbiguousMatch { count: 2, .. })
        ));
        assert!(matches!(
            program.resolve_function("f", &[TypeId::F64, TypeId::F64]),
            Err(TypeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            program.resolve_function("missing", &[]),
            Err(TypeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_clear_between_files() {
        let (mut program, _) = program_from("type Point = f64, f64\ntrait Print");
        program.clear_declared_types();
        assert!(program.types.lookup_data("Point").is_none());
        assert!(!program.traits.contains("Print"));
        assert!(program.functions.is_empty());
    }
}
