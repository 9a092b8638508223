//! The type-lowering adapter.
//!
//! Translates a canonical type to its IR type. Data types become named
//! structs (packed iff tagged union), created *empty and memoized before*
//! their members are translated so self-referential types behind pointers
//! terminate. A tagged union's body is its largest member.

use rustc_hash::FxHashMap;

use ember_ir::{IrTypeId, TypeStore};
use ember_types::size::largest_member;
use ember_types::{
    DataId, DataKind, Prim, TypeError, TypeId, TypeInterner, TypeKind, TypeVarScope, display_name,
};

/// Lowering context: borrows the type layer, owns the per-data-type memo.
pub struct Lowerer<'a> {
    pub types: &'a TypeInterner,
    pub scope: &'a TypeVarScope,
    memo: FxHashMap<DataId, IrTypeId>,
}

impl<'a> Lowerer<'a> {
    pub fn new(types: &'a TypeInterner, scope: &'a TypeVarScope) -> Self {
        Lowerer {
            types,
            scope,
            memo: FxHashMap::default(),
        }
    }

    /// Lower a type. With `force`, unbound type variables fall back to a
    /// word-sized pointer instead of failing.
    pub fn lower_type(
        &mut self,
        store: &mut TypeStore,
        ty: TypeId,
        force: bool,
    ) -> Result<IrTypeId, TypeError> {
        match self.types.kind(ty) {
            TypeKind::Prim(p) => Ok(self.lower_prim(store, p)),
            TypeKind::Ptr { elem } => {
                // A pointer to void lowers as a byte pointer.
                if elem == TypeId::VOID {
                    return Ok(store.opaque_ptr());
                }
                let elem = self.lower_type(store, elem, force)?;
                Ok(store.ptr(elem))
            }
            TypeKind::Array { elem, len } => {
                let elem = self.lower_type(store, elem, force)?;
                Ok(store.array(elem, len.unwrap_or(0)))
            }
            TypeKind::Tuple { members } => {
                let mut fields = Vec::with_capacity(members.len());
                for member in members {
                    let lowered = self.lower_type(store, member, force)?;
                    if !matches!(store.get(lowered), ember_ir::IrType::Void) {
                        fields.push(lowered);
                    }
                }
                Ok(store.anon_struct(fields))
            }
            TypeKind::Function { ret, params, .. } => {
                let ret = self.lower_type(store, ret, force)?;
                let mut lowered = Vec::with_capacity(params.len());
                for param in params {
                    lowered.push(self.lower_type(store, param, force)?);
                }
                let func = store.func(ret, lowered);
                Ok(store.ptr(func))
            }
            TypeKind::Var { name } => match self.scope.lookup(&name) {
                Some(binding) if binding == ty => {
                    tracing::warn!("type variable {name} refers to itself");
                    Ok(store.void())
                }
                Some(binding) => self.lower_type(store, binding, force),
                None if force => {
                    let word = store.int(64);
                    Ok(store.ptr(word))
                }
                None => Err(TypeError::UnboundTypeVar(name)),
            },
            TypeKind::Data(did) => self.lower_data(store, did, force),
            TypeKind::Modified { base, .. } => self.lower_type(store, base, force),
        }
    }

    fn lower_prim(&self, store: &mut TypeStore, prim: Prim) -> IrTypeId {
        match prim {
            Prim::Bool => store.int(1),
            Prim::Void => store.void(),
            // A non-primitive type value is an opaque pointer at runtime.
            Prim::Type | Prim::FunctionList => store.opaque_ptr(),
            p if p.is_float() => store.float(p.bit_width(self.types.ptr_width()) as u32),
            p => store.int(p.bit_width(self.types.ptr_width()) as u32),
        }
    }

    fn lower_data(
        &mut self,
        store: &mut TypeStore,
        did: DataId,
        force: bool,
    ) -> Result<IrTypeId, TypeError> {
        if let Some(&memoized) = self.memo.get(&did) {
            return Ok(memoized);
        }

        let def = self.types.data(did);
        if let Some(aliased) = def.alias_of {
            let lowered = self.lower_type(store, aliased, force)?;
            self.memo.insert(did, lowered);
            return Ok(lowered);
        }
        if def.is_stub() {
            return Err(TypeError::IncompleteType(def.name));
        }

        let ty = self.types.data_type_id(did);
        if self.types.is_generic(ty) && !force {
            tracing::warn!(
                "type {} is generic and cannot be lowered without force",
                def.name
            );
        }

        // Install the empty named struct and memoize it first, so members
        // that point back at this type find it.
        let name = display_name(self.types, &def);
        let is_packed = def.kind == DataKind::TaggedUnion;
        let named = store.named_struct(&name);
        self.memo.insert(did, named);

        let body_members: Vec<TypeId> = match def.kind {
            DataKind::Record => def.members.clone(),
            DataKind::TaggedUnion => largest_member(self.types, self.scope, did, force)
                .into_iter()
                .collect(),
        };

        let mut fields = Vec::with_capacity(body_members.len());
        for member in body_members {
            let lowered = self.lower_type(store, member, force)?;
            if !matches!(store.get(lowered), ember_ir::IrType::Void) {
                fields.push(lowered);
            }
        }
        store.set_struct_body(&name, fields, is_packed);
        Ok(named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::DiagnosticBuffer;
    use ember_parser::Parser;
    use ember_types::Program;

    fn program_from(src: &str) -> Program {
        let (file, parse_diags) = Parser::new(src).parse_source_file();
        assert!(parse_diags.is_empty(), "parse failed: {parse_diags:?}");
        let mut program = Program::new();
        let mut diagnostics = DiagnosticBuffer::new();
        program.declare_source_file(&file, "test.em", &mut diagnostics);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
        program
    }

    #[test]
    fn test_record_lowering_skips_void_members() {
        let program = program_from("type Pair = i32, void, f64");
        let mut lowerer = Lowerer::new(&program.types, &program.scope);
        let mut store = TypeStore::new();
        let pair = program.types.data_by_name("Pair");
        lowerer.lower_type(&mut store, pair, false).unwrap();

        let bodies = store.named_structs();
        let (_, body) = &bodies[0];
        let (fields, packed) = body.as_ref().unwrap();
        assert_eq!(fields.len(), 2, "void member dropped");
        assert!(!packed);
    }

    #[test]
    fn test_union_lowering_is_packed_largest_member() {
        let program = program_from("type Num = | Small i8 | Big i64");
        let mut lowerer = Lowerer::new(&program.types, &program.scope);
        let mut store = TypeStore::new();
        let num = program.types.data_by_name("Num");
        lowerer.lower_type(&mut store, num, false).unwrap();

        let bodies = store.named_structs();
        let (name, body) = &bodies[0];
        assert_eq!(name, "Num");
        let (fields, packed) = body.as_ref().unwrap();
        assert!(packed);
        assert_eq!(fields.len(), 1);
        assert_eq!(store.print_type(fields[0]), "i64");
    }

    #[test]
    fn test_self_referential_type_terminates() {
        let program = program_from("type Node = i32, Node*");
        let mut lowerer = Lowerer::new(&program.types, &program.scope);
        let mut store = TypeStore::new();
        let node = program.types.data_by_name("Node");
        let lowered = lowerer.lower_type(&mut store, node, false).unwrap();
        assert_eq!(store.print_type(lowered), "%Node");

        let bodies = store.named_structs();
        let (_, body) = &bodies[0];
        let (fields, _) = body.as_ref().unwrap();
        assert_eq!(store.print_type(fields[1]), "%Node*");
    }

    #[test]
    fn test_memoization_returns_same_handle() {
        let program = program_from("type Point = f64, f64");
        let mut lowerer = Lowerer::new(&program.types, &program.scope);
        let mut store = TypeStore::new();
        let point = program.types.data_by_name("Point");
        let first = lowerer.lower_type(&mut store, point, false).unwrap();
        let second = lowerer.lower_type(&mut store, point, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stub_lowering_is_incomplete() {
        let program = program_from("trait Print");
        let mut lowerer = Lowerer::new(&program.types, &program.scope);
        let mut store = TypeStore::new();
        let stub = program.types.data_by_name("Ghost");
        assert!(matches!(
            lowerer.lower_type(&mut store, stub, false),
            Err(TypeError::IncompleteType(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn test_function_lowers_to_function_pointer() {
        let program = program_from("type Pair = i32, i32");
        let mut lowerer = Lowerer::new(&program.types, &program.scope);
        let mut store = TypeStore::new();
        let f = program
            .types
            .function(TypeId::BOOL, vec![TypeId::I32], false);
        let lowered = lowerer.lower_type(&mut store, f, false).unwrap();
        assert_eq!(store.print_type(lowered), "i1 (i32)*");
    }
}
