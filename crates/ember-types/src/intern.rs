//! The interning arena.
//!
//! One canonical `TypeId` per structurally-identical type, for the life of
//! the process. The arena owns every type; everything else
//! holds `Copy` ids. Lookups intern on first use; a fresh type is fully
//! constructed *before* it is published to its map, so partially-built
//! types are never observable.
//!
//! The maps are segregated by kind: primitives are pre-registered at
//! construction (their ids are the `TypeId` constants), pointers are keyed
//! by element, arrays by `(len, element)`, tuples by member list,
//! functions by `(is_meta, params, return)`, data types by printed name,
//! and modifier-wrapped types by `(bits, base)` in their own map so they
//! cannot collide with unmodified forms.

use std::cell::RefCell;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::error::TypeError;
use crate::modifier::ModifierSet;
use crate::tag::{ALL_PRIMS, Prim};
use crate::ty::{DataDef, DataId, DataKind, TypeData, TypeId, TypeKind};

pub struct TypeInterner {
    types: RefCell<Vec<TypeData>>,

    ptr_map: RefCell<FxHashMap<TypeId, TypeId>>,
    array_map: RefCell<FxHashMap<(Option<u64>, TypeId), TypeId>>,
    tuple_map: RefCell<FxHashMap<Vec<TypeId>, TypeId>>,
    func_map: RefCell<FxHashMap<(bool, Vec<TypeId>, TypeId), TypeId>>,
    var_map: RefCell<FxHashMap<String, TypeId>>,
    /// Modifier-wrapped forms, segregated to avoid collisions with the
    /// unmodified forms.
    modified_map: RefCell<FxHashMap<(u8, TypeId), TypeId>>,

    /// Declared and variant data types by printed name. Insertion order is
    /// declaration order, which keeps emit output stable.
    data_map: RefCell<IndexMap<String, DataId>>,
    data_defs: RefCell<Vec<DataDef>>,
    /// The `Data`-kind `TypeId` for each `DataId`.
    data_type_ids: RefCell<Vec<TypeId>>,

    ptr_width: u64,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self::with_ptr_width(64)
    }

    /// Build an arena for a target with the given native pointer width.
    pub fn with_ptr_width(ptr_width: u64) -> Self {
        let interner = TypeInterner {
            types: RefCell::new(Vec::new()),
            ptr_map: RefCell::new(FxHashMap::default()),
            array_map: RefCell::new(FxHashMap::default()),
            tuple_map: RefCell::new(FxHashMap::default()),
            func_map: RefCell::new(FxHashMap::default()),
            var_map: RefCell::new(FxHashMap::default()),
            modified_map: RefCell::new(FxHashMap::default()),
            data_map: RefCell::new(IndexMap::new()),
            data_defs: RefCell::new(Vec::new()),
            data_type_ids: RefCell::new(Vec::new()),
            ptr_width,
        };
        for prim in ALL_PRIMS {
            interner.types.borrow_mut().push(TypeData {
                kind: TypeKind::Prim(prim),
                is_generic: false,
                atom_count: 1,
            });
        }
        interner
    }

    pub fn ptr_width(&self) -> u64 {
        self.ptr_width
    }

    // =========================================================================
    // Interning entry points
    // =========================================================================

    pub fn primitive(&self, prim: Prim) -> TypeId {
        let index = ALL_PRIMS.iter().position(|&p| p == prim);
        // ALL_PRIMS is total over the enum.
        TypeId::from_index(index.unwrap_or(0))
    }

    /// Primitive lookup by name; non-primitive names are a programming
    /// error (`UnknownPrimitive`).
    pub fn primitive_named(&self, name: &str) -> Result<TypeId, TypeError> {
        match Prim::from_name(name) {
            Some(prim) => Ok(self.primitive(prim)),
            None => Err(TypeError::UnknownPrimitive(name.to_string())),
        }
    }

    pub fn ptr_to(&self, elem: TypeId) -> TypeId {
        if let Some(&id) = self.ptr_map.borrow().get(&elem) {
            return id;
        }
        let id = self.intern(TypeKind::Ptr { elem });
        self.ptr_map.borrow_mut().insert(elem, id);
        id
    }

    pub fn array_of(&self, elem: TypeId, len: Option<u64>) -> TypeId {
        if let Some(&id) = self.array_map.borrow().get(&(len, elem)) {
            return id;
        }
        let id = self.intern(TypeKind::Array { elem, len });
        self.array_map.borrow_mut().insert((len, elem), id);
        id
    }

    pub fn tuple(&self, members: Vec<TypeId>) -> TypeId {
        if let Some(&id) = self.tuple_map.borrow().get(&members) {
            return id;
        }
        let id = self.intern(TypeKind::Tuple {
            members: members.clone(),
        });
        self.tuple_map.borrow_mut().insert(members, id);
        id
    }

    pub fn function(&self, ret: TypeId, params: Vec<TypeId>, is_meta: bool) -> TypeId {
        let key = (is_meta, params.clone(), ret);
        if let Some(&id) = self.func_map.borrow().get(&key) {
            return id;
        }
        let id = self.intern(TypeKind::Function {
            ret,
            params,
            is_meta,
        });
        self.func_map.borrow_mut().insert(key, id);
        id
    }

    /// Intern a type variable. `name` must include its leading `'`.
    pub fn type_var(&self, name: &str) -> TypeId {
        if let Some(&id) = self.var_map.borrow().get(name) {
            return id;
        }
        let id = self.intern(TypeKind::Var {
            name: name.to_string(),
        });
        self.var_map.borrow_mut().insert(name.to_string(), id);
        id
    }

    /// Get the data type with the given printed name, creating a stub if
    /// the definition has not been seen yet.
    pub fn data_by_name(&self, name: &str) -> TypeId {
        if let Some(&did) = self.data_map.borrow().get(name) {
            return self.data_type_id(did);
        }
        let did = self.insert_data_def(name, DataDef::stub(name));
        self.data_type_id(did)
    }

    /// Non-creating lookup, used by the trait fallback.
    pub fn lookup_data(&self, name: &str) -> Option<DataId> {
        self.data_map.borrow().get(name).copied()
    }

    /// Snapshot of the declared-type table in declaration order.
    pub fn declared_data(&self) -> Vec<(String, DataId)> {
        self.data_map
            .borrow()
            .iter()
            .map(|(name, &did)| (name.clone(), did))
            .collect()
    }

    /// Drop all user-defined data types between input files. Primitive and
    /// structural interns are untouched; the definitions themselves stay
    /// arena-owned until teardown.
    pub fn clear_declared_types(&self) {
        self.data_map.borrow_mut().clear();
    }

    // =========================================================================
    // Data definitions
    // =========================================================================

    /// Declare (or late-fill a stub for) a data type. This is the one
    /// controlled mutation: members grow from empty to their final value
    /// exactly once.
    pub fn declare_data(
        &self,
        name: &str,
        members: Vec<TypeId>,
        kind: DataKind,
        generics: Vec<String>,
        tags: IndexMap<String, u16>,
    ) -> TypeId {
        let ty = self.data_by_name(name);
        let did = self.data_id_of(ty).expect("data_by_name returns Data");
        self.update_data(did, |def| {
            def.members = members;
            def.kind = kind;
            def.generics = generics;
            def.tags = tags;
        });
        self.refresh_data_metadata(did);
        ty
    }

    /// Declare a transparent alias.
    pub fn declare_alias(&self, name: &str, target: TypeId) -> TypeId {
        let ty = self.data_by_name(name);
        let did = self.data_id_of(ty).expect("data_by_name returns Data");
        self.update_data(did, |def| {
            def.alias_of = Some(target);
        });
        self.refresh_data_metadata(did);
        ty
    }

    /// Record that `data_name` implements `trait_name`.
    pub fn add_trait_impl(&self, data_name: &str, trait_name: &str) {
        let ty = self.data_by_name(data_name);
        if let Some(did) = self.data_id_of(ty) {
            self.update_data(did, |def| {
                if !def.trait_impls.iter().any(|t| t == trait_name) {
                    def.trait_impls.push(trait_name.to_string());
                }
            });
        }
    }

    pub(crate) fn insert_data_def(&self, key: &str, def: DataDef) -> DataId {
        let did = {
            let mut defs = self.data_defs.borrow_mut();
            let did = DataId::from_index(defs.len());
            defs.push(def);
            did
        };
        let ty = self.intern(TypeKind::Data(did));
        self.data_type_ids.borrow_mut().push(ty);
        self.data_map.borrow_mut().insert(key.to_string(), did);
        did
    }

    /// The `Data`-kind id for a definition.
    pub fn data_type_id(&self, did: DataId) -> TypeId {
        self.data_type_ids.borrow()[did.index()]
    }

    pub fn data_id_of(&self, ty: TypeId) -> Option<DataId> {
        match self.types.borrow()[ty.index()].kind {
            TypeKind::Data(did) => Some(did),
            _ => None,
        }
    }

    /// Run `f` against a definition. `f` must not call back into the
    /// interner.
    pub fn with_data<R>(&self, did: DataId, f: impl FnOnce(&DataDef) -> R) -> R {
        f(&self.data_defs.borrow()[did.index()])
    }

    pub(crate) fn update_data<R>(&self, did: DataId, f: impl FnOnce(&mut DataDef) -> R) -> R {
        f(&mut self.data_defs.borrow_mut()[did.index()])
    }

    /// Clone of a definition, for cold paths that need to hold it across
    /// further interning.
    pub fn data(&self, did: DataId) -> DataDef {
        self.data_defs.borrow()[did.index()].clone()
    }

    /// Recompute the stored metadata of a data type after its members were
    /// filled in.
    pub(crate) fn refresh_data_metadata(&self, did: DataId) {
        let (is_generic, atom_count) = {
            let defs = self.data_defs.borrow();
            let def = &defs[did.index()];
            let generic = if def.is_variant() {
                def.bound_args.iter().any(|(_, t)| self.is_generic(*t))
                    || def.members.iter().any(|&t| self.is_generic(t))
            } else {
                !def.generics.is_empty() || def.members.iter().any(|&t| self.is_generic(t))
            };
            let atoms: u32 = 1 + def
                .bound_args
                .iter()
                .map(|(_, t)| self.atom_count(*t))
                .sum::<u32>();
            (generic, atoms)
        };
        let ty = self.data_type_id(did);
        let mut types = self.types.borrow_mut();
        let row = &mut types[ty.index()];
        row.is_generic = is_generic;
        row.atom_count = atom_count;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self, ty: TypeId) -> TypeKind {
        self.types.borrow()[ty.index()].kind.clone()
    }

    /// Whether the type transitively contains an unresolved type
    /// variable.
    pub fn is_generic(&self, ty: TypeId) -> bool {
        self.types.borrow()[ty.index()].is_generic
    }

    pub fn atom_count(&self, ty: TypeId) -> u32 {
        self.types.borrow()[ty.index()].atom_count
    }

    pub fn is_prim(&self, ty: TypeId) -> Option<Prim> {
        match self.types.borrow()[ty.index()].kind {
            TypeKind::Prim(p) => Some(p),
            _ => None,
        }
    }

    // =========================================================================
    // Modifier layer
    // =========================================================================

    /// The modifier set of a type; empty for unwrapped forms.
    pub fn modifiers(&self, ty: TypeId) -> ModifierSet {
        match self.types.borrow()[ty.index()].kind {
            TypeKind::Modified { mods, .. } => mods,
            _ => ModifierSet::empty(),
        }
    }

    pub fn has_modifier(&self, ty: TypeId, m: ModifierSet) -> bool {
        self.modifiers(ty).contains(m)
    }

    /// The unmodified canonical form underneath a wrapper.
    pub fn strip_modifiers(&self, ty: TypeId) -> TypeId {
        match self.types.borrow()[ty.index()].kind {
            TypeKind::Modified { base, .. } => base,
            _ => ty,
        }
    }

    /// Idempotent: returns `ty` unchanged when `m` is already present.
    pub fn add_modifier(&self, ty: TypeId, m: ModifierSet) -> TypeId {
        let current = self.modifiers(ty);
        if current.contains(m) {
            return ty;
        }
        self.with_modifier_set(ty, current | m)
    }

    /// The interned type of the same kind whose modifier set equals
    /// `mods`. An empty set returns the unmodified canonical form.
    pub fn with_modifier_set(&self, ty: TypeId, mods: ModifierSet) -> TypeId {
        let base = self.strip_modifiers(ty);
        if mods.is_empty() {
            return base;
        }
        let key = (mods.bits(), base);
        if let Some(&id) = self.modified_map.borrow().get(&key) {
            return id;
        }
        let id = self.intern(TypeKind::Modified { mods, base });
        self.modified_map.borrow_mut().insert(key, id);
        id
    }

    /// Member projection with modifier propagation: members of a modified
    /// aggregate carry the wrapper's modifiers. Functions are the
    /// exception; their parameter and return types come back untouched so
    /// the signature never changes.
    pub fn projected_members(&self, ty: TypeId) -> Vec<TypeId> {
        let mods = self.modifiers(ty);
        let base = self.strip_modifiers(ty);
        let raw = match self.kind(base) {
            TypeKind::Tuple { members } => members,
            TypeKind::Array { elem, .. } => vec![elem],
            TypeKind::Ptr { elem } => vec![elem],
            TypeKind::Data(did) => self.with_data(did, |def| def.members.clone()),
            TypeKind::Function { ret, params, .. } => {
                let mut all = vec![ret];
                all.extend(params);
                return all;
            }
            _ => Vec::new(),
        };
        if mods.is_empty() {
            return raw;
        }
        raw.into_iter()
            .map(|m| self.with_modifier_set(m, mods))
            .collect()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn intern(&self, kind: TypeKind) -> TypeId {
        let (is_generic, atom_count) = self.metadata_for(&kind);
        let mut types = self.types.borrow_mut();
        let id = TypeId::from_index(types.len());
        types.push(TypeData {
            kind,
            is_generic,
            atom_count,
        });
        id
    }

    fn metadata_for(&self, kind: &TypeKind) -> (bool, u32) {
        match kind {
            TypeKind::Prim(_) => (false, 1),
            TypeKind::Ptr { elem } => (self.is_generic(*elem), 1 + self.atom_count(*elem)),
            TypeKind::Array { elem, .. } => (self.is_generic(*elem), 1 + self.atom_count(*elem)),
            TypeKind::Tuple { members } => {
                let generic = members.iter().any(|&m| self.is_generic(m));
                let atoms = 1 + members.iter().map(|&m| self.atom_count(m)).sum::<u32>();
                (generic, atoms)
            }
            TypeKind::Function { ret, params, .. } => {
                let generic =
                    self.is_generic(*ret) || params.iter().any(|&p| self.is_generic(p));
                let atoms = 1
                    + self.atom_count(*ret)
                    + params.iter().map(|&p| self.atom_count(p)).sum::<u32>();
                (generic, atoms)
            }
            TypeKind::Var { .. } => (true, 0),
            // Stubs start non-generic with a single atom; declaration
            // refreshes this row.
            TypeKind::Data(_) => (false, 1),
            TypeKind::Modified { base, .. } => {
                (self.is_generic(*base), self.atom_count(*base))
            }
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        TypeInterner::new()
    }
}
