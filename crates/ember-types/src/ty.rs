//! The closed type representation.
//!
//! Every type the compiler manipulates is a `TypeId` handle into the
//! interning arena. The arena is the sole owner; ids are non-owning and
//! `Copy`, so no ownership cycles can form even for self-referential data
//! types (which refer to themselves by name, through `DataId`).

use indexmap::IndexMap;

use crate::modifier::ModifierSet;
use crate::tag::Prim;

/// Handle to an interned type. Equality of ids is structural equality of
/// the closed types they denote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    // Primitives are pre-registered in `ALL_PRIMS` order, so their ids are
    // compile-time constants.
    pub const I8: TypeId = TypeId(0);
    pub const I16: TypeId = TypeId(1);
    pub const I32: TypeId = TypeId(2);
    pub const I64: TypeId = TypeId(3);
    pub const ISZ: TypeId = TypeId(4);
    pub const U8: TypeId = TypeId(5);
    pub const U16: TypeId = TypeId(6);
    pub const U32: TypeId = TypeId(7);
    pub const U64: TypeId = TypeId(8);
    pub const USZ: TypeId = TypeId(9);
    pub const F16: TypeId = TypeId(10);
    pub const F32: TypeId = TypeId(11);
    pub const F64: TypeId = TypeId(12);
    pub const C8: TypeId = TypeId(13);
    pub const C32: TypeId = TypeId(14);
    pub const BOOL: TypeId = TypeId(15);
    pub const VOID: TypeId = TypeId(16);
    pub const TYPE: TypeId = TypeId(17);
    pub const FUNCTION_LIST: TypeId = TypeId(18);

    pub(crate) const fn from_index(index: usize) -> TypeId {
        TypeId(index as u32)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a data-type definition in the arena's definition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataId(pub(crate) u32);

impl DataId {
    pub(crate) const fn from_index(index: usize) -> DataId {
        DataId(index as u32)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The closed variant set of type kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Prim(Prim),
    Ptr {
        elem: TypeId,
    },
    /// `len` of `None` denotes an unknown/runtime length (printed `0`).
    Array {
        elem: TypeId,
        len: Option<u64>,
    },
    /// The tuple-shaped aggregate.
    Tuple {
        members: Vec<TypeId>,
    },
    /// Kept separate from `Tuple` so modifier application cannot reach the
    /// signature: making a function slot mutable must not change its ABI.
    Function {
        ret: TypeId,
        params: Vec<TypeId>,
        is_meta: bool,
    },
    /// Type variable; `name` includes the leading `'`.
    Var {
        name: String,
    },
    Data(DataId),
    /// A modifier-wrapped type. `base` is never itself `Modified`.
    Modified {
        mods: ModifierSet,
        base: TypeId,
    },
}

/// Per-type metadata computed once at intern time.
#[derive(Clone, Debug)]
pub struct TypeData {
    pub kind: TypeKind,
    /// True iff the type transitively contains an unresolved type
    /// variable.
    pub is_generic: bool,
    /// Number of atomic equality steps a full structural match of this
    /// type performs; credited wholesale on the id-equality fast path.
    pub atom_count: u32,
}

/// Record vs tagged union.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataKind {
    Record,
    TaggedUnion,
}

/// A named data-type definition.
///
/// A definition referenced by name before it is declared is a *stub*
/// (empty members, no alias); stubs may circulate freely but size,
/// validation and lowering reject them. Filling a stub's members at
/// declaration time is the one permitted mutation.
#[derive(Clone, Debug)]
pub struct DataDef {
    /// Base name, without angle-bracket arguments.
    pub name: String,
    pub members: Vec<TypeId>,
    pub kind: DataKind,
    /// Ordered generic parameter names of the declaration, with `'`.
    pub generics: Vec<String>,
    /// Non-empty iff this is a variant: the ordered zip of the
    /// declaration's parameters with the instantiating arguments.
    pub bound_args: Vec<(String, TypeId)>,
    pub alias_of: Option<TypeId>,
    pub trait_impls: Vec<String>,
    /// Tagged-union tag values, in declaration order.
    pub tags: IndexMap<String, u16>,
    /// The un-instantiated declaration this variant was produced from.
    pub parent: Option<DataId>,
}

impl DataDef {
    pub(crate) fn stub(name: &str) -> DataDef {
        DataDef {
            name: name.to_string(),
            members: Vec::new(),
            kind: DataKind::Record,
            generics: Vec::new(),
            bound_args: Vec::new(),
            alias_of: None,
            trait_impls: Vec::new(),
            tags: IndexMap::new(),
            parent: None,
        }
    }

    /// Referenced but not yet defined.
    pub fn is_stub(&self) -> bool {
        self.members.is_empty() && self.alias_of.is_none()
    }

    /// An instantiation of a generic declaration.
    pub fn is_variant(&self) -> bool {
        !self.bound_args.is_empty()
    }

    /// Tag value for a union member name.
    pub fn tag_value(&self, tag: &str) -> Option<u16> {
        self.tags.get(tag).copied()
    }

    pub fn implements_trait(&self, trait_name: &str) -> bool {
        self.trait_impls.iter().any(|t| t == trait_name)
    }
}
