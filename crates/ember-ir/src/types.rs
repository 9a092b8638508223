//! IR types, interned in a flat store.
//!
//! Named structs are created empty and get their body set later; that is
//! what lets the lowering adapter translate self-referential data types
//! without recursing forever.

use rustc_hash::FxHashMap;

/// Handle to an interned IR type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IrTypeId(u32);

impl IrTypeId {
    const fn from_index(index: usize) -> IrTypeId {
        IrTypeId(index as u32)
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    Int { bits: u32 },
    Float { bits: u32 },
    Ptr { elem: IrTypeId },
    Array { elem: IrTypeId, len: u64 },
    /// Anonymous struct.
    Struct { fields: Vec<IrTypeId> },
    /// Reference to a named struct; the body lives in the store.
    Named { name: String },
    Func { ret: IrTypeId, params: Vec<IrTypeId> },
}

/// Flat owner of IR types plus the named-struct body table.
#[derive(Debug, Default)]
pub struct TypeStore {
    types: Vec<IrType>,
    dedup: FxHashMap<IrType, IrTypeId>,
    /// name -> (fields, packed); `None` body means still opaque.
    named: Vec<(String, Option<(Vec<IrTypeId>, bool)>)>,
    named_index: FxHashMap<String, usize>,
}

impl TypeStore {
    pub fn new() -> Self {
        TypeStore::default()
    }

    fn intern(&mut self, ty: IrType) -> IrTypeId {
        if let Some(&id) = self.dedup.get(&ty) {
            return id;
        }
        let id = IrTypeId::from_index(self.types.len());
        self.types.push(ty.clone());
        self.dedup.insert(ty, id);
        id
    }

    pub fn void(&mut self) -> IrTypeId {
        self.intern(IrType::Void)
    }

    pub fn int(&mut self, bits: u32) -> IrTypeId {
        self.intern(IrType::Int { bits })
    }

    pub fn float(&mut self, bits: u32) -> IrTypeId {
        self.intern(IrType::Float { bits })
    }

    pub fn ptr(&mut self, elem: IrTypeId) -> IrTypeId {
        self.intern(IrType::Ptr { elem })
    }

    /// An opaque byte pointer (`i8*`).
    pub fn opaque_ptr(&mut self) -> IrTypeId {
        let byte = self.int(8);
        self.ptr(byte)
    }

    pub fn array(&mut self, elem: IrTypeId, len: u64) -> IrTypeId {
        self.intern(IrType::Array { elem, len })
    }

    pub fn anon_struct(&mut self, fields: Vec<IrTypeId>) -> IrTypeId {
        self.intern(IrType::Struct { fields })
    }

    pub fn func(&mut self, ret: IrTypeId, params: Vec<IrTypeId>) -> IrTypeId {
        self.intern(IrType::Func { ret, params })
    }

    /// Create (or fetch) a named struct, initially opaque.
    pub fn named_struct(&mut self, name: &str) -> IrTypeId {
        if !self.named_index.contains_key(name) {
            self.named_index.insert(name.to_string(), self.named.len());
            self.named.push((name.to_string(), None));
        }
        self.intern(IrType::Named {
            name: name.to_string(),
        })
    }

    /// Whether a named struct already exists.
    pub fn has_named_struct(&self, name: &str) -> bool {
        self.named_index.contains_key(name)
    }

    /// Set (or replace) the body of a named struct.
    pub fn set_struct_body(&mut self, name: &str, fields: Vec<IrTypeId>, packed: bool) {
        match self.named_index.get(name) {
            Some(&idx) => self.named[idx].1 = Some((fields, packed)),
            None => {
                tracing::warn!("set_struct_body on unknown struct {name}");
            }
        }
    }

    /// Named structs in creation order with their bodies.
    pub fn named_structs(&self) -> Vec<(String, Option<(Vec<IrTypeId>, bool)>)> {
        self.named.clone()
    }

    pub fn get(&self, id: IrTypeId) -> &IrType {
        &self.types[id.index()]
    }

    /// LLVM-flavored rendering of a type.
    pub fn print_type(&self, id: IrTypeId) -> String {
        match self.get(id) {
            IrType::Void => "void".to_string(),
            IrType::Int { bits } => format!("i{bits}"),
            IrType::Float { bits } => match bits {
                16 => "half".to_string(),
                32 => "float".to_string(),
                64 => "double".to_string(),
                other => format!("f{other}"),
            },
            IrType::Ptr { elem } => format!("{}*", self.print_type(*elem)),
            IrType::Array { elem, len } => {
                format!("[{} x {}]", len, self.print_type(*elem))
            }
            IrType::Struct { fields } => {
                let rendered: Vec<String> = fields.iter().map(|&f| self.print_type(f)).collect();
                format!("{{ {} }}", rendered.join(", "))
            }
            IrType::Named { name } => format!("%{name}"),
            IrType::Func { ret, params } => {
                let rendered: Vec<String> = params.iter().map(|&p| self.print_type(p)).collect();
                format!("{} ({})", self.print_type(*ret), rendered.join(", "))
            }
        }
    }
}
