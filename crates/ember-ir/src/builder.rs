//! SSA function builder.
//!
//! Holds a straight-line instruction list; every instruction produces one
//! value. The cast instructions are the surface the compiler's implicit
//! numeric conversions emit through.

use smallvec::SmallVec;

use crate::types::{IrTypeId, TypeStore};

/// Handle to an SSA value inside one function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueId(u32);

impl ValueId {
    const fn from_index(index: usize) -> ValueId {
        ValueId(index as u32)
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub enum Inst {
    /// Function parameter `index`, of the given type.
    Param { index: u32, ty: IrTypeId },
    Sext { value: ValueId, to: IrTypeId },
    Zext { value: ValueId, to: IrTypeId },
    Sitofp { value: ValueId, to: IrTypeId },
    Uitofp { value: ValueId, to: IrTypeId },
    Fpext { value: ValueId, to: IrTypeId },
    Ret { value: Option<ValueId> },
}

/// One function under construction.
#[derive(Debug)]
pub struct FuncBuilder {
    pub name: String,
    pub ret: IrTypeId,
    pub params: SmallVec<[IrTypeId; 4]>,
    insts: Vec<Inst>,
    value_types: Vec<IrTypeId>,
}

impl FuncBuilder {
    pub fn new(name: &str, ret: IrTypeId, params: &[IrTypeId]) -> Self {
        let mut builder = FuncBuilder {
            name: name.to_string(),
            ret,
            params: SmallVec::from_slice(params),
            insts: Vec::new(),
            value_types: Vec::new(),
        };
        for (index, &ty) in params.iter().enumerate() {
            builder.push(
                Inst::Param {
                    index: index as u32,
                    ty,
                },
                ty,
            );
        }
        builder
    }

    fn push(&mut self, inst: Inst, ty: IrTypeId) -> ValueId {
        let id = ValueId::from_index(self.value_types.len());
        self.insts.push(inst);
        self.value_types.push(ty);
        id
    }

    /// The nth parameter value.
    pub fn param(&self, index: usize) -> ValueId {
        ValueId::from_index(index)
    }

    pub fn value_type(&self, value: ValueId) -> IrTypeId {
        self.value_types[value.index()]
    }

    pub fn sext(&mut self, value: ValueId, to: IrTypeId) -> ValueId {
        self.push(Inst::Sext { value, to }, to)
    }

    pub fn zext(&mut self, value: ValueId, to: IrTypeId) -> ValueId {
        self.push(Inst::Zext { value, to }, to)
    }

    pub fn sitofp(&mut self, value: ValueId, to: IrTypeId) -> ValueId {
        self.push(Inst::Sitofp { value, to }, to)
    }

    pub fn uitofp(&mut self, value: ValueId, to: IrTypeId) -> ValueId {
        self.push(Inst::Uitofp { value, to }, to)
    }

    pub fn fpext(&mut self, value: ValueId, to: IrTypeId) -> ValueId {
        self.push(Inst::Fpext { value, to }, to)
    }

    pub fn ret(&mut self, value: Option<ValueId>) {
        let ty = self.ret;
        self.push(Inst::Ret { value }, ty);
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    /// Render the function as text.
    pub fn print(&self, types: &TypeStore) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, &p)| format!("{} %{}", types.print_type(p), i))
            .collect();
        let mut out = format!(
            "define {} @{}({}) {{\n",
            types.print_type(self.ret),
            self.name,
            params.join(", ")
        );
        for (i, inst) in self.insts.iter().enumerate() {
            let line = match inst {
                Inst::Param { .. } => continue,
                Inst::Sext { value, to } => self.cast_line(types, i, "sext", *value, *to),
                Inst::Zext { value, to } => self.cast_line(types, i, "zext", *value, *to),
                Inst::Sitofp { value, to } => self.cast_line(types, i, "sitofp", *value, *to),
                Inst::Uitofp { value, to } => self.cast_line(types, i, "uitofp", *value, *to),
                Inst::Fpext { value, to } => self.cast_line(types, i, "fpext", *value, *to),
                Inst::Ret { value } => match value {
                    Some(v) => format!(
                        "  ret {} %{}",
                        types.print_type(self.value_type(*v)),
                        v.index()
                    ),
                    None => "  ret void".to_string(),
                },
            };
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    fn cast_line(
        &self,
        types: &TypeStore,
        result: usize,
        op: &str,
        value: ValueId,
        to: IrTypeId,
    ) -> String {
        format!(
            "  %{} = {} {} %{} to {}",
            result,
            op,
            types.print_type(self.value_type(value)),
            value.index(),
            types.print_type(to)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casts_produce_typed_values() {
        let mut types = TypeStore::new();
        let i8_ty = types.int(8);
        let i32_ty = types.int(32);
        let f64_ty = types.float(64);

        let mut func = FuncBuilder::new("widen", f64_ty, &[i8_ty]);
        let arg = func.param(0);
        assert_eq!(func.value_type(arg), i8_ty);

        let widened = func.sext(arg, i32_ty);
        assert_eq!(func.value_type(widened), i32_ty);
        let floated = func.sitofp(widened, f64_ty);
        assert_eq!(func.value_type(floated), f64_ty);
        func.ret(Some(floated));

        let printed = func.print(&types);
        assert!(printed.contains("define double @widen(i8 %0)"));
        assert!(printed.contains("sext i8 %0 to i32"));
        assert!(printed.contains("sitofp i32 %1 to double"));
        assert!(printed.contains("ret double %2"));
    }
}
