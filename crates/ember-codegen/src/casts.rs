//! Applying the core's implicit numeric conversion decisions to the IR
//! builder.

use ember_ir::{FuncBuilder, IrTypeId, TypeStore, ValueId};
use ember_types::{CastOp, TypeError, TypeId, widening_plan};

use crate::lower::Lowerer;

/// Emit a single cast instruction. `CastOp::None` returns the value
/// untouched.
pub fn apply_cast(
    builder: &mut FuncBuilder,
    op: CastOp,
    value: ValueId,
    to: IrTypeId,
) -> ValueId {
    match op {
        CastOp::None => value,
        CastOp::Sext => builder.sext(value, to),
        CastOp::Zext => builder.zext(value, to),
        CastOp::Sitofp => builder.sitofp(value, to),
        CastOp::Uitofp => builder.uitofp(value, to),
        CastOp::Fpext => builder.fpext(value, to),
    }
}

/// Detect and emit the implicit conversion between two operand values.
/// Returns the possibly-cast values and their common type; `None` when the
/// operands are outside the numeric cluster and no conversion applies.
pub fn emit_implicit_conversion(
    lowerer: &mut Lowerer<'_>,
    store: &mut TypeStore,
    builder: &mut FuncBuilder,
    lhs: (ValueId, TypeId),
    rhs: (ValueId, TypeId),
) -> Result<Option<(ValueId, ValueId, TypeId)>, TypeError> {
    let plan = match widening_plan(lowerer.types, lhs.1, rhs.1) {
        Some(plan) => plan,
        None => return Ok(None),
    };
    let target = lowerer.lower_type(store, plan.result, false)?;
    let lhs_value = apply_cast(builder, plan.lhs, lhs.0, target);
    let rhs_value = apply_cast(builder, plan.rhs, rhs.0, target);
    Ok(Some((lhs_value, rhs_value, plan.result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_types::{TypeInterner, TypeVarScope};

    #[test]
    fn test_int_pair_widens_in_place() {
        let types = TypeInterner::new();
        let scope = TypeVarScope::new();
        let mut lowerer = Lowerer::new(&types, &scope);
        let mut store = TypeStore::new();

        let i8_ir = store.int(8);
        let i32_ir = store.int(32);
        let mut builder = FuncBuilder::new("add", i32_ir, &[i8_ir, i32_ir]);
        let lhs = builder.param(0);
        let rhs = builder.param(1);

        let (lhs, rhs, result) = emit_implicit_conversion(
            &mut lowerer,
            &mut store,
            &mut builder,
            (lhs, TypeId::I8),
            (rhs, TypeId::I32),
        )
        .unwrap()
        .expect("numeric pair");

        assert_eq!(result, TypeId::I32);
        assert_eq!(builder.value_type(lhs), i32_ir);
        assert_eq!(builder.value_type(rhs), i32_ir);
        let printed = builder.print(&store);
        assert!(printed.contains("sext i8 %0 to i32"));
    }

    #[test]
    fn test_unsigned_int_to_float_uses_uitofp() {
        let types = TypeInterner::new();
        let scope = TypeVarScope::new();
        let mut lowerer = Lowerer::new(&types, &scope);
        let mut store = TypeStore::new();

        let u32_ir = store.int(32);
        let f32_ir = store.float(32);
        let mut builder = FuncBuilder::new("mix", f32_ir, &[u32_ir, f32_ir]);
        let lhs = builder.param(0);
        let rhs = builder.param(1);

        let (_, _, result) = emit_implicit_conversion(
            &mut lowerer,
            &mut store,
            &mut builder,
            (lhs, TypeId::U32),
            (rhs, TypeId::F32),
        )
        .unwrap()
        .expect("numeric pair");

        assert_eq!(result, TypeId::F32);
        assert!(builder.print(&store).contains("uitofp i32 %0 to float"));
    }

    #[test]
    fn test_non_numeric_pair_is_untouched() {
        let types = TypeInterner::new();
        let scope = TypeVarScope::new();
        let mut lowerer = Lowerer::new(&types, &scope);
        let mut store = TypeStore::new();

        let i1 = store.int(1);
        let mut builder = FuncBuilder::new("noop", i1, &[i1, i1]);
        let lhs = builder.param(0);
        let rhs = builder.param(1);
        let result = emit_implicit_conversion(
            &mut lowerer,
            &mut store,
            &mut builder,
            (lhs, TypeId::BOOL),
            (rhs, TypeId::BOOL),
        )
        .unwrap();
        assert!(result.is_none());
    }
}
