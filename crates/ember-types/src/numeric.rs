//! Implicit numeric coercion rules.
//!
//! The core decides *what* to widen; codegen applies the decision to the
//! IR builder. Widening is one-way: narrower to wider, int to float —
//! never float to int and never narrowing. Explicit casts are the
//! caller's responsibility.

use crate::intern::TypeInterner;
use crate::tag::Prim;
use crate::ty::TypeId;

/// A single IR-level cast operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastOp {
    /// No conversion needed.
    None,
    /// Sign-extend a signed integer to a wider integer.
    Sext,
    /// Zero-extend an unsigned integer to a wider integer.
    Zext,
    /// Signed integer to floating point.
    Sitofp,
    /// Unsigned integer to floating point.
    Uitofp,
    /// Extend a float to a wider float.
    Fpext,
}

/// The decision for a two-operand implicit conversion: what to do to each
/// side, and the type both sides have afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WideningPlan {
    pub lhs: CastOp,
    pub rhs: CastOp,
    pub result: TypeId,
}

impl WideningPlan {
    fn noop(result: TypeId) -> Self {
        WideningPlan {
            lhs: CastOp::None,
            rhs: CastOp::None,
            result,
        }
    }
}

fn numeric_prim(interner: &TypeInterner, ty: TypeId) -> Option<(TypeId, Prim)> {
    let base = interner.strip_modifiers(ty);
    let prim = interner.is_prim(base)?;
    prim.is_numeric().then_some((base, prim))
}

fn int_widening_op(source: Prim) -> CastOp {
    if source.is_unsigned() {
        CastOp::Zext
    } else {
        CastOp::Sext
    }
}

fn int_to_float_op(source: Prim) -> CastOp {
    if source.is_unsigned() {
        CastOp::Uitofp
    } else {
        CastOp::Sitofp
    }
}

/// Decide the implicit conversion between two operand types. Returns
/// `None` when either side is outside the numeric cluster; such pairs get
/// no implicit conversion at all.
pub fn widening_plan(interner: &TypeInterner, l: TypeId, r: TypeId) -> Option<WideningPlan> {
    let (lty, lp) = numeric_prim(interner, l)?;
    let (rty, rp) = numeric_prim(interner, r)?;

    if lty == rty {
        return Some(WideningPlan::noop(lty));
    }

    let width = interner.ptr_width();
    let lbw = lp.bit_width(width);
    let rbw = rp.bit_width(width);

    let plan = match (lp.is_int(), rp.is_int()) {
        // int + int: widen the smaller to the larger; the cast kind
        // follows the signedness of the *source*.
        (true, true) => {
            if lbw < rbw {
                WideningPlan {
                    lhs: int_widening_op(lp),
                    rhs: CastOp::None,
                    result: rty,
                }
            } else if lbw > rbw {
                WideningPlan {
                    lhs: CastOp::None,
                    rhs: int_widening_op(rp),
                    result: lty,
                }
            } else {
                // Equal widths, different signedness: no conversion.
                WideningPlan::noop(lty)
            }
        }
        // int + float: the int always converts to the float's type,
        // whatever the widths.
        (true, false) => WideningPlan {
            lhs: int_to_float_op(lp),
            rhs: CastOp::None,
            result: rty,
        },
        (false, true) => WideningPlan {
            lhs: CastOp::None,
            rhs: int_to_float_op(rp),
            result: lty,
        },
        // float + float: extend the smaller.
        (false, false) => {
            if lbw < rbw {
                WideningPlan {
                    lhs: CastOp::Fpext,
                    rhs: CastOp::None,
                    result: rty,
                }
            } else {
                WideningPlan {
                    lhs: CastOp::None,
                    rhs: CastOp::Fpext,
                    result: lty,
                }
            }
        }
    };
    Some(plan)
}

/// One-sided widening toward a target type, for call arguments and
/// assignments. Returns `None` when the conversion would narrow, cross
/// from float to int, or involve a non-numeric type.
pub fn widen_to(interner: &TypeInterner, from: TypeId, to: TypeId) -> Option<CastOp> {
    let (fty, fp) = numeric_prim(interner, from)?;
    let (tty, tp) = numeric_prim(interner, to)?;
    if fty == tty {
        return Some(CastOp::None);
    }

    let width = interner.ptr_width();
    let fbw = fp.bit_width(width);
    let tbw = tp.bit_width(width);

    match (fp.is_int(), tp.is_int()) {
        (true, true) if fbw <= tbw => Some(int_widening_op(fp)),
        (true, false) => Some(int_to_float_op(fp)),
        (false, false) if fbw < tbw => Some(CastOp::Fpext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_int_widens_smaller() {
        let interner = TypeInterner::new();
        let plan = widening_plan(&interner, TypeId::I8, TypeId::I32).unwrap();
        assert_eq!(plan.lhs, CastOp::Sext);
        assert_eq!(plan.rhs, CastOp::None);
        assert_eq!(plan.result, TypeId::I32);

        let plan = widening_plan(&interner, TypeId::U64, TypeId::U16).unwrap();
        assert_eq!(plan.lhs, CastOp::None);
        assert_eq!(plan.rhs, CastOp::Zext);
        assert_eq!(plan.result, TypeId::U64);
    }

    #[test]
    fn test_unsigned_source_zero_extends() {
        let interner = TypeInterner::new();
        let plan = widening_plan(&interner, TypeId::U8, TypeId::I32).unwrap();
        assert_eq!(plan.lhs, CastOp::Zext);
    }

    #[test]
    fn test_int_float_converts_int_regardless_of_width() {
        let interner = TypeInterner::new();
        // A 64-bit int still converts to the narrower float.
        let plan = widening_plan(&interner, TypeId::I64, TypeId::F32).unwrap();
        assert_eq!(plan.lhs, CastOp::Sitofp);
        assert_eq!(plan.result, TypeId::F32);

        let plan = widening_plan(&interner, TypeId::F64, TypeId::U32).unwrap();
        assert_eq!(plan.rhs, CastOp::Uitofp);
        assert_eq!(plan.result, TypeId::F64);
    }

    #[test]
    fn test_float_float_extends_smaller() {
        let interner = TypeInterner::new();
        let plan = widening_plan(&interner, TypeId::F16, TypeId::F64).unwrap();
        assert_eq!(plan.lhs, CastOp::Fpext);
        assert_eq!(plan.result, TypeId::F64);
    }

    #[test]
    fn test_same_type_is_noop() {
        let interner = TypeInterner::new();
        let plan = widening_plan(&interner, TypeId::I32, TypeId::I32).unwrap();
        assert_eq!(plan, WideningPlan::noop(TypeId::I32));
    }

    #[test]
    fn test_non_numeric_is_none() {
        let interner = TypeInterner::new();
        assert!(widening_plan(&interner, TypeId::BOOL, TypeId::I32).is_none());
        let ptr = interner.ptr_to(TypeId::I32);
        assert!(widening_plan(&interner, ptr, TypeId::I32).is_none());
    }

    #[test]
    fn test_widen_to_is_one_way() {
        let interner = TypeInterner::new();
        assert_eq!(widen_to(&interner, TypeId::I8, TypeId::I64), Some(CastOp::Sext));
        assert_eq!(widen_to(&interner, TypeId::I64, TypeId::I8), None, "no narrowing");
        assert_eq!(widen_to(&interner, TypeId::F32, TypeId::I64), None, "no float to int");
        assert_eq!(widen_to(&interner, TypeId::U32, TypeId::F64), Some(CastOp::Uitofp));
    }
}
