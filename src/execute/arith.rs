//! Add, subtract, logical, merge and move instructions.

use crate::state::ExecutionContext;
use crate::vector::VectorOps;

/// Bitwise operation selected by the logical opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Logical {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Nxor,
}

/// VADD: `vs + vt + carry` with signed saturation.
pub(crate) fn vadd<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let carry = V::load(&ctx.flags.vco_lo);

    // Adding the carry to the smaller operand first keeps the saturating
    // sum exact.
    let min = vs.min(vt);
    let max = vs.max(vt);
    let vd = min.subs(carry).adds(max);

    ctx.acc.lo = vs.add(vt).sub(carry).store();
    clear_vco(ctx);
    vd
}

/// VSUB: `vs - vt - carry` with signed saturation.
pub(crate) fn vsub<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let carry = V::load(&ctx.flags.vco_lo);

    let unsat = vt.sub(carry);
    let sat = vt.subs(carry);
    ctx.acc.lo = vs.sub(unsat).store();

    // `vt + 1` overflowed: take the extra one off after saturating.
    let overflow = sat.gt(unsat);
    let vd = vs.subs(sat).adds(overflow);

    clear_vco(ctx);
    vd
}

/// VADDC: unsigned add, carry out to VCO.
pub(crate) fn vaddc<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let sum = vs.add(vt);
    let carry = vs.addus(vt).eq(sum).not();

    ctx.acc.lo = sum.store();
    ctx.flags.vco_lo = carry.store();
    ctx.flags.vco_hi = V::zero().store();
    sum
}

/// VSUBC: unsigned subtract, borrow and not-equal out to VCO.
pub(crate) fn vsubc<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let diff = vs.sub(vt);
    let equal = vs.eq(vt);
    let borrow = vs.subus(vt).eq(V::zero()).and_not(equal);

    ctx.acc.lo = diff.store();
    ctx.flags.vco_lo = borrow.store();
    ctx.flags.vco_hi = equal.not().store();
    diff
}

/// VABS: `vt` with the sign of `vs`, zero where `vs` is zero.
///
/// The accumulator gets the wrapping negation, so -0x8000 stays 0x8000
/// there while the destination saturates to 0x7FFF.
pub(crate) fn vabs<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let sign = vs.sar(15);
    let vt = vt.and_not(vs.eq(V::zero())).xor(sign);

    ctx.acc.lo = vt.sub(sign).store();
    vt.subs(sign)
}

/// VAND and friends.
pub(crate) fn logical<V: VectorOps>(ctx: &mut ExecutionContext, op: Logical, vs: V, vt: V) -> V {
    let vd = match op {
        Logical::And => vs.and(vt),
        Logical::Nand => vs.and(vt).not(),
        Logical::Or => vs.or(vt),
        Logical::Nor => vs.or(vt).not(),
        Logical::Xor => vs.xor(vt),
        Logical::Nxor => vs.xor(vt).not(),
    };
    ctx.acc.lo = vd.store();
    vd
}

/// VMRG: pick `vs` where VCC low is set, `vt` elsewhere.
pub(crate) fn vmrg<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let vd = V::select(V::load(&ctx.flags.vcc_lo), vs, vt);
    ctx.acc.lo = vd.store();
    clear_vco(ctx);
    vd
}

/// VSAR: read one accumulator plane. Elements other than 8-10 read zero.
pub(crate) fn vsar<V: VectorOps>(ctx: &ExecutionContext, element: u8) -> V {
    match element & 0xF {
        8 => V::load(&ctx.acc.hi),
        9 => V::load(&ctx.acc.md),
        10 => V::load(&ctx.acc.lo),
        _ => V::zero(),
    }
}

/// VMOV: copy lane `de` of the shuffled operand into `vd`.
pub(crate) fn vmov<V: VectorOps>(ctx: &mut ExecutionContext, vd: u8, de: u8, vt: V) {
    let lanes = vt.store();
    ctx.vector.write_lane(vd, de, lanes[(de & 7) as usize]);
    ctx.acc.lo = lanes;
}

#[inline]
fn clear_vco(ctx: &mut ExecutionContext) {
    ctx.flags.vco_lo = [0; 8];
    ctx.flags.vco_hi = [0; 8];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FlagRegister;
    use crate::vector::{GenericVector, Lanes};

    type G = GenericVector;

    fn make_ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    fn v(lanes: Lanes) -> G {
        G::load(&lanes)
    }

    #[test]
    fn test_vadd_saturates_and_uses_carry() {
        let mut ctx = make_ctx();
        ctx.flags.write_packed(FlagRegister::Vco, 0x0003);

        let vs = v([0x7FFF, 1, 0x8000, 5, 0, 0, 0, 0]);
        let vt = v([0x0001, 1, 0xFFFF, 5, 0, 0, 0, 0]);
        let vd = vadd(&mut ctx, vs, vt).store();

        assert_eq!(vd[..4], [0x7FFF, 3, 0x8000, 10]);
        assert_eq!(ctx.acc.lo[..4], [0x8001, 3, 0x7FFF, 10]);
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vco), 0);
    }

    #[test]
    fn test_vadd_carry_rescues_min_side() {
        let mut ctx = make_ctx();
        ctx.flags.write_packed(FlagRegister::Vco, 0x0001);

        // -32768 + 0x7FFF + 1 = 0; adding the carry to 0x7FFF first would saturate.
        let vd = vadd(&mut ctx, v([0x8000, 0, 0, 0, 0, 0, 0, 0]), v([0x7FFF, 0, 0, 0, 0, 0, 0, 0]));
        assert_eq!(vd.store()[0], 0);
    }

    #[test]
    fn test_vsub_with_borrow() {
        let mut ctx = make_ctx();
        ctx.flags.write_packed(FlagRegister::Vco, 0x0007);

        let vs = v([0x8000, 10, 0, 0, 0, 0, 0, 0]);
        let vt = v([0x0001, 3, 0x7FFF, 0, 0, 0, 0, 0]);
        let vd = vsub(&mut ctx, vs, vt).store();

        assert_eq!(vd[..3], [0x8000, 6, 0x8000]);
        assert_eq!(ctx.acc.lo[..3], [0x7FFE, 6, 0x8000]);
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vco), 0);
    }

    #[test]
    fn test_vaddc_carry_out() {
        let mut ctx = make_ctx();
        let vs = v([0xFFFF, 0, 0, 0, 0, 0, 0, 0]);
        let vt = v([1, 0, 0, 0, 0, 0, 0, 0]);
        let vd = vaddc(&mut ctx, vs, vt).store();

        assert_eq!(vd, [0; 8]);
        assert_eq!(ctx.acc.lo, [0; 8]);
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vco), 0x0001);
    }

    #[test]
    fn test_vsubc_borrow_and_not_equal() {
        let mut ctx = make_ctx();
        let vs = v([1, 5, 3, 0, 0, 0, 0, 0]);
        let vt = v([2, 5, 1, 0, 0, 0, 0, 0]);
        let vd = vsubc(&mut ctx, vs, vt).store();

        assert_eq!(vd[..3], [0xFFFF, 0, 2]);
        // lane 0 borrows; lanes 0 and 2 differ
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vco), 0x0501);
    }

    #[test]
    fn test_vabs() {
        let mut ctx = make_ctx();
        let vs = v([5, 0, 0xFFFF, 0xFFFF, 0x8000, 1, 0, 0]);
        let vt = v([7, 7, 7, 0x8000, 0xFFF0, 0x8000, 0, 0]);
        let vd = vabs(&mut ctx, vs, vt).store();

        assert_eq!(vd[..6], [7, 0, 0xFFF9, 0x7FFF, 0x0010, 0x8000]);
        assert_eq!(ctx.acc.lo[3], 0x8000);
    }

    #[test]
    fn test_logical_ops() {
        let mut ctx = make_ctx();
        let a = v([0xF0F0; 8]);
        let b = v([0xFF00; 8]);

        let cases = [
            (Logical::And, 0xF000),
            (Logical::Nand, 0x0FFF),
            (Logical::Or, 0xFFF0),
            (Logical::Nor, 0x000F),
            (Logical::Xor, 0x0FF0),
            (Logical::Nxor, 0xF00F),
        ];
        for (op, expected) in cases {
            assert_eq!(logical(&mut ctx, op, a, b).store(), [expected; 8], "{:?}", op);
            assert_eq!(ctx.acc.lo, [expected; 8]);
        }
    }

    #[test]
    fn test_vmrg_selects_on_vcc() {
        let mut ctx = make_ctx();
        ctx.flags.write_packed(FlagRegister::Vcc, 0xFF05);
        ctx.flags.write_packed(FlagRegister::Vco, 0xFFFF);
        ctx.flags.write_packed(FlagRegister::Vce, 0x00AA);

        let vd = vmrg(&mut ctx, v([1; 8]), v([2; 8])).store();
        assert_eq!(vd, [1, 2, 1, 2, 2, 2, 2, 2]);
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vco), 0);
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vcc), 0xFF05);
        assert_eq!(ctx.flags.read_packed(FlagRegister::Vce), 0x00AA);
    }

    #[test]
    fn test_vsar_reads_planes() {
        let mut ctx = make_ctx();
        ctx.acc.write_lane(0, 0x1111_2222_3333);

        assert_eq!(vsar::<G>(&ctx, 8).store()[0], 0x1111);
        assert_eq!(vsar::<G>(&ctx, 9).store()[0], 0x2222);
        assert_eq!(vsar::<G>(&ctx, 10).store()[0], 0x3333);
        assert_eq!(vsar::<G>(&ctx, 0).store()[0], 0);
        assert_eq!(vsar::<G>(&ctx, 11).store()[0], 0);
    }

    #[test]
    fn test_vmov_single_lane() {
        let mut ctx = make_ctx();
        ctx.vector.write(4, [9; 8]);
        let vt = v([10, 11, 12, 13, 14, 15, 16, 17]);

        vmov(&mut ctx, 4, 3, vt);
        assert_eq!(ctx.vector.read(4), [9, 9, 9, 13, 9, 9, 9, 9]);
        assert_eq!(ctx.acc.lo, [10, 11, 12, 13, 14, 15, 16, 17]);
    }
}
