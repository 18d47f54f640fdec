//! Select compares and clip compares.
//!
//! The select compares (VLT, VEQ, VNE, VGE) set VCC low per lane and write
//! the selected operand. The clip compares (VCH, VCL, VCR) implement the
//! double-precision clip test: VCH runs on the high halves and leaves state
//! in VCO and VCE that VCL consumes on the low halves.

use crate::state::ExecutionContext;
use crate::vector::VectorOps;

/// Select compare flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Select {
    Lt,
    Eq,
    Ne,
    Ge,
}

/// VLT, VEQ, VNE, VGE.
///
/// Equal lanes are resolved through VCO so that the pair (VSUBC/VADDC,
/// compare) behaves as a 32-bit compare.
pub(crate) fn select<V: VectorOps>(ctx: &mut ExecutionContext, kind: Select, vs: V, vt: V) -> V {
    let vco_lo = V::load(&ctx.flags.vco_lo);
    let vco_hi = V::load(&ctx.flags.vco_hi);
    let eq = vs.eq(vt);

    let vcc_lo = match kind {
        Select::Lt => eq.and(vco_hi).and(vco_lo).or(vs.lt(vt)),
        Select::Eq => eq.and_not(vco_hi),
        Select::Ne => eq.and(vco_hi).or(eq.not()),
        Select::Ge => vs.gt(vt).or(eq.and_not(vco_hi.and(vco_lo))),
    };

    let vd = V::select(vcc_lo, vs, vt);
    ctx.acc.lo = vd.store();
    ctx.flags.vcc_lo = vcc_lo.store();
    ctx.flags.vcc_hi = V::zero().store();
    ctx.flags.vco_lo = V::zero().store();
    ctx.flags.vco_hi = V::zero().store();
    vd
}

/// VCH: clip test, high half.
///
/// VCO low records whether the operand signs differ, VCO high records
/// "not equal" and VCE records the `vs == -vt - 1` case for VCL.
pub(crate) fn vch<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let zero = V::zero();
    let sign = vs.xor(vt).lt(zero);

    let neg_vt = vt.xor(sign).sub(sign);
    let diff = vs.sub(neg_vt);
    let diff_zero = diff.eq(zero);

    let vt_neg = vt.lt(zero);
    let diff_gtz = diff.gt(zero);
    let diff_gez = diff_gtz.or(diff_zero);
    let diff_lez = diff_gtz.not();

    let ge = V::select(sign, vt_neg, diff_gez);
    let le = V::select(sign, diff_lez, vt_neg);

    let vce = diff.eq(sign).and(sign);
    let ne = diff_zero.or(vce).not();

    let clip = V::select(sign, le, ge);
    let vd = V::select(clip, neg_vt, vs);

    ctx.acc.lo = vd.store();
    ctx.flags.vcc_hi = ge.store();
    ctx.flags.vcc_lo = le.store();
    ctx.flags.vco_hi = ne.store();
    ctx.flags.vco_lo = sign.store();
    ctx.flags.vce = vce.store();
    vd
}

/// VCL: clip test, low half, continuing a preceding VCH.
pub(crate) fn vcl<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let zero = V::zero();
    let sign = V::load(&ctx.flags.vco_lo);
    let ne = V::load(&ctx.flags.vco_hi);
    let vce = V::load(&ctx.flags.vce);
    let old_le = V::load(&ctx.flags.vcc_lo);
    let old_ge = V::load(&ctx.flags.vcc_hi);

    let neg_vt = vt.xor(sign).sub(sign);
    let diff = vs.sub(neg_vt);
    let no_carry = diff.eq(vs.addus(vt));
    let no_vce = vce.eq(zero);
    let diff_zero = diff.eq(zero);

    let le_same = diff_zero.and(no_carry).and(no_vce);
    let le_ext = diff_zero.or(no_carry).and(vce);
    let le_eq = le_same.or(le_ext);
    let ge_eq = vt.subus(vs).eq(zero);

    // Lanes already decided by VCH keep their flags.
    let le = V::select(sign.and_not(ne), le_eq, old_le);
    let ge = V::select(sign.or(ne), old_ge, ge_eq);

    let clip = V::select(sign, le, ge);
    let vd = V::select(clip, neg_vt, vs);

    ctx.acc.lo = vd.store();
    ctx.flags.vcc_hi = ge.store();
    ctx.flags.vcc_lo = le.store();
    ctx.flags.vco_hi = zero.store();
    ctx.flags.vco_lo = zero.store();
    ctx.flags.vce = zero.store();
    vd
}

/// VCR: single-precision clip test against a one's-complement range.
pub(crate) fn vcr<V: VectorOps>(ctx: &mut ExecutionContext, vs: V, vt: V) -> V {
    let zero = V::zero();
    let sign = vs.xor(vt).sar(15);

    let le = vs.and(sign).add(vt).sar(15);
    let ge = vs.or(sign).min(vt).eq(vt);
    let not_vt = vt.xor(sign);

    let clip = V::select(sign, le, ge);
    let vd = V::select(clip, not_vt, vs);

    ctx.acc.lo = vd.store();
    ctx.flags.vcc_hi = ge.store();
    ctx.flags.vcc_lo = le.store();
    ctx.flags.vco_hi = zero.store();
    ctx.flags.vco_lo = zero.store();
    ctx.flags.vce = zero.store();
    vd
}
