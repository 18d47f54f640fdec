//! Accumulator narrowing.
//!
//! Every multiply-family instruction writes the full 48-bit accumulator and
//! then narrows one 16-bit window of it into the destination register. All
//! three rules are total and idempotent.

use crate::vector::VectorOps;

/// Signed clamp of acc[47:16].
///
/// In range when `hi` is the sign extension of `md`; otherwise saturates to
/// 0x7FFF or 0x8000 by the sign of `hi`.
#[inline]
pub fn signed_hi<V: VectorOps>(hi: V, md: V) -> V {
    let in_range = hi.eq(md.sar(15));
    let saturated = hi.sar(15).xor(V::splat(0x7FFF));
    V::select(in_range, md, saturated)
}

/// Unsigned clamp of the low plane.
///
/// When acc[47:16] fits in a signed halfword the low plane passes through;
/// otherwise the result is 0x0000 for a negative accumulator and 0xFFFF for a
/// positive one.
#[inline]
pub fn unsigned_lo<V: VectorOps>(hi: V, md: V, lo: V) -> V {
    let in_range = hi.eq(md.sar(15));
    let saturated = hi.sar(15).not();
    V::select(in_range, lo, saturated)
}

/// Unsigned clamp of the middle plane.
///
/// Negative accumulators give 0; acc[47:16] above 0x7FFF gives 0xFFFF.
#[inline]
pub fn unsigned_md<V: VectorOps>(hi: V, md: V) -> V {
    let negative = hi.sar(15);
    let overflow = hi.gt(V::zero());
    md.or(md.sar(15)).and_not(negative).or(overflow)
}
