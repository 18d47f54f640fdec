//! Multiply and multiply-accumulate family.
//!
//! Products are formed as 48-bit values split across three planes, then
//! either written to the accumulator (VMUL*, VMUD*) or added to it
//! (VMAC*, VMAD*). The destination receives a clamped window of the new
//! accumulator.
//!
//! | Product | Operands | Value |
//! |---------|----------|-------|
//! | fraction | s × s | `2·vs·vt` |
//! | low | u × u | `(vs·vt) >> 16` |
//! | mid (M) | s × u | `vs·vt` |
//! | mid (N) | u × s | `vs·vt` |
//! | high | s × s | `(vs·vt) << 16` |

use super::clamp;
use super::VectorOpcode;
use crate::state::Accumulator;
use crate::vector::VectorOps;

/// A 48-bit value per lane, split into three planes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Wide<V> {
    pub hi: V,
    pub md: V,
    pub lo: V,
}

/// Lane mask of unsigned carry out of `a + b`.
#[inline]
fn carry<V: VectorOps>(a: V, b: V) -> V {
    a.addus(b).eq(a.add(b)).not()
}

impl<V: VectorOps> Wide<V> {
    pub fn load(acc: &Accumulator) -> Self {
        Self {
            hi: V::load(&acc.hi),
            md: V::load(&acc.md),
            lo: V::load(&acc.lo),
        }
    }

    pub fn store(self, acc: &mut Accumulator) {
        acc.set_planes(self.hi.store(), self.md.store(), self.lo.store());
    }

    /// Sum modulo 2^48.
    pub fn add(self, other: Self) -> Self {
        let lo = self.lo.add(other.lo);
        let carry_lo = carry(self.lo, other.lo);

        let md_sum = self.md.add(other.md);
        let carry_md = carry(self.md, other.md);

        // Carry masks are -1 per lane, so subtracting one adds one.
        let md = md_sum.sub(carry_lo);
        let carry_round = carry_lo.and(md.eq(V::zero()));

        let hi = self.hi.add(other.hi).sub(carry_md).sub(carry_round);
        Self { hi, md, lo }
    }

    /// `2·vs·vt`, signed.
    fn fraction(vs: V, vt: V) -> Self {
        let lo = vs.mul_lo(vt);
        let hi = vs.mul_hi(vt);
        Self {
            hi: hi.sar(15),
            md: hi.shl(1).or(lo.shr(15)),
            lo: lo.shl(1),
        }
    }

    /// `(vs·vt) >> 16`, both unsigned.
    fn low(vs: V, vt: V) -> Self {
        Self {
            hi: V::zero(),
            md: V::zero(),
            lo: vs.mul_hi_unsigned(vt),
        }
    }

    /// `vs·vt` with `vs` signed and `vt` unsigned.
    fn mid_signed_unsigned(vs: V, vt: V) -> Self {
        let md = vs.mul_hi_unsigned(vt).sub(vt.and(vs.sar(15)));
        Self {
            hi: md.sar(15),
            md,
            lo: vs.mul_lo(vt),
        }
    }

    /// `vs·vt` with `vs` unsigned and `vt` signed.
    fn mid_unsigned_signed(vs: V, vt: V) -> Self {
        let md = vs.mul_hi_unsigned(vt).sub(vs.and(vt.sar(15)));
        Self {
            hi: md.sar(15),
            md,
            lo: vs.mul_lo(vt),
        }
    }

    /// `(vs·vt) << 16`, signed.
    fn high(vs: V, vt: V) -> Self {
        Self {
            hi: vs.mul_hi(vt),
            md: vs.mul_lo(vt),
            lo: V::zero(),
        }
    }

    /// Rounding constant added by VMULF and VMULU.
    fn round() -> Self {
        Self {
            hi: V::zero(),
            md: V::zero(),
            lo: V::splat(0x8000),
        }
    }
}

/// How the destination is narrowed from the accumulator.
#[derive(Debug, Clone, Copy)]
enum Narrow {
    SignedHigh,
    UnsignedLow,
    UnsignedMid,
}

/// Execute one multiply-family instruction and return the destination.
///
/// `opcode` must be one of the twelve multiply opcodes; anything else is
/// treated as VMUDH.
pub(crate) fn execute<V: VectorOps>(
    opcode: VectorOpcode,
    acc: &mut Accumulator,
    vs: V,
    vt: V,
) -> V {
    use VectorOpcode::*;

    let (product, accumulate, narrow) = match opcode {
        Vmulf => (Wide::fraction(vs, vt).add(Wide::round()), false, Narrow::SignedHigh),
        Vmulu => (Wide::fraction(vs, vt).add(Wide::round()), false, Narrow::UnsignedMid),
        Vmacf => (Wide::fraction(vs, vt), true, Narrow::SignedHigh),
        Vmacu => (Wide::fraction(vs, vt), true, Narrow::UnsignedMid),
        Vmudl => (Wide::low(vs, vt), false, Narrow::UnsignedLow),
        Vmadl => (Wide::low(vs, vt), true, Narrow::UnsignedLow),
        Vmudm => (Wide::mid_signed_unsigned(vs, vt), false, Narrow::SignedHigh),
        Vmadm => (Wide::mid_signed_unsigned(vs, vt), true, Narrow::SignedHigh),
        Vmudn => (Wide::mid_unsigned_signed(vs, vt), false, Narrow::UnsignedLow),
        Vmadn => (Wide::mid_unsigned_signed(vs, vt), true, Narrow::UnsignedLow),
        Vmadh => (Wide::high(vs, vt), true, Narrow::SignedHigh),
        _ => (Wide::high(vs, vt), false, Narrow::SignedHigh),
    };

    let result = if accumulate {
        Wide::load(acc).add(product)
    } else {
        product
    };
    result.store(acc);

    match narrow {
        Narrow::SignedHigh => clamp::signed_hi(result.hi, result.md),
        Narrow::UnsignedLow => clamp::unsigned_lo(result.hi, result.md, result.lo),
        Narrow::UnsignedMid => clamp::unsigned_md(result.hi, result.md),
    }
}
