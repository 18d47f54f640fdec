//! Reciprocal and inverse square root unit.
//!
//! Each instruction reads one lane of `vt` (selected by `element & 7`),
//! writes one lane of `vd` (selected by `de`) and copies the shuffled `vt`
//! into the accumulator low plane. A 32-bit input is formed either from a
//! single signed halfword or, after VRCPH/VRSQH, from the latched high half
//! and the next low half.

use super::tables::{RCP_ROM, RSQ_ROM};
use super::VectorOp;
use crate::state::ExecutionContext;
use crate::vector::{Lanes, VectorOps};

/// Which function the unit evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivideFunction {
    /// `1 / x`
    Reciprocal,
    /// `1 / sqrt(x)`
    InverseSqrt,
}

/// Precision mode of a reciprocal instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DividePrecision {
    /// VRCP/VRSQ: sign-extended 16-bit input.
    Single,
    /// VRCPL/VRSQL: low half, combined with a pending high half.
    Low,
    /// VRCPH/VRSQH: latch the high half, emit the previous result's high half.
    High,
}

/// Evaluate the unit on a 32-bit signed input.
///
/// Zero returns 0x7FFF_FFFF and -32768 returns 0xFFFF_0000; other inputs
/// are normalised and looked up in the ROM.
pub fn evaluate(function: DivideFunction, input: i32) -> u32 {
    let mask = input >> 31;
    let mut data = input ^ mask;
    if input > -32768 {
        data = data.wrapping_sub(mask);
    }

    if data == 0 {
        return 0x7FFF_FFFF;
    }
    if input == -32768 {
        return 0xFFFF_0000;
    }

    let shift = (data as u32).leading_zeros();
    let index = ((((data as u32 as u64) << shift) & 0x7FC0_0000) >> 22) as usize;

    let result = match function {
        DivideFunction::Reciprocal => {
            let rom = (0x10000 | RCP_ROM[index] as u32) << 14;
            rom >> (31 - shift)
        }
        DivideFunction::InverseSqrt => {
            let rom = (0x10000 | RSQ_ROM[(index & 0x1FE) | (shift as usize & 1)] as u32) << 14;
            rom >> ((31 - shift) >> 1)
        }
    };
    result ^ mask as u32
}

/// Execute one reciprocal-unit instruction.
pub(crate) fn execute<V: VectorOps>(
    ctx: &mut ExecutionContext,
    function: DivideFunction,
    precision: DividePrecision,
    op: &VectorOp,
    vt_shuffled: V,
) {
    let (vd, de) = (op.vd, op.de());
    let lane = ctx.vector.read_lane(op.vt, op.element & 7);
    let shuffled: Lanes = vt_shuffled.store();

    match precision {
        DividePrecision::High => {
            ctx.divide.div_in = lane as i16;
            ctx.divide.dp_pending = true;
            ctx.vector.write_lane(vd, de, ctx.divide.div_out as u16);
        }
        DividePrecision::Single | DividePrecision::Low => {
            let input = if precision == DividePrecision::Low && ctx.divide.dp_pending {
                (ctx.divide.div_in as i32) << 16 | lane as i32
            } else {
                lane as i16 as i32
            };
            let result = evaluate(function, input);

            ctx.divide.dp_pending = false;
            ctx.divide.div_out = (result >> 16) as i16;
            ctx.vector.write_lane(vd, de, result as u16);
        }
    }
    ctx.acc.lo = shuffled;
}
