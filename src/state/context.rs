//! Execution context for one vector unit.
//!
//! The `ExecutionContext` holds all state an instruction can observe or
//! change: the vector register file, the accumulator, the flag registers and
//! the divider latch used by double-precision reciprocals.
//!
//! ```
//! use rsp_vu::state::ExecutionContext;
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.mtc2(3, 0, 0x1234);
//! assert_eq!(ctx.vector.read_lane(3, 0), 0x1234);
//! ```

use super::registers::{
    Accumulator, FlagFile, FlagRegister, VcePacking, VectorRegisterFile, VECTOR_BYTES,
};

/// Double-precision divider state shared by the reciprocal instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DivideState {
    /// High half latched by the last VRCPH/VRSQH.
    pub div_in: i16,
    /// High half of the last reciprocal result.
    pub div_out: i16,
    /// A high half is waiting for the next VRCPL/VRSQL.
    pub dp_pending: bool,
}

/// Complete vector unit state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Vector registers (v0-v31).
    pub vector: VectorRegisterFile,

    /// 48-bit accumulator.
    pub acc: Accumulator,

    /// VCO, VCC and VCE.
    pub flags: FlagFile,

    /// Reciprocal divider latch.
    pub divide: DivideState,

    /// Widening applied to VCE on control register reads.
    pub vce_packing: VcePacking,

    /// Vector instructions executed.
    pub instructions: u64,
}

impl ExecutionContext {
    /// Create a new context with all state zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that widens VCE with the given packing.
    pub fn with_vce_packing(vce_packing: VcePacking) -> Self {
        Self {
            vce_packing,
            ..Self::default()
        }
    }

    /// Reset architectural state. The VCE packing is kept.
    pub fn reset(&mut self) {
        *self = Self::with_vce_packing(self.vce_packing);
    }

    /// CFC2: read a flag register into a 32-bit scalar.
    ///
    /// VCO and VCC are sign-extended from bit 15; VCE is widened from 8 bits
    /// per the configured packing.
    pub fn cfc2(&self, rd: u8) -> u32 {
        let reg = FlagRegister::from_control(rd);
        let packed = self.flags.read_packed(reg);
        match reg {
            FlagRegister::Vce => self.vce_packing.widen(packed as u8),
            _ => packed as i16 as i32 as u32,
        }
    }

    /// CTC2: write a flag register from a 32-bit scalar.
    pub fn ctc2(&mut self, rd: u8, value: u32) {
        let reg = FlagRegister::from_control(rd);
        self.flags.write_packed(reg, value as u16);
    }

    /// MFC2: read the halfword starting at register byte `element`.
    ///
    /// The second byte wraps to byte 0 when `element` is 15. The result is
    /// sign-extended.
    pub fn mfc2(&self, vs: u8, element: u8) -> u32 {
        let hi = self.vector.read_byte(vs, element & 0xF);
        let lo = self.vector.read_byte(vs, element.wrapping_add(1) & 0xF);
        i16::from_be_bytes([hi, lo]) as i32 as u32
    }

    /// MTC2: write the low halfword of `value` at register byte `element`.
    ///
    /// At element 15 only the high byte fits.
    pub fn mtc2(&mut self, vt: u8, element: u8, value: u32) {
        let element = element & 0xF;
        let [hi, lo] = (value as u16).to_be_bytes();
        self.vector.write_byte(vt, element, hi);
        if (element as usize) < VECTOR_BYTES - 1 {
            self.vector.write_byte(vt, element + 1, lo);
        }
    }
}
