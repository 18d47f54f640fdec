//! Architectural state of the vector unit.
//!
//! | Register File | Count | Width | Purpose |
//! |---------------|-------|-------|---------|
//! | Vector | 32 | 128-bit | 8 × 16-bit SIMD lanes |
//! | Accumulator | 1 | 8 × 48-bit | multiply-accumulate results |
//! | VCO | 1 | 16-bit | carry / not-equal |
//! | VCC | 1 | 16-bit | compare / clip |
//! | VCE | 1 | 8-bit | compare extension |
//!
//! # Example
//!
//! ```
//! use rsp_vu::state::ExecutionContext;
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.ctc2(1, 0x00FF);      // VCC low plane all set
//! assert_eq!(ctx.cfc2(1), 0x00FF);
//! ```

mod context;
mod registers;

pub use context::{DivideState, ExecutionContext};
pub use registers::{
    Accumulator, FlagFile, FlagRegister, VcePacking, VectorRegisterFile, NUM_VECTOR_REGS,
    VECTOR_BYTES,
};
