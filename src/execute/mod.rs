//! Execution units for vector instructions.
//!
//! | Unit | Instructions |
//! |------|--------------|
//! | [`VectorAlu`] | multiply, add, select, logical, divide |
//! | [`MemoryUnit`] | LBV..LTV, SBV..STV |
//!
//! Instruction semantics are written once over [`VectorOps`] and run on
//! whichever backend the caller picks; [`crate::unit::VectorUnit`] makes that
//! choice once at initialisation.
//!
//! # Example
//!
//! ```
//! use rsp_vu::execute::{VectorAlu, VectorOp, VectorOpcode};
//! use rsp_vu::state::ExecutionContext;
//! use rsp_vu::vector::GenericVector;
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.vector.write(1, [1, 2, 3, 4, 5, 6, 7, 8]);
//! ctx.vector.write(2, [10; 8]);
//!
//! let op = VectorOp::new(VectorOpcode::Vadd, 3, 1, 2, 0);
//! VectorAlu::execute::<GenericVector>(&op, &mut ctx);
//! assert_eq!(ctx.vector.read(3), [11, 12, 13, 14, 15, 16, 17, 18]);
//! ```
//!
//! [`VectorOps`]: crate::vector::VectorOps

mod alu;
mod arith;
mod clamp;
mod compare;
mod divide;
pub mod element;
mod memory;
mod multiply;
mod opcode;
pub mod tables;

pub use alu::VectorAlu;
pub use divide::{evaluate as evaluate_divide, DivideFunction};
pub use memory::{effective_address, AccessGroup, LoadOp, MemoryUnit, StoreOp};
pub use opcode::{VectorOp, VectorOpcode};
