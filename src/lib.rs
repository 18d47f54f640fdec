//! rsp-vu library
//!
//! Execution core for the N64 RSP vector unit: 32 registers of 8 × 16-bit
//! lanes, a 48-bit per-lane accumulator, carry/compare/clip flags and a
//! reciprocal unit, with bit-exact fixed-point semantics on every backend.
//!
//! ```
//! use rsp_vu::config::{BackendPreference, Config};
//! use rsp_vu::execute::{LoadOp, VectorOp, VectorOpcode};
//! use rsp_vu::memory::Dmem;
//! use rsp_vu::unit::VectorUnit;
//!
//! let config = Config { backend: Some(BackendPreference::Generic), ..Config::default() };
//! let mut unit = VectorUnit::init(&config).unwrap();
//!
//! let mut dmem = Dmem::new();
//! dmem.write_u16(0x10, 0x4000);
//! unit.load(&mut dmem, LoadOp::Lsv, 0x10, 0, 1).unwrap();
//!
//! // v2 = v1 * v1[e8] as signed fractions: 0.5 * 0.5
//! unit.execute(&VectorOp::new(VectorOpcode::Vmulf, 2, 1, 1, 8));
//! assert_eq!(unit.context().vector.read_lane(2, 0), 0x2000);
//! ```

pub mod config;
pub mod execute;
pub mod fpu;
pub mod memory;
pub mod state;
pub mod traits;
pub mod unit;
pub mod vector;

pub use config::{BackendPreference, Config};
pub use state::ExecutionContext;
pub use traits::{BusError, InitError, MemoryBus};
pub use unit::VectorUnit;
pub use vector::Backend;
