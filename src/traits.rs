//! Core traits and error types for the vector unit.
//!
//! The vector unit never owns the memory it loads from and stores to. Hosts
//! plug their data memory in through [`MemoryBus`]; [`crate::memory::Dmem`]
//! is a ready-made implementation for tests and simple hosts.

use thiserror::Error;

use crate::vector::Backend;

/// Errors raised by a memory bus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Nothing answers at this address.
    #[error("unmapped address 0x{address:08X}")]
    Unmapped {
        /// Faulting address.
        address: u32,
    },

    /// The device at this address rejected the access.
    #[error("bus fault at 0x{address:08X} ({width} bytes): {reason}")]
    Fault {
        /// Faulting address.
        address: u32,
        /// Access width in bytes.
        width: usize,
        /// Device-specific reason.
        reason: String,
    },
}

/// Errors raised when a vector unit is created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The requested backend cannot run on this host.
    #[error("vector backend '{0}' is not available on this host")]
    BackendUnavailable(&'static str),

    /// The backend disagreed with the portable backend during self-test.
    #[error("vector backend '{backend}' diverges from generic on {case}")]
    BackendMismatch {
        /// Backend under test.
        backend: Backend,
        /// First diverging primitive and its operands.
        case: String,
    },
}

/// Byte-addressed data memory seen by the load/store unit.
///
/// The access width is the slice length. Implementations decide how
/// addresses wrap or fault.
pub trait MemoryBus {
    /// Fill `data` with the bytes at `address..address + data.len()`.
    fn read(&mut self, address: u32, data: &mut [u8]) -> Result<(), BusError>;

    /// Write `data` to `address..address + data.len()`.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), BusError>;
}

impl<B: MemoryBus + ?Sized> MemoryBus for &mut B {
    #[inline]
    fn read(&mut self, address: u32, data: &mut [u8]) -> Result<(), BusError> {
        (**self).read(address, data)
    }

    #[inline]
    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), BusError> {
        (**self).write(address, data)
    }
}
