//! Vector load/store unit.
//!
//! Moves bytes between a vector register and the memory bus. The element
//! field picks the starting register byte (or rotates the window for the
//! packed and transposed forms).
//!
//! # Access groups
//!
//! | Group | Loads | Stores | Span |
//! |-------|-------|--------|------|
//! | 1 | LBV LSV LLV LDV | SBV SSV SLV SDV | 1/2/4/8 contiguous bytes |
//! | 2 | LPV LUV LHV LFV | SPV SUV SHV SFV | 8 bytes, or a 16-byte window |
//! | 4 | LQV LRV | SQV SRV | up to the 16-byte boundary |
//! | T | LTV | STV SWV | 16-byte window, 8 registers |
//!
//! Every access reads or writes one staged byte span with a single bus call.
//! A failed load leaves the register file untouched; a store that only
//! covers part of its span reads the span first so the write is all or
//! nothing.

use smallvec::{smallvec, SmallVec};

use crate::state::{ExecutionContext, VECTOR_BYTES};
use crate::traits::{BusError, MemoryBus};

/// Byte span staged for one bus access.
type Span = SmallVec<[u8; VECTOR_BYTES]>;

/// Access group of a load/store instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGroup {
    /// Partial register, contiguous bytes.
    Partial,
    /// Packed lanes, one byte per lane.
    Packed,
    /// Quad, bounded by a 16-byte line.
    Quad,
    /// Transposed across an 8-register group.
    Transpose,
}

/// Vector load instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    Lbv,
    Lsv,
    Llv,
    Ldv,
    Lqv,
    Lrv,
    Lpv,
    Luv,
    Lhv,
    Lfv,
    Ltv,
}

impl LoadOp {
    /// Decode the 5-bit function field of an LWC2 instruction.
    ///
    /// LWV (function 10) has no effect on hardware and decodes to `None`.
    pub fn from_funct(funct: u8) -> Option<Self> {
        Some(match funct & 0x1F {
            0x00 => Self::Lbv,
            0x01 => Self::Lsv,
            0x02 => Self::Llv,
            0x03 => Self::Ldv,
            0x04 => Self::Lqv,
            0x05 => Self::Lrv,
            0x06 => Self::Lpv,
            0x07 => Self::Luv,
            0x08 => Self::Lhv,
            0x09 => Self::Lfv,
            0x0B => Self::Ltv,
            _ => return None,
        })
    }

    /// log2 of the offset scale.
    pub fn scale(self) -> u32 {
        match self {
            Self::Lbv => 0,
            Self::Lsv => 1,
            Self::Llv => 2,
            Self::Ldv | Self::Lpv | Self::Luv => 3,
            Self::Lqv | Self::Lrv | Self::Lhv | Self::Lfv | Self::Ltv => 4,
        }
    }

    pub fn group(self) -> AccessGroup {
        match self {
            Self::Lbv | Self::Lsv | Self::Llv | Self::Ldv => AccessGroup::Partial,
            Self::Lpv | Self::Luv | Self::Lhv | Self::Lfv => AccessGroup::Packed,
            Self::Lqv | Self::Lrv => AccessGroup::Quad,
            Self::Ltv => AccessGroup::Transpose,
        }
    }
}

/// Vector store instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Sbv,
    Ssv,
    Slv,
    Sdv,
    Sqv,
    Srv,
    Spv,
    Suv,
    Shv,
    Sfv,
    Swv,
    Stv,
}

impl StoreOp {
    /// Decode the 5-bit function field of an SWC2 instruction.
    pub fn from_funct(funct: u8) -> Option<Self> {
        Some(match funct & 0x1F {
            0x00 => Self::Sbv,
            0x01 => Self::Ssv,
            0x02 => Self::Slv,
            0x03 => Self::Sdv,
            0x04 => Self::Sqv,
            0x05 => Self::Srv,
            0x06 => Self::Spv,
            0x07 => Self::Suv,
            0x08 => Self::Shv,
            0x09 => Self::Sfv,
            0x0A => Self::Swv,
            0x0B => Self::Stv,
            _ => return None,
        })
    }

    /// log2 of the offset scale.
    pub fn scale(self) -> u32 {
        match self {
            Self::Sbv => 0,
            Self::Ssv => 1,
            Self::Slv => 2,
            Self::Sdv | Self::Spv | Self::Suv => 3,
            Self::Sqv | Self::Srv | Self::Shv | Self::Sfv | Self::Swv | Self::Stv => 4,
        }
    }

    pub fn group(self) -> AccessGroup {
        match self {
            Self::Sbv | Self::Ssv | Self::Slv | Self::Sdv => AccessGroup::Partial,
            Self::Spv | Self::Suv | Self::Shv | Self::Sfv => AccessGroup::Packed,
            Self::Sqv | Self::Srv => AccessGroup::Quad,
            Self::Swv | Self::Stv => AccessGroup::Transpose,
        }
    }
}

/// Effective address of a vector load/store.
///
/// `offset` is the raw 7-bit signed field; it is scaled by the access size
/// (`1 << scale`) before being added to `base`.
#[inline]
pub fn effective_address(base: u32, offset: u8, scale: u32) -> u32 {
    let offset = (((offset << 1) as i8) >> 1) as i32;
    base.wrapping_add((offset << scale) as u32)
}

/// Byte lanes SFV takes its four values from, by element.
fn sfv_lanes(element: u8) -> Option<[u8; 4]> {
    match element {
        0 | 15 => Some([0, 1, 2, 3]),
        1 => Some([6, 7, 4, 5]),
        4 => Some([1, 2, 3, 0]),
        5 => Some([7, 4, 5, 6]),
        8 => Some([4, 5, 6, 7]),
        11 => Some([3, 0, 1, 2]),
        12 => Some([5, 6, 7, 4]),
        _ => None,
    }
}

/// A store span being assembled before it reaches the bus.
struct StagedStore {
    address: u32,
    bytes: Span,
    written: u32,
}

impl StagedStore {
    fn new(address: u32, len: usize) -> Self {
        Self {
            address,
            bytes: smallvec![0; len],
            written: 0,
        }
    }

    #[inline]
    fn set(&mut self, pos: usize, value: u8) {
        self.bytes[pos] = value;
        self.written |= 1 << pos;
    }

    fn commit<B: MemoryBus + ?Sized>(self, bus: &mut B) -> Result<(), BusError> {
        let len = self.bytes.len();
        if len == 0 {
            return Ok(());
        }
        let full = (1u32 << len) - 1;
        let mut bytes = self.bytes;
        if self.written != full {
            let mut current: Span = smallvec![0; len];
            bus.read(self.address, &mut current)?;
            for (pos, byte) in bytes.iter_mut().enumerate() {
                if self.written & (1 << pos) == 0 {
                    *byte = current[pos];
                }
            }
        }
        bus.write(self.address, &bytes)
    }
}

/// Memory unit for vector loads and stores.
pub struct MemoryUnit;

impl MemoryUnit {
    /// Execute a vector load into register `vt`.
    pub fn load<B: MemoryBus + ?Sized>(
        ctx: &mut ExecutionContext,
        bus: &mut B,
        op: LoadOp,
        address: u32,
        element: u8,
        vt: u8,
    ) -> Result<(), BusError> {
        let e = (element & 0xF) as usize;
        let mut reg = ctx.vector.read_bytes(vt);

        match op {
            LoadOp::Lbv | LoadOp::Lsv | LoadOp::Llv | LoadOp::Ldv => {
                let count = (1usize << op.scale()).min(VECTOR_BYTES - e);
                let span = Self::read_span(bus, address, count)?;
                reg[e..e + count].copy_from_slice(&span);
            }

            LoadOp::Lqv => {
                let count = (VECTOR_BYTES - (address & 15) as usize).min(VECTOR_BYTES - e);
                let span = Self::read_span(bus, address, count)?;
                reg[e..e + count].copy_from_slice(&span);
            }

            LoadOp::Lrv => {
                let offset = (address & 15) as usize;
                if offset > e {
                    let start = VECTOR_BYTES - offset + e;
                    let span = Self::read_span(bus, address & !15, VECTOR_BYTES - start)?;
                    reg[start..].copy_from_slice(&span);
                }
            }

            LoadOp::Lpv | LoadOp::Luv | LoadOp::Lhv => {
                let window = Self::read_span(bus, address & !7, VECTOR_BYTES)?;
                let index = ((address & 7) as usize).wrapping_sub(e);
                let (stride, shift) = match op {
                    LoadOp::Lpv => (1, 8),
                    LoadOp::Luv => (1, 7),
                    _ => (2, 7),
                };
                for lane in 0..8 {
                    let byte = window[index.wrapping_add(lane * stride) & 15];
                    let value = (byte as u16) << shift;
                    reg[lane * 2..lane * 2 + 2].copy_from_slice(&value.to_be_bytes());
                }
            }

            LoadOp::Lfv => {
                let window = Self::read_span(bus, address & !7, VECTOR_BYTES)?;
                let index = ((address & 7) as usize).wrapping_sub(e);
                let mut tmp = [0u8; VECTOR_BYTES];
                for lane in 0..4 {
                    let lo = (window[index.wrapping_add(lane * 4) & 15] as u16) << 7;
                    let hi = (window[index.wrapping_add(lane * 4 + 8) & 15] as u16) << 7;
                    tmp[lane * 2..lane * 2 + 2].copy_from_slice(&lo.to_be_bytes());
                    tmp[lane * 2 + 8..lane * 2 + 10].copy_from_slice(&hi.to_be_bytes());
                }
                let end = (e + 8).min(VECTOR_BYTES);
                reg[e..end].copy_from_slice(&tmp[e..end]);
            }

            LoadOp::Ltv => {
                let window = Self::read_span(bus, address & !7, VECTOR_BYTES)?;
                let mut pos = (e + (address & 8) as usize) & 15;
                let group = vt & !7;
                let first = (e >> 1) as u8;
                for i in 0..8u8 {
                    let reg_index = group + ((first + i) & 7);
                    let hi = window[pos];
                    let lo = window[(pos + 1) & 15];
                    pos = (pos + 2) & 15;
                    ctx.vector.write_byte(reg_index, i * 2, hi);
                    ctx.vector.write_byte(reg_index, i * 2 + 1, lo);
                }
                return Ok(());
            }
        }

        ctx.vector.write_bytes(vt, &reg);
        Ok(())
    }

    /// Execute a vector store from register `vt`.
    pub fn store<B: MemoryBus + ?Sized>(
        ctx: &ExecutionContext,
        bus: &mut B,
        op: StoreOp,
        address: u32,
        element: u8,
        vt: u8,
    ) -> Result<(), BusError> {
        let e = (element & 0xF) as usize;
        let reg = ctx.vector.read_bytes(vt);
        let byte = |index: usize| reg[index & 15];
        let lane = |index: usize| u16::from_be_bytes([reg[(index & 7) * 2], reg[(index & 7) * 2 + 1]]);

        let staged = match op {
            StoreOp::Sbv | StoreOp::Ssv | StoreOp::Slv | StoreOp::Sdv => {
                let count = 1usize << op.scale();
                let mut staged = StagedStore::new(address, count);
                for i in 0..count {
                    staged.set(i, byte(e + i));
                }
                staged
            }

            StoreOp::Sqv => {
                let count = VECTOR_BYTES - (address & 15) as usize;
                let mut staged = StagedStore::new(address, count);
                for i in 0..count {
                    staged.set(i, byte(e + i));
                }
                staged
            }

            StoreOp::Srv => {
                let count = (address & 15) as usize;
                let mut staged = StagedStore::new(address & !15, count);
                for i in 0..count {
                    staged.set(i, byte(e + i + VECTOR_BYTES - count));
                }
                staged
            }

            StoreOp::Spv | StoreOp::Suv => {
                let mut staged = StagedStore::new(address, 8);
                for i in 0..8 {
                    let index = (e + i) & 15;
                    let packed = (index < 8) == (op == StoreOp::Spv);
                    let value = if packed {
                        byte((index & 7) << 1)
                    } else {
                        (lane(index) >> 7) as u8
                    };
                    staged.set(i, value);
                }
                staged
            }

            StoreOp::Shv => {
                let base = (address & 7) as usize;
                let mut staged = StagedStore::new(address & !7, VECTOR_BYTES);
                for i in 0..8 {
                    let b = e + i * 2;
                    let value = (byte(b) << 1) | (byte(b + 1) >> 7);
                    staged.set((base + i * 2) & 15, value);
                }
                staged
            }

            StoreOp::Sfv => {
                let base = (address & 7) as usize;
                let mut staged = StagedStore::new(address & !7, VECTOR_BYTES);
                let lanes = sfv_lanes(e as u8);
                for i in 0..4 {
                    let value = match lanes {
                        Some(lanes) => (lane(lanes[i] as usize) >> 7) as u8,
                        None => 0,
                    };
                    staged.set((base + i * 4) & 15, value);
                }
                staged
            }

            StoreOp::Swv => {
                let base = (address & 7) as usize;
                let mut staged = StagedStore::new(address & !7, VECTOR_BYTES);
                for i in 0..VECTOR_BYTES {
                    staged.set((base + i) & 15, byte(e + i));
                }
                staged
            }

            StoreOp::Stv => {
                let even = e & !1;
                let start = VECTOR_BYTES - even;
                let base = ((address & 7) as usize).wrapping_sub(even);
                let group = vt & !7;
                let mut staged = StagedStore::new(address & !7, VECTOR_BYTES);
                for i in 0..8 {
                    let bytes = ctx.vector.read_bytes(group + i as u8);
                    let pos = base.wrapping_add(i * 2);
                    staged.set(pos & 15, bytes[(start + i * 2) & 15]);
                    staged.set(pos.wrapping_add(1) & 15, bytes[(start + i * 2 + 1) & 15]);
                }
                staged
            }
        };

        staged.commit(bus).map_err(|err| {
            log::debug!("{:?} to 0x{:08X} failed: {}", op, address, err);
            err
        })
    }

    fn read_span<B: MemoryBus + ?Sized>(
        bus: &mut B,
        address: u32,
        len: usize,
    ) -> Result<Span, BusError> {
        let mut span: Span = smallvec![0; len];
        if len > 0 {
            bus.read(address, &mut span).map_err(|err| {
                log::debug!("vector load from 0x{:08X} failed: {}", address, err);
                err
            })?;
        }
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Dmem;

    fn make_ctx() -> ExecutionContext {
        ExecutionContext::new()
    }

    /// DMEM with byte i holding i (mod 256).
    fn make_dmem() -> Dmem {
        let mut dmem = Dmem::new();
        for i in 0..0x1000u32 {
            dmem.write_u8(i, i as u8);
        }
        dmem
    }

    /// Bus that fails every access and counts attempts.
    struct FaultyBus {
        reads: usize,
        writes: usize,
    }

    impl MemoryBus for FaultyBus {
        fn read(&mut self, address: u32, data: &mut [u8]) -> Result<(), BusError> {
            self.reads += 1;
            Err(BusError::Fault {
                address,
                width: data.len(),
                reason: "test".to_string(),
            })
        }

        fn write(&mut self, address: u32, _data: &[u8]) -> Result<(), BusError> {
            self.writes += 1;
            Err(BusError::Unmapped { address })
        }
    }

    /// Bus that records every access.
    #[derive(Default)]
    struct RecordingBus {
        dmem: Dmem,
        accesses: Vec<(char, u32, usize)>,
    }

    impl MemoryBus for RecordingBus {
        fn read(&mut self, address: u32, data: &mut [u8]) -> Result<(), BusError> {
            self.accesses.push(('r', address, data.len()));
            self.dmem.read(address, data)
        }

        fn write(&mut self, address: u32, data: &[u8]) -> Result<(), BusError> {
            self.accesses.push(('w', address, data.len()));
            self.dmem.write(address, data)
        }
    }

    // ========== Addressing ==========

    #[test]
    fn test_effective_address() {
        assert_eq!(effective_address(0x100, 1, 4), 0x110);
        // 0x7F is -1 in the 7-bit field.
        assert_eq!(effective_address(0x100, 0x7F, 3), 0xF8);
        assert_eq!(effective_address(0x100, 0x40, 0), 0xC0);
        assert_eq!(effective_address(0, 0x7F, 0), 0xFFFF_FFFF);
    }

    #[test]
    fn test_decode_functs() {
        assert_eq!(LoadOp::from_funct(0x04), Some(LoadOp::Lqv));
        assert_eq!(LoadOp::from_funct(0x0A), None);
        assert_eq!(LoadOp::from_funct(0x0B), Some(LoadOp::Ltv));
        assert_eq!(StoreOp::from_funct(0x0A), Some(StoreOp::Swv));
        assert_eq!(StoreOp::from_funct(0x0C), None);
        assert_eq!(LoadOp::Lhv.group(), AccessGroup::Packed);
        assert_eq!(StoreOp::Stv.group(), AccessGroup::Transpose);
        assert_eq!(StoreOp::Ssv.scale(), 1);
    }

    // ========== Loads ==========

    #[test]
    fn test_group1_loads() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lsv, 0x20, 4, 1).unwrap();
        assert_eq!(ctx.vector.read_lane(1, 2), 0x2021);

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Ldv, 0x40, 0, 2).unwrap();
        assert_eq!(ctx.vector.read(2)[..4], [0x4041, 0x4243, 0x4445, 0x4647]);
        assert_eq!(ctx.vector.read(2)[4..], [0; 4]);
    }

    #[test]
    fn test_group1_load_drops_past_end() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();
        ctx.vector.write(1, [0xAAAA; 8]);

        // Only two of the eight bytes fit from element 14.
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Ldv, 0x10, 14, 1).unwrap();
        assert_eq!(ctx.vector.read_lane(1, 7), 0x1011);
        assert_eq!(ctx.vector.read_lane(1, 0), 0xAAAA);
    }

    #[test]
    fn test_lqv_stops_at_line() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lqv, 0x0C, 0, 3).unwrap();
        assert_eq!(ctx.vector.read(3), [0x0C0D, 0x0E0F, 0, 0, 0, 0, 0, 0]);

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lqv, 0x30, 0, 4).unwrap();
        assert_eq!(ctx.vector.read_lane(4, 7), 0x3E3F);
    }

    #[test]
    fn test_lrv_fills_from_line_start() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lrv, 0x14, 0, 3).unwrap();
        assert_eq!(ctx.vector.read(3), [0, 0, 0, 0, 0, 0, 0x1011, 0x1213]);

        // Aligned address loads nothing.
        let before = ctx.vector.read(5);
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lrv, 0x20, 0, 5).unwrap();
        assert_eq!(ctx.vector.read(5), before);
    }

    #[test]
    fn test_lqv_lrv_pair_loads_unaligned_vector() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lqv, 0x23, 0, 6).unwrap();
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lrv, 0x33, 0, 6).unwrap();
        assert_eq!(
            ctx.vector.read(6),
            [0x2324, 0x2526, 0x2728, 0x292A, 0x2B2C, 0x2D2E, 0x2F30, 0x3132]
        );
    }

    #[test]
    fn test_packed_loads() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lpv, 0x80, 0, 1).unwrap();
        assert_eq!(ctx.vector.read(1), [0x8000, 0x8100, 0x8200, 0x8300, 0x8400, 0x8500, 0x8600, 0x8700]);

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Luv, 0x80, 0, 2).unwrap();
        assert_eq!(ctx.vector.read_lane(2, 0), 0x80 << 7);
        assert_eq!(ctx.vector.read_lane(2, 7), 0x87 << 7);

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lhv, 0x80, 0, 3).unwrap();
        assert_eq!(ctx.vector.read_lane(3, 1), 0x82 << 7);
        assert_eq!(ctx.vector.read_lane(3, 7), 0x8E << 7);
    }

    #[test]
    fn test_packed_load_rotates_window() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        // Unaligned by 2: lanes come from window bytes 2..10.
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lpv, 0x82, 0, 1).unwrap();
        assert_eq!(ctx.vector.read_lane(1, 0), 0x8200);
        assert_eq!(ctx.vector.read_lane(1, 7), 0x8900);

        // Element 1 shifts the window back by one byte, wrapping within it.
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lpv, 0x80, 1, 1).unwrap();
        assert_eq!(ctx.vector.read_lane(1, 0), 0x8F00);
        assert_eq!(ctx.vector.read_lane(1, 1), 0x8000);
    }

    #[test]
    fn test_lfv() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();
        ctx.vector.write(1, [0xFFFF; 8]);

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lfv, 0x40, 0, 1).unwrap();
        assert_eq!(
            ctx.vector.read(1),
            [0x40 << 7, 0x44 << 7, 0x48 << 7, 0x4C << 7, 0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF]
        );
    }

    #[test]
    fn test_ltv_transposes() {
        let mut ctx = make_ctx();
        let mut dmem = make_dmem();

        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Ltv, 0x100, 0, 8).unwrap();
        for i in 0..8u8 {
            let expected = u16::from_be_bytes([i * 2, i * 2 + 1]);
            assert_eq!(ctx.vector.read_lane(8 + i, i), expected, "v{}", 8 + i);
        }

        // Element 2 starts at the next register of the group.
        let mut ctx = make_ctx();
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Ltv, 0x100, 2, 8).unwrap();
        assert_eq!(ctx.vector.read_lane(9, 0), 0x0203);
        assert_eq!(ctx.vector.read_lane(8, 7), 0x0001);
    }

    #[test]
    fn test_failed_load_leaves_register() {
        let mut ctx = make_ctx();
        ctx.vector.write(1, [0x1234; 8]);
        let mut bus = FaultyBus { reads: 0, writes: 0 };

        for op in [LoadOp::Lqv, LoadOp::Lpv, LoadOp::Ltv, LoadOp::Lbv] {
            let err = MemoryUnit::load(&mut ctx, &mut bus, op, 0x10, 0, 1).unwrap_err();
            assert!(matches!(err, BusError::Fault { .. }));
        }
        assert_eq!(ctx.vector.read(1), [0x1234; 8]);
        assert_eq!(bus.reads, 4);
    }

    // ========== Stores ==========

    #[test]
    fn test_group1_store_wraps_register() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        ctx.vector.write(1, [0x0011, 0, 0, 0, 0, 0, 0, 0xEEFF]);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Slv, 0x10, 14, 1).unwrap();
        assert_eq!(dmem.read_u32(0x10), 0xEEFF_0011);
    }

    #[test]
    fn test_sqv_srv_pair_stores_unaligned_vector() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        ctx.vector.write(2, [0x0001, 0x0203, 0x0405, 0x0607, 0x0809, 0x0A0B, 0x0C0D, 0x0E0F]);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Sqv, 0x25, 0, 2).unwrap();
        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Srv, 0x35, 0, 2).unwrap();
        for i in 0..16u32 {
            assert_eq!(dmem.read_u8(0x25 + i), i as u8);
        }
        assert_eq!(dmem.read_u8(0x24), 0);
        assert_eq!(dmem.read_u8(0x35), 0);
    }

    #[test]
    fn test_spv_suv() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        ctx.vector.write(1, [0x8000, 0x7F80, 0x0100, 0, 0, 0, 0, 0xFF00]);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Spv, 0x00, 0, 1).unwrap();
        assert_eq!(dmem.read_u32(0x00), 0x807F_0100);
        assert_eq!(dmem.read_u8(0x07), 0xFF);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Suv, 0x10, 0, 1).unwrap();
        assert_eq!(dmem.read_u32(0x10), 0x00FF_0200);
    }

    #[test]
    fn test_shv_partial_window_merges() {
        let mut ctx = make_ctx();
        let mut bus = RecordingBus::default();
        bus.dmem.copy_in(0x40, &[0xEE; 16]);
        ctx.vector.write(1, [0x0080, 0x0100, 0x3F80, 0, 0, 0, 0, 0x7F80]);

        MemoryUnit::store(&ctx, &mut bus, StoreOp::Shv, 0x40, 0, 1).unwrap();
        assert_eq!(bus.dmem.read_u8(0x40), 0x01);
        assert_eq!(bus.dmem.read_u8(0x42), 0x02);
        assert_eq!(bus.dmem.read_u8(0x44), 0x7F);
        assert_eq!(bus.dmem.read_u8(0x4E), 0xFF);
        // Odd bytes of the window keep their old value.
        assert_eq!(bus.dmem.read_u8(0x41), 0xEE);
        assert_eq!(bus.accesses, vec![('r', 0x40, 16), ('w', 0x40, 16)]);
    }

    #[test]
    fn test_sfv_patterns() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        ctx.vector.write(1, [0x0080, 0x0100, 0x0180, 0x0200, 0x0280, 0x0300, 0x0380, 0x0400]);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Sfv, 0x10, 0, 1).unwrap();
        assert_eq!(
            [dmem.read_u8(0x10), dmem.read_u8(0x14), dmem.read_u8(0x18), dmem.read_u8(0x1C)],
            [1, 2, 3, 4]
        );

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Sfv, 0x20, 8, 1).unwrap();
        assert_eq!(
            [dmem.read_u8(0x20), dmem.read_u8(0x24), dmem.read_u8(0x28), dmem.read_u8(0x2C)],
            [5, 6, 7, 8]
        );

        // Elements without a pattern write zeros.
        dmem.write_u8(0x30, 0x55);
        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Sfv, 0x30, 2, 1).unwrap();
        assert_eq!(dmem.read_u8(0x30), 0);
    }

    #[test]
    fn test_swv_rotates() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        ctx.vector.write(1, [0x0001, 0x0203, 0x0405, 0x0607, 0x0809, 0x0A0B, 0x0C0D, 0x0E0F]);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Swv, 0x52, 0, 1).unwrap();
        // Byte i lands at window offset (2 + i) & 15.
        assert_eq!(dmem.read_u8(0x52), 0x00);
        assert_eq!(dmem.read_u8(0x5F), 0x0D);
        assert_eq!(dmem.read_u8(0x50), 0x0E);
        assert_eq!(dmem.read_u8(0x51), 0x0F);
    }

    #[test]
    fn test_stv_ltv_round_trip() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        for reg in 16..24u8 {
            let base = (reg - 16) as u16 * 0x1000;
            let lanes = core::array::from_fn(|lane| base + lane as u16);
            ctx.vector.write(reg, lanes);
        }

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Stv, 0x200, 0, 16).unwrap();
        // Register i contributes lane i.
        assert_eq!(dmem.read_u16(0x200), 0x0000);
        assert_eq!(dmem.read_u16(0x202), 0x1001);
        assert_eq!(dmem.read_u16(0x20E), 0x7007);

        let mut loaded = make_ctx();
        MemoryUnit::load(&mut loaded, &mut dmem, LoadOp::Ltv, 0x200, 0, 16).unwrap();
        for i in 0..8u8 {
            assert_eq!(loaded.vector.read_lane(16 + i, i), ctx.vector.read_lane(16 + i, i));
        }
    }

    #[test]
    fn test_full_store_is_single_write() {
        let mut ctx = make_ctx();
        let mut bus = RecordingBus::default();
        ctx.vector.write(1, [0x1111; 8]);

        MemoryUnit::store(&ctx, &mut bus, StoreOp::Sqv, 0x100, 0, 1).unwrap();
        MemoryUnit::store(&ctx, &mut bus, StoreOp::Swv, 0x100, 0, 1).unwrap();
        assert_eq!(bus.accesses, vec![('w', 0x100, 16), ('w', 0x100, 16)]);
    }

    #[test]
    fn test_failed_store_writes_nothing() {
        let ctx = make_ctx();
        let mut bus = FaultyBus { reads: 0, writes: 0 };

        // Partial spans fail on the merge read before any write.
        let err = MemoryUnit::store(&ctx, &mut bus, StoreOp::Sfv, 0x10, 0, 1).unwrap_err();
        assert!(matches!(err, BusError::Fault { .. }));
        assert_eq!(bus.writes, 0);

        let err = MemoryUnit::store(&ctx, &mut bus, StoreOp::Sdv, 0x10, 0, 1).unwrap_err();
        assert_eq!(err, BusError::Unmapped { address: 0x10 });
        assert_eq!(bus.writes, 1);
    }

    #[test]
    fn test_element_zero_is_identity() {
        let mut ctx = make_ctx();
        let mut dmem = Dmem::new();
        let lanes = [0x0102, 0x0304, 0x0506, 0x0708, 0x090A, 0x0B0C, 0x0D0E, 0x0F10];
        ctx.vector.write(1, lanes);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Sqv, 0x300, 0, 1).unwrap();
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lqv, 0x300, 0, 2).unwrap();
        assert_eq!(ctx.vector.read(2), lanes);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Swv, 0x310, 0, 1).unwrap();
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Lqv, 0x310, 0, 3).unwrap();
        assert_eq!(ctx.vector.read(3), lanes);

        MemoryUnit::store(&ctx, &mut dmem, StoreOp::Sdv, 0x320, 0, 1).unwrap();
        MemoryUnit::load(&mut ctx, &mut dmem, LoadOp::Ldv, 0x320, 0, 4).unwrap();
        assert_eq!(ctx.vector.read(4)[..4], lanes[..4]);
    }
}
