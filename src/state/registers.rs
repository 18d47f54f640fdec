//! Register files of the vector unit.
//!
//! - **Vector**: 32 × 128-bit registers (v0-v31), 8 lanes × 16 bits
//! - **Accumulator**: 8 lanes × 48 bits, stored as three 16-bit planes
//! - **Flags**: VCO, VCC (two lane-mask planes each) and VCE (one plane)
//!
//! Register memory order is big-endian: byte 0 of a register is the high
//! byte of lane 0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vector::{lane_mask_bits, lane_mask_from_bits, Lanes, LANES};

/// Number of vector registers.
pub const NUM_VECTOR_REGS: usize = 32;

/// Bytes per vector register.
pub const VECTOR_BYTES: usize = 16;

/// Vector register file.
///
/// 32 × 128-bit registers (v0-v31).
#[derive(Clone, PartialEq, Eq)]
pub struct VectorRegisterFile {
    regs: [Lanes; NUM_VECTOR_REGS],
}

impl Default for VectorRegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorRegisterFile {
    /// Create a new zeroed register file.
    pub const fn new() -> Self {
        Self {
            regs: [[0; LANES]; NUM_VECTOR_REGS],
        }
    }

    /// Read a vector register (0-31).
    #[inline]
    pub fn read(&self, reg: u8) -> Lanes {
        self.regs[(reg & 0x1F) as usize]
    }

    /// Write a vector register (0-31).
    #[inline]
    pub fn write(&mut self, reg: u8, value: Lanes) {
        self.regs[(reg & 0x1F) as usize] = value;
    }

    /// Read a single lane (0-7).
    #[inline]
    pub fn read_lane(&self, reg: u8, lane: u8) -> u16 {
        self.regs[(reg & 0x1F) as usize][(lane & 0x07) as usize]
    }

    /// Write a single lane (0-7).
    #[inline]
    pub fn write_lane(&mut self, reg: u8, lane: u8, value: u16) {
        self.regs[(reg & 0x1F) as usize][(lane & 0x07) as usize] = value;
    }

    /// Read register byte 0-15 in big-endian order.
    #[inline]
    pub fn read_byte(&self, reg: u8, byte: u8) -> u8 {
        let lane = self.read_lane(reg, (byte & 0xF) >> 1);
        if byte & 1 == 0 {
            (lane >> 8) as u8
        } else {
            lane as u8
        }
    }

    /// Write register byte 0-15 in big-endian order.
    #[inline]
    pub fn write_byte(&mut self, reg: u8, byte: u8, value: u8) {
        let slot = &mut self.regs[(reg & 0x1F) as usize][((byte & 0xF) >> 1) as usize];
        if byte & 1 == 0 {
            *slot = (*slot & 0x00FF) | ((value as u16) << 8);
        } else {
            *slot = (*slot & 0xFF00) | value as u16;
        }
    }

    /// Read a whole register as big-endian bytes.
    pub fn read_bytes(&self, reg: u8) -> [u8; VECTOR_BYTES] {
        let mut bytes = [0u8; VECTOR_BYTES];
        for (chunk, lane) in bytes.chunks_exact_mut(2).zip(self.read(reg)) {
            chunk.copy_from_slice(&lane.to_be_bytes());
        }
        bytes
    }

    /// Write a whole register from big-endian bytes.
    pub fn write_bytes(&mut self, reg: u8, bytes: &[u8; VECTOR_BYTES]) {
        let mut lanes = [0u16; LANES];
        for (lane, chunk) in lanes.iter_mut().zip(bytes.chunks_exact(2)) {
            *lane = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        self.write(reg, lanes);
    }
}

impl fmt::Debug for VectorRegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let non_zero: Vec<_> = self
            .regs
            .iter()
            .enumerate()
            .filter(|(_, v)| v.iter().any(|x| *x != 0))
            .collect();

        if non_zero.is_empty() {
            write!(f, "VectorRegisterFile {{ all zero }}")
        } else {
            writeln!(f, "VectorRegisterFile {{")?;
            for (reg, val) in non_zero {
                write!(f, "  v{}: [", reg)?;
                for (i, lane) in val.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "0x{:04X}", lane)?;
                }
                writeln!(f, "]")?;
            }
            write!(f, "}}")
        }
    }
}

/// Mask for the 48-bit accumulator lanes.
const ACC_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Wide accumulator.
///
/// One 48-bit signed value per lane, held as three planes: `hi` (bits 47:32),
/// `md` (bits 31:16) and `lo` (bits 15:0). Arithmetic wraps modulo 2^48.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    pub hi: Lanes,
    pub md: Lanes,
    pub lo: Lanes,
}

impl Accumulator {
    /// Create a zeroed accumulator.
    pub const fn new() -> Self {
        Self {
            hi: [0; LANES],
            md: [0; LANES],
            lo: [0; LANES],
        }
    }

    /// Read one lane as a sign-extended 48-bit value.
    #[inline]
    pub fn read_lane(&self, lane: u8) -> i64 {
        let i = (lane & 0x07) as usize;
        let raw = (self.hi[i] as u64) << 32 | (self.md[i] as u64) << 16 | self.lo[i] as u64;
        ((raw << 16) as i64) >> 16
    }

    /// Write one lane; bits above 47 are discarded.
    #[inline]
    pub fn write_lane(&mut self, lane: u8, value: i64) {
        let i = (lane & 0x07) as usize;
        let raw = value as u64 & ACC_MASK;
        self.hi[i] = (raw >> 32) as u16;
        self.md[i] = (raw >> 16) as u16;
        self.lo[i] = raw as u16;
    }

    /// Replace all three planes at once.
    #[inline]
    pub fn set_planes(&mut self, hi: Lanes, md: Lanes, lo: Lanes) {
        self.hi = hi;
        self.md = md;
        self.lo = lo;
    }

    /// Clear every lane.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accumulator [")?;
        for lane in 0..LANES as u8 {
            if lane > 0 {
                write!(f, ", ")?;
            }
            write!(f, "0x{:012X}", self.read_lane(lane) as u64 & ACC_MASK)?;
        }
        write!(f, "]")
    }
}

/// Flag registers addressable through control transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagRegister {
    /// Carry (low plane) and not-equal (high plane).
    Vco,
    /// Compare (low plane) and clip (high plane).
    Vcc,
    /// Compare extension (single plane).
    Vce,
}

impl FlagRegister {
    /// Decode a control register number; 2 and 3 both name VCE.
    pub fn from_control(rd: u8) -> Self {
        match rd & 3 {
            0 => Self::Vco,
            1 => Self::Vcc,
            _ => Self::Vce,
        }
    }
}

/// How the 8-bit VCE value is widened when read into a 32-bit register.
///
/// Hardware behaviour for this transfer has been disputed; both readings are
/// supported and `ZeroExtended` matches hardware captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VcePacking {
    /// Upper 24 bits are zero.
    #[default]
    ZeroExtended,
    /// Bit 7 is copied into the upper 24 bits.
    SignExtended,
}

impl VcePacking {
    /// Widen a packed VCE byte.
    #[inline]
    pub fn widen(self, vce: u8) -> u32 {
        match self {
            Self::ZeroExtended => vce as u32,
            Self::SignExtended => vce as i8 as i32 as u32,
        }
    }
}

/// Flag register file.
///
/// Each plane is a lane mask: 0xFFFF where the flag is set, 0x0000 elsewhere.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FlagFile {
    pub vco_lo: Lanes,
    pub vco_hi: Lanes,
    pub vcc_lo: Lanes,
    pub vcc_hi: Lanes,
    pub vce: Lanes,
}

impl FlagFile {
    /// Create a cleared flag file.
    pub const fn new() -> Self {
        Self {
            vco_lo: [0; LANES],
            vco_hi: [0; LANES],
            vcc_lo: [0; LANES],
            vcc_hi: [0; LANES],
            vce: [0; LANES],
        }
    }

    /// Packed value: low plane in bits 0-7, high plane in bits 8-15.
    ///
    /// VCE only has a low plane, so its high byte is always zero.
    pub fn read_packed(&self, reg: FlagRegister) -> u16 {
        let (hi, lo) = self.planes(reg);
        (lane_mask_bits(&hi) as u16) << 8 | lane_mask_bits(&lo) as u16
    }

    /// Write a packed value; VCE ignores the high byte.
    pub fn write_packed(&mut self, reg: FlagRegister, value: u16) {
        let lo = lane_mask_from_bits(value as u8);
        let hi = lane_mask_from_bits((value >> 8) as u8);
        self.write_planes(reg, hi, lo);
    }

    /// Read both planes as (high, low). VCE reports a zero high plane.
    pub fn planes(&self, reg: FlagRegister) -> (Lanes, Lanes) {
        match reg {
            FlagRegister::Vco => (self.vco_hi, self.vco_lo),
            FlagRegister::Vcc => (self.vcc_hi, self.vcc_lo),
            FlagRegister::Vce => ([0; LANES], self.vce),
        }
    }

    /// Write both planes from lane masks. Lanes are normalised so any value
    /// with its sign bit set counts as set.
    pub fn write_planes(&mut self, reg: FlagRegister, hi: Lanes, lo: Lanes) {
        let hi = normalize(hi);
        let lo = normalize(lo);
        match reg {
            FlagRegister::Vco => {
                self.vco_hi = hi;
                self.vco_lo = lo;
            }
            FlagRegister::Vcc => {
                self.vcc_hi = hi;
                self.vcc_lo = lo;
            }
            FlagRegister::Vce => self.vce = lo,
        }
    }

    /// Clear every flag.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[inline]
fn normalize(lanes: Lanes) -> Lanes {
    lane_mask_from_bits(lane_mask_bits(&lanes))
}

impl fmt::Debug for FlagFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FlagFile {{ vco: 0x{:04X}, vcc: 0x{:04X}, vce: 0x{:02X} }}",
            self.read_packed(FlagRegister::Vco),
            self.read_packed(FlagRegister::Vcc),
            self.read_packed(FlagRegister::Vce)
        )
    }
}
