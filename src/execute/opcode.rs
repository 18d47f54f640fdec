//! Computational vector instruction encoding.
//!
//! A COP2 computational instruction has bit 25 set and packs its operands
//! as:
//!
//! ```text
//!  31    26 25 24  21 20  16 15  11 10   6 5      0
//! | 010010 | 1 |  e  |  vt  |  vs  |  vd  |  funct |
//! ```

use std::fmt;

/// Primary opcode of COP2 instructions.
const COP2: u32 = 0x12;

/// Computational vector instructions, by function code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorOpcode {
    // Multiply
    Vmulf,
    Vmulu,
    Vmudl,
    Vmudm,
    Vmudn,
    Vmudh,
    Vmacf,
    Vmacu,
    Vmadl,
    Vmadm,
    Vmadn,
    Vmadh,

    // Add
    Vadd,
    Vsub,
    Vabs,
    Vaddc,
    Vsubc,
    Vsar,

    // Select
    Vlt,
    Veq,
    Vne,
    Vge,
    Vcl,
    Vch,
    Vcr,
    Vmrg,

    // Logical
    Vand,
    Vnand,
    Vor,
    Vnor,
    Vxor,
    Vnxor,

    // Divide
    Vrcp,
    Vrcpl,
    Vrcph,
    Vmov,
    Vrsq,
    Vrsql,
    Vrsqh,
    Vnop,
}

impl VectorOpcode {
    /// Decode a 6-bit function code. Reserved codes return `None`.
    pub fn from_funct(funct: u8) -> Option<Self> {
        use VectorOpcode::*;

        Some(match funct & 0x3F {
            0x00 => Vmulf,
            0x01 => Vmulu,
            0x04 => Vmudl,
            0x05 => Vmudm,
            0x06 => Vmudn,
            0x07 => Vmudh,
            0x08 => Vmacf,
            0x09 => Vmacu,
            0x0C => Vmadl,
            0x0D => Vmadm,
            0x0E => Vmadn,
            0x0F => Vmadh,
            0x10 => Vadd,
            0x11 => Vsub,
            0x13 => Vabs,
            0x14 => Vaddc,
            0x15 => Vsubc,
            0x1D => Vsar,
            0x20 => Vlt,
            0x21 => Veq,
            0x22 => Vne,
            0x23 => Vge,
            0x24 => Vcl,
            0x25 => Vch,
            0x26 => Vcr,
            0x27 => Vmrg,
            0x28 => Vand,
            0x29 => Vnand,
            0x2A => Vor,
            0x2B => Vnor,
            0x2C => Vxor,
            0x2D => Vnxor,
            0x30 => Vrcp,
            0x31 => Vrcpl,
            0x32 => Vrcph,
            0x33 => Vmov,
            0x34 => Vrsq,
            0x35 => Vrsql,
            0x36 => Vrsqh,
            0x37 => Vnop,
            _ => return None,
        })
    }

    /// Function code of this opcode.
    pub fn funct(self) -> u8 {
        use VectorOpcode::*;

        match self {
            Vmulf => 0x00,
            Vmulu => 0x01,
            Vmudl => 0x04,
            Vmudm => 0x05,
            Vmudn => 0x06,
            Vmudh => 0x07,
            Vmacf => 0x08,
            Vmacu => 0x09,
            Vmadl => 0x0C,
            Vmadm => 0x0D,
            Vmadn => 0x0E,
            Vmadh => 0x0F,
            Vadd => 0x10,
            Vsub => 0x11,
            Vabs => 0x13,
            Vaddc => 0x14,
            Vsubc => 0x15,
            Vsar => 0x1D,
            Vlt => 0x20,
            Veq => 0x21,
            Vne => 0x22,
            Vge => 0x23,
            Vcl => 0x24,
            Vch => 0x25,
            Vcr => 0x26,
            Vmrg => 0x27,
            Vand => 0x28,
            Vnand => 0x29,
            Vor => 0x2A,
            Vnor => 0x2B,
            Vxor => 0x2C,
            Vnxor => 0x2D,
            Vrcp => 0x30,
            Vrcpl => 0x31,
            Vrcph => 0x32,
            Vmov => 0x33,
            Vrsq => 0x34,
            Vrsql => 0x35,
            Vrsqh => 0x36,
            Vnop => 0x37,
        }
    }

    /// Whether this opcode writes the full accumulator.
    pub fn is_multiply(self) -> bool {
        self.funct() < 0x10
    }

    /// Assembler mnemonic.
    pub fn name(self) -> &'static str {
        use VectorOpcode::*;

        match self {
            Vmulf => "vmulf",
            Vmulu => "vmulu",
            Vmudl => "vmudl",
            Vmudm => "vmudm",
            Vmudn => "vmudn",
            Vmudh => "vmudh",
            Vmacf => "vmacf",
            Vmacu => "vmacu",
            Vmadl => "vmadl",
            Vmadm => "vmadm",
            Vmadn => "vmadn",
            Vmadh => "vmadh",
            Vadd => "vadd",
            Vsub => "vsub",
            Vabs => "vabs",
            Vaddc => "vaddc",
            Vsubc => "vsubc",
            Vsar => "vsar",
            Vlt => "vlt",
            Veq => "veq",
            Vne => "vne",
            Vge => "vge",
            Vcl => "vcl",
            Vch => "vch",
            Vcr => "vcr",
            Vmrg => "vmrg",
            Vand => "vand",
            Vnand => "vnand",
            Vor => "vor",
            Vnor => "vnor",
            Vxor => "vxor",
            Vnxor => "vnxor",
            Vrcp => "vrcp",
            Vrcpl => "vrcpl",
            Vrcph => "vrcph",
            Vmov => "vmov",
            Vrsq => "vrsq",
            Vrsql => "vrsql",
            Vrsqh => "vrsqh",
            Vnop => "vnop",
        }
    }
}

impl fmt::Display for VectorOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded computational vector instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorOp {
    pub opcode: VectorOpcode,
    /// Destination register.
    pub vd: u8,
    /// First source register. Also carries the destination lane for the
    /// single-lane instructions.
    pub vs: u8,
    /// Second source register, permuted by `element`.
    pub vt: u8,
    /// Element code.
    pub element: u8,
}

impl VectorOp {
    /// Build an instruction from fields. Registers are masked to 5 bits and
    /// the element to 4 bits.
    pub fn new(opcode: VectorOpcode, vd: u8, vs: u8, vt: u8, element: u8) -> Self {
        Self {
            opcode,
            vd: vd & 0x1F,
            vs: vs & 0x1F,
            vt: vt & 0x1F,
            element: element & 0xF,
        }
    }

    /// Decode a 32-bit instruction word.
    ///
    /// Returns `None` for words that are not COP2 computational instructions
    /// or that use a reserved function code.
    pub fn decode(word: u32) -> Option<Self> {
        if word >> 26 != COP2 || word & (1 << 25) == 0 {
            return None;
        }
        let opcode = VectorOpcode::from_funct((word & 0x3F) as u8)?;
        Some(Self::new(
            opcode,
            (word >> 6) as u8,
            (word >> 11) as u8,
            (word >> 16) as u8,
            (word >> 21) as u8,
        ))
    }

    /// Encode back to a 32-bit instruction word.
    pub fn encode(&self) -> u32 {
        COP2 << 26
            | 1 << 25
            | (self.element as u32) << 21
            | (self.vt as u32) << 16
            | (self.vs as u32) << 11
            | (self.vd as u32) << 6
            | self.opcode.funct() as u32
    }

    /// Destination lane of VMOV and the reciprocal instructions.
    #[inline]
    pub fn de(&self) -> u8 {
        self.vs & 7
    }
}

impl fmt::Display for VectorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} $v{}, $v{}, $v{}[e{}]",
            self.opcode, self.vd, self.vs, self.vt, self.element
        )
    }
}
