//! Portable 8 × 16-bit vector type.
//!
//! Every instruction of the vector unit is written once, generically over
//! [`VectorOps`], and runs on one of two interchangeable backends:
//!
//! | Backend | Type | Availability |
//! |---------|------|--------------|
//! | Generic | [`GenericVector`] | every host |
//! | SSE2 | `SseVector` | x86_64 hosts reporting SSE2 at run time |
//!
//! Both backends must produce bit-identical lanes for every input. The
//! primitives are the only place where host SIMD appears; instruction code
//! never uses `cfg` or intrinsics directly.
//!
//! # Lane order
//!
//! Lane 0 is the first element of the `[u16; 8]` array and the most
//! significant element in big-endian register byte order. Lane masks are
//! packed with lane 0 in bit 0.

mod generic;
#[cfg(target_arch = "x86_64")]
mod sse;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use generic::GenericVector;
pub(crate) use generic::ELEMENT_LANES;
#[cfg(target_arch = "x86_64")]
pub use sse::SseVector;

/// Number of 16-bit lanes in a vector register.
pub const LANES: usize = 8;

/// Raw lane storage used by the register files.
pub type Lanes = [u16; LANES];

/// Lane-wise operations over 8 packed 16-bit integers.
///
/// Signedness is a property of the operation, not of the value: `adds`
/// saturates to the signed range, `addus` to the unsigned range, and so on.
/// Compares return lane masks (0x0000 or 0xFFFF per lane).
pub trait VectorOps: Copy + fmt::Debug {
    /// Load 8 lanes.
    fn load(lanes: &Lanes) -> Self;

    /// Store 8 lanes.
    fn store(self) -> Lanes;

    /// All lanes zero.
    fn zero() -> Self;

    /// All lanes set to `value`.
    fn splat(value: u16) -> Self;

    /// Wrapping add.
    fn add(self, other: Self) -> Self;
    /// Wrapping subtract.
    fn sub(self, other: Self) -> Self;
    /// Signed saturating add.
    fn adds(self, other: Self) -> Self;
    /// Signed saturating subtract.
    fn subs(self, other: Self) -> Self;
    /// Unsigned saturating add.
    fn addus(self, other: Self) -> Self;
    /// Unsigned saturating subtract.
    fn subus(self, other: Self) -> Self;

    /// Low 16 bits of the 32-bit product.
    fn mul_lo(self, other: Self) -> Self;
    /// High 16 bits of the signed 32-bit product.
    fn mul_hi(self, other: Self) -> Self;
    /// High 16 bits of the unsigned 32-bit product.
    fn mul_hi_unsigned(self, other: Self) -> Self;

    fn and(self, other: Self) -> Self;
    fn or(self, other: Self) -> Self;
    fn xor(self, other: Self) -> Self;
    /// `self & !mask`.
    fn and_not(self, mask: Self) -> Self;

    /// Logical shift left.
    fn shl(self, count: u32) -> Self;
    /// Logical shift right.
    fn shr(self, count: u32) -> Self;
    /// Arithmetic shift right.
    fn sar(self, count: u32) -> Self;

    /// Signed minimum.
    fn min(self, other: Self) -> Self;
    /// Signed maximum.
    fn max(self, other: Self) -> Self;

    /// Lane mask of `self == other`.
    fn eq(self, other: Self) -> Self;
    /// Lane mask of signed `self > other`.
    fn gt(self, other: Self) -> Self;
    /// Lane mask of signed `self < other`.
    fn lt(self, other: Self) -> Self;

    /// Apply the element permutation `element & 15`.
    fn shuffle(self, element: u8) -> Self;

    /// Pack the sign bit of every lane into a byte, lane 0 in bit 0.
    fn mask_bits(self) -> u8;

    /// All bits set.
    #[inline]
    fn ones() -> Self {
        Self::splat(0xFFFF)
    }

    /// Bitwise complement.
    #[inline]
    fn not(self) -> Self {
        self.xor(Self::ones())
    }

    /// Per-lane `mask ? a : b`. `mask` must hold whole-lane masks.
    #[inline]
    fn select(mask: Self, a: Self, b: Self) -> Self {
        a.and(mask).or(b.and_not(mask))
    }
}

/// Pack a lane mask into a byte without going through a backend.
///
/// This is the reference packing every backend's [`VectorOps::mask_bits`]
/// must agree with.
#[inline]
pub fn lane_mask_bits(lanes: &Lanes) -> u8 {
    lanes
        .iter()
        .enumerate()
        .fold(0u8, |bits, (lane, value)| bits | (((value >> 15) as u8) << lane))
}

/// Expand a packed byte into whole-lane masks (bit set → 0xFFFF).
#[inline]
pub fn lane_mask_from_bits(bits: u8) -> Lanes {
    let mut lanes = [0u16; LANES];
    for (lane, value) in lanes.iter_mut().enumerate() {
        if bits & (1 << lane) != 0 {
            *value = 0xFFFF;
        }
    }
    lanes
}

/// Vector backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Portable lane arrays.
    Generic,
    /// x86_64 SSE2 intrinsics.
    Sse2,
}

impl Backend {
    /// Best backend available on this host.
    pub fn detect() -> Self {
        if Self::Sse2.is_available() {
            return Self::Sse2;
        }
        Self::Generic
    }

    /// Whether this backend can run on this host.
    pub fn is_available(self) -> bool {
        match self {
            Self::Generic => true,
            Self::Sse2 => host_has_sse2(),
        }
    }

    /// Whether this is a host-accelerated backend.
    pub fn is_accelerated(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Short name for logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Sse2 => "sse2",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(target_arch = "x86_64")]
fn host_has_sse2() -> bool {
    is_x86_feature_detected!("sse2")
}

#[cfg(not(target_arch = "x86_64"))]
fn host_has_sse2() -> bool {
    false
}

// ============================================================================
// Backend self-test
// ============================================================================

/// Edge values every backend must agree on.
const PROBE_VALUES: [Lanes; 6] = [
    [0x0000, 0x0001, 0x7FFF, 0x8000, 0x8001, 0xFFFF, 0x1234, 0xEDCB],
    [0xFFFF, 0x8000, 0x7FFF, 0x0001, 0x0000, 0x8000, 0xFFFF, 0x0002],
    [0x8000, 0x8000, 0x8000, 0x8000, 0x7FFF, 0x7FFF, 0x7FFF, 0x7FFF],
    [0x00FF, 0xFF00, 0x0F0F, 0xF0F0, 0x5555, 0xAAAA, 0x3333, 0xCCCC],
    [0x0001, 0x0002, 0x0004, 0x0008, 0x0010, 0x0020, 0x0040, 0x0080],
    [0xC000, 0x4000, 0xBFFF, 0x3FFF, 0xFFFE, 0x0003, 0x9999, 0x6666],
];

/// Run `V` and [`GenericVector`] over the probe corpus.
///
/// Returns the name of the first primitive whose output diverges.
pub(crate) fn verify_against_generic<V: VectorOps>() -> Option<String> {
    for a in &PROBE_VALUES {
        for b in &PROBE_VALUES {
            if let Some(name) = compare_pair::<V>(a, b) {
                return Some(format!("{name}({a:04X?}, {b:04X?})"));
            }
        }
        for element in 0..16u8 {
            let fast = V::load(a).shuffle(element).store();
            let slow = GenericVector::load(a).shuffle(element).store();
            if fast != slow {
                return Some(format!("shuffle(e{element})"));
            }
        }
        for count in [0u32, 1, 7, 15] {
            let va = V::load(a);
            let ga = GenericVector::load(a);
            if va.shl(count).store() != ga.shl(count).store()
                || va.shr(count).store() != ga.shr(count).store()
                || va.sar(count).store() != ga.sar(count).store()
            {
                return Some(format!("shift({count})"));
            }
        }
        if V::load(a).mask_bits() != lane_mask_bits(a) {
            return Some("mask_bits".to_string());
        }
    }
    None
}

fn compare_pair<V: VectorOps>(a: &Lanes, b: &Lanes) -> Option<&'static str> {
    type Binary<T> = fn(T, T) -> T;
    let cases: [(&'static str, Binary<V>, Binary<GenericVector>); 17] = [
        ("add", V::add, GenericVector::add),
        ("sub", V::sub, GenericVector::sub),
        ("adds", V::adds, GenericVector::adds),
        ("subs", V::subs, GenericVector::subs),
        ("addus", V::addus, GenericVector::addus),
        ("subus", V::subus, GenericVector::subus),
        ("mul_lo", V::mul_lo, GenericVector::mul_lo),
        ("mul_hi", V::mul_hi, GenericVector::mul_hi),
        ("mul_hi_unsigned", V::mul_hi_unsigned, GenericVector::mul_hi_unsigned),
        ("and", V::and, GenericVector::and),
        ("or", V::or, GenericVector::or),
        ("xor", V::xor, GenericVector::xor),
        ("and_not", V::and_not, GenericVector::and_not),
        ("min", V::min, GenericVector::min),
        ("max", V::max, GenericVector::max),
        ("eq", V::eq, GenericVector::eq),
        ("gt", V::gt, GenericVector::gt),
    ];

    let (va, vb) = (V::load(a), V::load(b));
    let (ga, gb) = (GenericVector::load(a), GenericVector::load(b));
    for (name, fast, slow) in cases {
        if fast(va, vb).store() != slow(ga, gb).store() {
            return Some(name);
        }
    }
    if va.lt(vb).store() != ga.lt(gb).store() {
        return Some("lt");
    }
    None
}
