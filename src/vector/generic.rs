//! Portable backend: plain lane arrays.

use super::{Lanes, VectorOps, LANES};

/// 8 × 16-bit lanes computed one lane at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericVector(Lanes);

impl GenericVector {
    #[inline]
    fn map(self, f: impl Fn(u16) -> u16) -> Self {
        let mut out = [0u16; LANES];
        for (dst, a) in out.iter_mut().zip(self.0) {
            *dst = f(a);
        }
        Self(out)
    }

    #[inline]
    fn zip(self, other: Self, f: impl Fn(u16, u16) -> u16) -> Self {
        let mut out = [0u16; LANES];
        for ((dst, a), b) in out.iter_mut().zip(self.0).zip(other.0) {
            *dst = f(a, b);
        }
        Self(out)
    }

    #[inline]
    fn mask(condition: bool) -> u16 {
        if condition {
            0xFFFF
        } else {
            0
        }
    }
}

/// Element permutation table, lane indices with lane 0 first.
pub(crate) const ELEMENT_LANES: [[u8; LANES]; 16] = [
    [0, 1, 2, 3, 4, 5, 6, 7],
    [0, 1, 2, 3, 4, 5, 6, 7],
    [0, 0, 2, 2, 4, 4, 6, 6],
    [1, 1, 3, 3, 5, 5, 7, 7],
    [0, 0, 0, 0, 4, 4, 4, 4],
    [1, 1, 1, 1, 5, 5, 5, 5],
    [2, 2, 2, 2, 6, 6, 6, 6],
    [3, 3, 3, 3, 7, 7, 7, 7],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [2, 2, 2, 2, 2, 2, 2, 2],
    [3, 3, 3, 3, 3, 3, 3, 3],
    [4, 4, 4, 4, 4, 4, 4, 4],
    [5, 5, 5, 5, 5, 5, 5, 5],
    [6, 6, 6, 6, 6, 6, 6, 6],
    [7, 7, 7, 7, 7, 7, 7, 7],
];

impl VectorOps for GenericVector {
    #[inline]
    fn load(lanes: &Lanes) -> Self {
        Self(*lanes)
    }

    #[inline]
    fn store(self) -> Lanes {
        self.0
    }

    #[inline]
    fn zero() -> Self {
        Self([0; LANES])
    }

    #[inline]
    fn splat(value: u16) -> Self {
        Self([value; LANES])
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        self.zip(other, u16::wrapping_add)
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        self.zip(other, u16::wrapping_sub)
    }

    #[inline]
    fn adds(self, other: Self) -> Self {
        self.zip(other, |a, b| (a as i16).saturating_add(b as i16) as u16)
    }

    #[inline]
    fn subs(self, other: Self) -> Self {
        self.zip(other, |a, b| (a as i16).saturating_sub(b as i16) as u16)
    }

    #[inline]
    fn addus(self, other: Self) -> Self {
        self.zip(other, u16::saturating_add)
    }

    #[inline]
    fn subus(self, other: Self) -> Self {
        self.zip(other, u16::saturating_sub)
    }

    #[inline]
    fn mul_lo(self, other: Self) -> Self {
        self.zip(other, u16::wrapping_mul)
    }

    #[inline]
    fn mul_hi(self, other: Self) -> Self {
        self.zip(other, |a, b| ((a as i16 as i32 * b as i16 as i32) >> 16) as u16)
    }

    #[inline]
    fn mul_hi_unsigned(self, other: Self) -> Self {
        self.zip(other, |a, b| ((a as u32 * b as u32) >> 16) as u16)
    }

    #[inline]
    fn and(self, other: Self) -> Self {
        self.zip(other, |a, b| a & b)
    }

    #[inline]
    fn or(self, other: Self) -> Self {
        self.zip(other, |a, b| a | b)
    }

    #[inline]
    fn xor(self, other: Self) -> Self {
        self.zip(other, |a, b| a ^ b)
    }

    #[inline]
    fn and_not(self, mask: Self) -> Self {
        self.zip(mask, |a, m| a & !m)
    }

    #[inline]
    fn shl(self, count: u32) -> Self {
        self.map(|a| if count > 15 { 0 } else { a << count })
    }

    #[inline]
    fn shr(self, count: u32) -> Self {
        self.map(|a| if count > 15 { 0 } else { a >> count })
    }

    #[inline]
    fn sar(self, count: u32) -> Self {
        self.map(|a| ((a as i16) >> count.min(15)) as u16)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        self.zip(other, |a, b| (a as i16).min(b as i16) as u16)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        self.zip(other, |a, b| (a as i16).max(b as i16) as u16)
    }

    #[inline]
    fn eq(self, other: Self) -> Self {
        self.zip(other, |a, b| Self::mask(a == b))
    }

    #[inline]
    fn gt(self, other: Self) -> Self {
        self.zip(other, |a, b| Self::mask((a as i16) > (b as i16)))
    }

    #[inline]
    fn lt(self, other: Self) -> Self {
        self.zip(other, |a, b| Self::mask((a as i16) < (b as i16)))
    }

    #[inline]
    fn shuffle(self, element: u8) -> Self {
        let pattern = &ELEMENT_LANES[(element & 0xF) as usize];
        let mut out = [0u16; LANES];
        for (dst, &src) in out.iter_mut().zip(pattern) {
            *dst = self.0[src as usize];
        }
        Self(out)
    }

    #[inline]
    fn mask_bits(self) -> u8 {
        super::lane_mask_bits(&self.0)
    }
}
