//! x86_64 SSE2 backend.
//!
//! SSE2 is part of the x86_64 baseline, so every intrinsic used here is
//! available whenever this module compiles. `Backend::Sse2` still checks the
//! host at run time before a context is allowed to select it.

// Newer toolchains treat SSE2 value intrinsics as safe under the x86_64
// baseline; older ones require the unsafe blocks.
#![allow(unused_unsafe)]

use std::arch::x86_64::*;
use std::fmt;

use super::{Lanes, VectorOps};

/// 8 × 16-bit lanes in an XMM register.
#[derive(Clone, Copy)]
pub struct SseVector(__m128i);

impl fmt::Debug for SseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SseVector").field(&self.store()).finish()
    }
}

impl SseVector {
    #[inline]
    fn count(count: u32) -> __m128i {
        // SAFETY: SSE2 is always available on x86_64.
        unsafe { _mm_cvtsi32_si128(count as i32) }
    }
}

impl VectorOps for SseVector {
    #[inline]
    fn load(lanes: &Lanes) -> Self {
        // SAFETY: `lanes` is 16 readable bytes; the load is unaligned.
        unsafe { Self(_mm_loadu_si128(lanes.as_ptr() as *const __m128i)) }
    }

    #[inline]
    fn store(self) -> Lanes {
        let mut lanes = [0u16; 8];
        // SAFETY: `lanes` is 16 writable bytes; the store is unaligned.
        unsafe { _mm_storeu_si128(lanes.as_mut_ptr() as *mut __m128i, self.0) };
        lanes
    }

    #[inline]
    fn zero() -> Self {
        unsafe { Self(_mm_setzero_si128()) }
    }

    #[inline]
    fn splat(value: u16) -> Self {
        unsafe { Self(_mm_set1_epi16(value as i16)) }
    }

    #[inline]
    fn add(self, other: Self) -> Self {
        unsafe { Self(_mm_add_epi16(self.0, other.0)) }
    }

    #[inline]
    fn sub(self, other: Self) -> Self {
        unsafe { Self(_mm_sub_epi16(self.0, other.0)) }
    }

    #[inline]
    fn adds(self, other: Self) -> Self {
        unsafe { Self(_mm_adds_epi16(self.0, other.0)) }
    }

    #[inline]
    fn subs(self, other: Self) -> Self {
        unsafe { Self(_mm_subs_epi16(self.0, other.0)) }
    }

    #[inline]
    fn addus(self, other: Self) -> Self {
        unsafe { Self(_mm_adds_epu16(self.0, other.0)) }
    }

    #[inline]
    fn subus(self, other: Self) -> Self {
        unsafe { Self(_mm_subs_epu16(self.0, other.0)) }
    }

    #[inline]
    fn mul_lo(self, other: Self) -> Self {
        unsafe { Self(_mm_mullo_epi16(self.0, other.0)) }
    }

    #[inline]
    fn mul_hi(self, other: Self) -> Self {
        unsafe { Self(_mm_mulhi_epi16(self.0, other.0)) }
    }

    #[inline]
    fn mul_hi_unsigned(self, other: Self) -> Self {
        unsafe { Self(_mm_mulhi_epu16(self.0, other.0)) }
    }

    #[inline]
    fn and(self, other: Self) -> Self {
        unsafe { Self(_mm_and_si128(self.0, other.0)) }
    }

    #[inline]
    fn or(self, other: Self) -> Self {
        unsafe { Self(_mm_or_si128(self.0, other.0)) }
    }

    #[inline]
    fn xor(self, other: Self) -> Self {
        unsafe { Self(_mm_xor_si128(self.0, other.0)) }
    }

    #[inline]
    fn and_not(self, mask: Self) -> Self {
        // _mm_andnot_si128 complements its first operand.
        unsafe { Self(_mm_andnot_si128(mask.0, self.0)) }
    }

    #[inline]
    fn shl(self, count: u32) -> Self {
        unsafe { Self(_mm_sll_epi16(self.0, Self::count(count))) }
    }

    #[inline]
    fn shr(self, count: u32) -> Self {
        unsafe { Self(_mm_srl_epi16(self.0, Self::count(count))) }
    }

    #[inline]
    fn sar(self, count: u32) -> Self {
        unsafe { Self(_mm_sra_epi16(self.0, Self::count(count))) }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        unsafe { Self(_mm_min_epi16(self.0, other.0)) }
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        unsafe { Self(_mm_max_epi16(self.0, other.0)) }
    }

    #[inline]
    fn eq(self, other: Self) -> Self {
        unsafe { Self(_mm_cmpeq_epi16(self.0, other.0)) }
    }

    #[inline]
    fn gt(self, other: Self) -> Self {
        unsafe { Self(_mm_cmpgt_epi16(self.0, other.0)) }
    }

    #[inline]
    fn lt(self, other: Self) -> Self {
        unsafe { Self(_mm_cmplt_epi16(self.0, other.0)) }
    }

    #[inline]
    fn shuffle(self, element: u8) -> Self {
        let v = self.0;
        // Quarter and half patterns stay within each 64-bit half; whole
        // broadcasts replicate one lane into a half, then duplicate the half.
        unsafe {
            Self(match element & 0xF {
                0 | 1 => v,
                2 => _mm_shufflehi_epi16(_mm_shufflelo_epi16(v, 0xA0), 0xA0),
                3 => _mm_shufflehi_epi16(_mm_shufflelo_epi16(v, 0xF5), 0xF5),
                4 => _mm_shufflehi_epi16(_mm_shufflelo_epi16(v, 0x00), 0x00),
                5 => _mm_shufflehi_epi16(_mm_shufflelo_epi16(v, 0x55), 0x55),
                6 => _mm_shufflehi_epi16(_mm_shufflelo_epi16(v, 0xAA), 0xAA),
                7 => _mm_shufflehi_epi16(_mm_shufflelo_epi16(v, 0xFF), 0xFF),
                8 => {
                    let half = _mm_shufflelo_epi16(v, 0x00);
                    _mm_unpacklo_epi64(half, half)
                }
                9 => {
                    let half = _mm_shufflelo_epi16(v, 0x55);
                    _mm_unpacklo_epi64(half, half)
                }
                10 => {
                    let half = _mm_shufflelo_epi16(v, 0xAA);
                    _mm_unpacklo_epi64(half, half)
                }
                11 => {
                    let half = _mm_shufflelo_epi16(v, 0xFF);
                    _mm_unpacklo_epi64(half, half)
                }
                12 => {
                    let half = _mm_shufflehi_epi16(v, 0x00);
                    _mm_unpackhi_epi64(half, half)
                }
                13 => {
                    let half = _mm_shufflehi_epi16(v, 0x55);
                    _mm_unpackhi_epi64(half, half)
                }
                14 => {
                    let half = _mm_shufflehi_epi16(v, 0xAA);
                    _mm_unpackhi_epi64(half, half)
                }
                _ => {
                    let half = _mm_shufflehi_epi16(v, 0xFF);
                    _mm_unpackhi_epi64(half, half)
                }
            })
        }
    }

    #[inline]
    fn mask_bits(self) -> u8 {
        // Signed packing keeps each lane's sign in its byte.
        unsafe { _mm_movemask_epi8(_mm_packs_epi16(self.0, _mm_setzero_si128())) as u8 }
    }
}
