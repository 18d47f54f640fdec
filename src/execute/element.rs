//! Element codes.
//!
//! The 4-bit element field of a vector instruction selects one of sixteen
//! fixed lane permutations. Codes 0 and 1 are the identity, 2-3 broadcast
//! within pairs, 4-7 within quarters and 8-15 broadcast a single lane to the
//! whole vector.
//!
//! [`scatter`] is the inverse used on writeback: each lane of a permuted
//! vector goes back to the lane it was read from. Lanes that no lane reads
//! keep their previous value.

use crate::vector::{Lanes, ELEMENT_LANES, LANES};

/// Lane indices selected by `element`, lane 0 first.
#[inline]
pub fn lanes(element: u8) -> &'static [u8; LANES] {
    &ELEMENT_LANES[(element & 0xF) as usize]
}

/// Lane of the source register that feeds `lane` under `element`.
#[inline]
pub fn source_lane(element: u8, lane: u8) -> u8 {
    lanes(element)[(lane & 7) as usize]
}

/// Bitmask of source lanes `element` reads, lane 0 in bit 0.
pub fn coverage(element: u8) -> u8 {
    lanes(element)
        .iter()
        .fold(0u8, |mask, &lane| mask | (1 << lane))
}

/// Apply the permutation to a lane array.
pub fn gather(element: u8, source: &Lanes) -> Lanes {
    let pattern = lanes(element);
    let mut out = [0u16; LANES];
    for (dst, &src) in out.iter_mut().zip(pattern) {
        *dst = source[src as usize];
    }
    out
}

/// Inverse of [`gather`]: write `permuted` back over `base`.
///
/// When several lanes read the same source lane, the first one wins.
pub fn scatter(element: u8, permuted: &Lanes, base: &Lanes) -> Lanes {
    let mut out = *base;
    let mut written = 0u8;
    for (lane, &src) in lanes(element).iter().enumerate() {
        if written & (1 << src) == 0 {
            out[src as usize] = permuted[lane];
            written |= 1 << src;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{GenericVector, VectorOps};

    const TAGGED: Lanes = [0, 1, 2, 3, 4, 5, 6, 7];

    #[test]
    fn test_identity_codes() {
        assert_eq!(gather(0, &TAGGED), TAGGED);
        assert_eq!(gather(1, &TAGGED), TAGGED);
        assert_eq!(coverage(0), 0xFF);
    }

    #[test]
    fn test_table_values() {
        assert_eq!(lanes(2), &[0, 0, 2, 2, 4, 4, 6, 6]);
        assert_eq!(lanes(7), &[3, 3, 3, 3, 7, 7, 7, 7]);
        assert_eq!(lanes(10), &[2; 8]);
        assert_eq!(source_lane(5, 6), 5);
        // Only the low four bits select.
        assert_eq!(lanes(0x1F), lanes(0xF));
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage(2), 0b0101_0101);
        assert_eq!(coverage(3), 0b1010_1010);
        assert_eq!(coverage(6), 0b0100_0100);
        assert_eq!(coverage(12), 0b0001_0000);
    }

    #[test]
    fn test_gather_matches_vector_shuffle() {
        for element in 0..16 {
            assert_eq!(
                gather(element, &TAGGED),
                GenericVector::load(&TAGGED).shuffle(element).store(),
                "element {}",
                element
            );
        }
    }

    #[test]
    fn test_scatter_inverts_gather() {
        for element in 0..16u8 {
            let restored = scatter(element, &gather(element, &TAGGED), &[0xFFFF; LANES]);
            for lane in 0..8u8 {
                if coverage(element) & (1 << lane) != 0 {
                    assert_eq!(restored[lane as usize], lane as u16, "e{} lane {}", element, lane);
                } else {
                    assert_eq!(restored[lane as usize], 0xFFFF, "e{} lane {}", element, lane);
                }
            }
            // Re-scattering onto the original is a no-op.
            assert_eq!(scatter(element, &gather(element, &TAGGED), &TAGGED), TAGGED);
        }
    }
}
