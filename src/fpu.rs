//! Scalar floating-point compare.
//!
//! Ordered/unordered classification of two IEEE-754 values and the sixteen
//! `C.cond.fmt` predicates of the scalar coprocessor. Operands are passed as
//! raw bit patterns so signaling NaNs survive the trip from a register file.

/// Outcome of comparing `fs` with `ft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpOrdering {
    /// At least one operand is NaN.
    Unordered,
    Less,
    Equal,
    Greater,
}

/// Compare predicate, by the 4-bit `cond` field.
///
/// Bit 0 accepts unordered, bit 1 equal, bit 2 less; bit 3 makes the
/// predicate signal invalid on quiet NaNs too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FpCondition {
    F,
    Un,
    Eq,
    Ueq,
    Olt,
    Ult,
    Ole,
    Ule,
    Sf,
    Ngle,
    Seq,
    Ngl,
    Lt,
    Nge,
    Le,
    Ngt,
}

impl FpCondition {
    /// Decode the `cond` field. Only the low four bits are used.
    pub fn from_bits(cond: u8) -> Self {
        use FpCondition::*;

        const TABLE: [FpCondition; 16] = [
            F, Un, Eq, Ueq, Olt, Ult, Ole, Ule, Sf, Ngle, Seq, Ngl, Lt, Nge, Le, Ngt,
        ];
        TABLE[(cond & 0xF) as usize]
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Whether quiet NaNs raise invalid.
    #[inline]
    pub fn is_signaling(self) -> bool {
        self.bits() & 8 != 0
    }

    /// Evaluate against an ordering.
    pub fn test(self, ordering: FpOrdering) -> bool {
        let bits = self.bits();
        match ordering {
            FpOrdering::Unordered => bits & 1 != 0,
            FpOrdering::Equal => bits & 2 != 0,
            FpOrdering::Less => bits & 4 != 0,
            FpOrdering::Greater => false,
        }
    }
}

/// Result of a compare instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FpCompare {
    /// Condition bit.
    pub condition: bool,
    /// Invalid-operation exception raised.
    pub invalid: bool,
}

#[inline]
fn classify<T: PartialOrd>(fs: T, ft: T) -> FpOrdering {
    match fs.partial_cmp(&ft) {
        Some(std::cmp::Ordering::Less) => FpOrdering::Less,
        Some(std::cmp::Ordering::Equal) => FpOrdering::Equal,
        Some(std::cmp::Ordering::Greater) => FpOrdering::Greater,
        None => FpOrdering::Unordered,
    }
}

/// Order two single-precision bit patterns.
pub fn compare_f32(fs: u32, ft: u32) -> FpOrdering {
    classify(f32::from_bits(fs), f32::from_bits(ft))
}

/// Order two double-precision bit patterns.
pub fn compare_f64(fs: u64, ft: u64) -> FpOrdering {
    classify(f64::from_bits(fs), f64::from_bits(ft))
}

fn is_snan_f32(bits: u32) -> bool {
    f32::from_bits(bits).is_nan() && bits & (1 << 22) == 0
}

fn is_snan_f64(bits: u64) -> bool {
    f64::from_bits(bits).is_nan() && bits & (1 << 51) == 0
}

/// `C.cond.S`
pub fn compare_cond_f32(cond: FpCondition, fs: u32, ft: u32) -> FpCompare {
    let ordering = compare_f32(fs, ft);
    let signaling_nan = is_snan_f32(fs) || is_snan_f32(ft);
    finish(cond, ordering, signaling_nan)
}

/// `C.cond.D`
pub fn compare_cond_f64(cond: FpCondition, fs: u64, ft: u64) -> FpCompare {
    let ordering = compare_f64(fs, ft);
    let signaling_nan = is_snan_f64(fs) || is_snan_f64(ft);
    finish(cond, ordering, signaling_nan)
}

fn finish(cond: FpCondition, ordering: FpOrdering, signaling_nan: bool) -> FpCompare {
    let unordered = ordering == FpOrdering::Unordered;
    FpCompare {
        condition: cond.test(ordering),
        invalid: signaling_nan || (unordered && cond.is_signaling()),
    }
}

/// `C.UEQ.D`: unordered or equal.
pub fn cmp_ueq_64(fs: u64, ft: u64) -> FpCompare {
    compare_cond_f64(FpCondition::Ueq, fs, ft)
}

/// `C.ULT.S`: unordered or less than.
pub fn cmp_ult_32(fs: u32, ft: u32) -> FpCompare {
    compare_cond_f32(FpCondition::Ult, fs, ft)
}

/// `C.OLE.D`: ordered and less than or equal.
pub fn cmp_ole_64(fs: u64, ft: u64) -> FpCompare {
    compare_cond_f64(FpCondition::Ole, fs, ft)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QNAN_64: u64 = 0x7FF8_0000_0000_0000;
    const SNAN_64: u64 = 0x7FF0_0000_0000_0001;
    const QNAN_32: u32 = 0x7FC0_0000;
    const SNAN_32: u32 = 0x7F80_0001;

    fn d(value: f64) -> u64 {
        value.to_bits()
    }

    fn s(value: f32) -> u32 {
        value.to_bits()
    }

    #[test]
    fn test_ordering() {
        assert_eq!(compare_f64(d(1.0), d(2.0)), FpOrdering::Less);
        assert_eq!(compare_f64(d(2.0), d(1.0)), FpOrdering::Greater);
        assert_eq!(compare_f64(d(0.0), d(-0.0)), FpOrdering::Equal);
        assert_eq!(compare_f64(QNAN_64, d(1.0)), FpOrdering::Unordered);
        assert_eq!(compare_f32(s(f32::NEG_INFINITY), s(-1.0)), FpOrdering::Less);
        assert_eq!(compare_f32(s(1.0), SNAN_32), FpOrdering::Unordered);
    }

    #[test]
    fn test_condition_table() {
        for bits in 0..16u8 {
            let cond = FpCondition::from_bits(bits);
            assert_eq!(cond.bits(), bits);
            assert!(!cond.test(FpOrdering::Greater));
        }
        assert!(FpCondition::Ngt.test(FpOrdering::Unordered));
        assert!(FpCondition::Le.test(FpOrdering::Equal));
        assert!(!FpCondition::Olt.test(FpOrdering::Equal));
        assert!(FpCondition::Seq.is_signaling());
        assert!(!FpCondition::Ueq.is_signaling());
    }

    #[test]
    fn test_cmp_ueq_64() {
        assert_eq!(cmp_ueq_64(d(1.5), d(1.5)), FpCompare { condition: true, invalid: false });
        assert_eq!(cmp_ueq_64(d(1.5), d(2.5)), FpCompare { condition: false, invalid: false });
        assert_eq!(cmp_ueq_64(QNAN_64, d(1.0)), FpCompare { condition: true, invalid: false });
        // Quiet predicates still trap signaling NaNs.
        assert_eq!(cmp_ueq_64(SNAN_64, d(1.0)), FpCompare { condition: true, invalid: true });
    }

    #[test]
    fn test_cmp_ult_32() {
        assert!(cmp_ult_32(s(-3.0), s(2.0)).condition);
        assert!(!cmp_ult_32(s(2.0), s(2.0)).condition);
        assert!(cmp_ult_32(s(2.0), QNAN_32).condition);
        assert!(!cmp_ult_32(s(2.0), QNAN_32).invalid);
    }

    #[test]
    fn test_cmp_ole_64() {
        assert!(cmp_ole_64(d(1.0), d(1.0)).condition);
        assert!(cmp_ole_64(d(-1.0), d(1.0)).condition);
        assert!(!cmp_ole_64(d(3.0), d(1.0)).condition);
        assert!(!cmp_ole_64(QNAN_64, d(1.0)).condition);
    }

    #[test]
    fn test_signaling_predicate_traps_quiet_nan() {
        let result = compare_cond_f64(FpCondition::Lt, QNAN_64, d(0.0));
        assert_eq!(result, FpCompare { condition: false, invalid: true });
        let result = compare_cond_f32(FpCondition::Ngle, s(1.0), QNAN_32);
        assert_eq!(result, FpCompare { condition: true, invalid: true });
    }
}
