use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Every stat that feeds a checksum is stored in this type so that two
/// replicas fold bit-identical values.
pub type Fixed64 = I32F32;

/// Game turns. Production times are whole turns.
pub type Turns = i32;

/// Convert an f64 to Fixed64. Use only when loading content, never in queries.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Division that yields zero instead of panicking on a zero divisor.
#[inline]
pub fn div_or_zero(a: Fixed64, b: Fixed64) -> Fixed64 {
    a.checked_div(b).unwrap_or(Fixed64::ZERO)
}

/// Round a Fixed64 up to whole turns, clamped to the `Turns` range.
#[inline]
pub fn ceil_turns(v: Fixed64) -> Turns {
    let ceil = v.saturating_ceil();
    ceil.saturating_to_num::<Turns>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn out_of_range_saturates() {
        assert_eq!(f64_to_fixed64(1e30), Fixed64::MAX);
        assert_eq!(f64_to_fixed64(-1e30), Fixed64::MIN);
    }

    #[test]
    fn div_by_zero_is_zero() {
        assert_eq!(div_or_zero(f64_to_fixed64(3.0), Fixed64::ZERO), Fixed64::ZERO);
        assert_eq!(
            div_or_zero(f64_to_fixed64(3.0), f64_to_fixed64(2.0)),
            f64_to_fixed64(1.5)
        );
    }

    #[test]
    fn ceil_turns_rounds_up() {
        assert_eq!(ceil_turns(f64_to_fixed64(2.1)), 3);
        assert_eq!(ceil_turns(f64_to_fixed64(4.0)), 4);
        assert_eq!(ceil_turns(Fixed64::MAX), Turns::MAX);
    }

    #[test]
    fn fixed64_determinism() {
        let a = f64_to_fixed64(1.0 / 3.0);
        let b = f64_to_fixed64(1.0 / 3.0);
        assert_eq!(a, b);
        assert_eq!(a * f64_to_fixed64(3.0), b * f64_to_fixed64(3.0));
    }
}
