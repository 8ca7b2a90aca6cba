#[allow(clippy::assign_op_pattern)]
#[allow(clippy::ptr_offset_with_cast)]
#[allow(clippy::manual_range_contains)]
mod wide {
    uint::construct_uint! {
        /// 256-bit unsigned integer for products that can exceed u128
        pub struct U256(4);
    }
}

pub use wide::U256;

pub fn ceil_div(token_amount: u128, numerator: u128, denominator: u128) -> Option<u128> {
    token_amount
        .checked_mul(numerator)?
        .checked_add(denominator)?
        .checked_sub(1)?
        .checked_div(denominator)
}

pub fn floor_div(token_amount: u128, numerator: u128, denominator: u128) -> Option<u128> {
    token_amount.checked_mul(numerator)?.checked_div(denominator)
}

/// Floor of the exact square root, Babylonian method.
pub fn isqrt(value: u128) -> u128 {
    if value > 3 {
        let mut root = value;
        let mut next = value / 2 + 1;
        while next < root {
            root = next;
            next = (value / next + next) / 2;
        }
        root
    } else if value != 0 {
        1
    } else {
        0
    }
}

pub fn to_u64(value: u128) -> Option<u64> {
    u64::try_from(value).ok()
}

pub fn wide_to_u64(value: U256) -> Option<u64> {
    if value > U256::from(u64::MAX) {
        return None;
    }
    Some(value.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_isqrt_small_values() {
        let expected = [0u128, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3];
        for (value, root) in expected.iter().enumerate() {
            assert_eq!(isqrt(value as u128), *root, "isqrt({})", value);
        }
    }

    #[test]
    fn test_isqrt_perfect_squares() {
        assert_eq!(isqrt(1_000_000), 1_000);
        assert_eq!(isqrt(2_000_000), 1_414);
        assert_eq!(isqrt((u64::MAX as u128) * (u64::MAX as u128)), u64::MAX as u128);
    }

    #[test]
    fn test_isqrt_max() {
        let root = isqrt(u128::MAX);
        assert_eq!(root, u64::MAX as u128);
    }

    #[test]
    fn test_div_rounding() {
        assert_eq!(floor_div(10, 1, 3), Some(3));
        assert_eq!(ceil_div(10, 1, 3), Some(4));
        assert_eq!(ceil_div(9, 1, 3), Some(3));
        assert_eq!(floor_div(1, 1, 0), None);
        assert_eq!(floor_div(u128::MAX, 2, 1), None);
    }

    #[test]
    fn test_wide_to_u64() {
        assert_eq!(wide_to_u64(U256::from(u64::MAX)), Some(u64::MAX));
        assert_eq!(wide_to_u64(U256::from(u64::MAX) + U256::one()), None);
        assert_eq!(to_u64(u64::MAX as u128 + 1), None);
    }

    proptest! {
        #[test]
        fn isqrt_matches_spl_math(value in any::<u128>()) {
            let expected = spl_math::approximations::sqrt(value).unwrap();
            prop_assert_eq!(isqrt(value), expected);
        }

        #[test]
        fn isqrt_is_floor(value in any::<u64>()) {
            let value = value as u128;
            let root = isqrt(value);
            prop_assert!(root * root <= value);
            prop_assert!((root + 1) * (root + 1) > value);
        }
    }
}
