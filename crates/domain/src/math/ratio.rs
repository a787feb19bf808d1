//! Ratio scaling for token amounts.
//!
//! Native token amounts routinely exceed 2^53, so nothing here goes through
//! floating point. All results are exact up to the documented rounding.

use super::MathError;
use ethers_core::types::{U256, U512};

/// Denominator of slippage tolerances: tolerances are in thousandths.
pub const SLIPPAGE_SCALE: u32 = 1000;

/// Computes `round_half_up(amount * numerator / denominator)`.
///
/// The product is formed on 512 bits, so the only overflow is a final
/// result wider than 256 bits.
pub fn scale_by_ratio(numerator: U256, denominator: U256, amount: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    let denominator = U512::from(denominator);
    let (mut scaled, remainder) = amount.full_mul(numerator).div_mod(denominator);
    // remainder < denominator, so this compares 2 * remainder >= denominator
    if remainder >= denominator - remainder {
        scaled += U512::one();
    }
    U256::try_from(scaled).map_err(|_| MathError::Overflow)
}

/// Returns the minimum acceptable amount after a slippage margin:
/// `amount - floor(amount * tolerance / 1000)`.
///
/// Tolerances above 1000 are treated as 1000.
pub fn apply_slippage(amount: U256, tolerance_thousandths: u32) -> U256 {
    let tolerance = U256::from(tolerance_thousandths.min(SLIPPAGE_SCALE));
    let scale = U256::from(SLIPPAGE_SCALE);

    let (whole, rest) = amount.div_mod(scale);
    let margin = whole * tolerance + rest * tolerance / scale;
    amount - margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_identity_when_denominator_equals_amount() {
        for amount in [1u64, 3, 7, 1_000, 999_999_937] {
            for numerator in [0u64, 1, 2, 50, 12_345_678] {
                let scaled =
                    scale_by_ratio(U256::from(numerator), U256::from(amount), U256::from(amount))
                        .unwrap();
                assert_eq!(scaled, U256::from(numerator));
            }
        }
    }

    #[test]
    fn test_scale_identity_above_f64_precision() {
        let amount = U256::from(10u64).pow(U256::from(30)) + U256::from(7);
        let numerator = U256::from(123_456_789_012_345_678_901u128);

        assert_eq!(scale_by_ratio(numerator, amount, amount).unwrap(), numerator);
    }

    #[test]
    fn test_scale_rounds_half_up() {
        // 3 * 1 / 2 = 1.5 -> 2
        assert_eq!(
            scale_by_ratio(U256::from(1), U256::from(2), U256::from(3)).unwrap(),
            U256::from(2)
        );
        // 1 * 1 / 3 = 0.33 -> 0
        assert_eq!(
            scale_by_ratio(U256::from(1), U256::from(3), U256::from(1)).unwrap(),
            U256::zero()
        );
        // 5 * 1 / 4 = 1.25 -> 1
        assert_eq!(
            scale_by_ratio(U256::from(1), U256::from(4), U256::from(5)).unwrap(),
            U256::from(1)
        );
    }

    #[test]
    fn test_scale_is_monotonic_in_amount() {
        let numerator = U256::from(37);
        let denominator = U256::from(101);
        let mut previous = U256::zero();

        for amount in 0u64..2_000 {
            let scaled = scale_by_ratio(numerator, denominator, U256::from(amount)).unwrap();
            assert!(scaled >= previous, "not monotonic at {amount}");
            previous = scaled;
        }
    }

    #[test]
    fn test_scale_large_values_are_exact() {
        // 2^200 * 3 / 2^100 = 3 * 2^100
        let amount = U256::from(2).pow(U256::from(200));
        let denominator = U256::from(2).pow(U256::from(100));

        assert_eq!(
            scale_by_ratio(U256::from(3), denominator, amount).unwrap(),
            U256::from(3) * denominator
        );
    }

    #[test]
    fn test_scale_wide_intermediate_product() {
        // 2^200 * 2^140 needs 340 bits before dividing by 2^150 + 1
        let amount = U256::from(2).pow(U256::from(200));
        let numerator = U256::from(2).pow(U256::from(140));
        let denominator = U256::from(2).pow(U256::from(150)) + U256::one();

        let scaled = scale_by_ratio(numerator, denominator, amount).unwrap();

        let (expected, remainder) = amount.full_mul(numerator).div_mod(U512::from(denominator));
        let expected = if remainder >= U512::from(denominator) - remainder {
            expected + U512::one()
        } else {
            expected
        };
        assert_eq!(U512::from(scaled), expected);
        assert!(scaled > U256::from(2).pow(U256::from(189)));
        assert!(scaled < U256::from(2).pow(U256::from(190)));
    }

    #[test]
    fn test_scale_division_by_zero() {
        assert_eq!(
            scale_by_ratio(U256::one(), U256::zero(), U256::one()),
            Err(MathError::DivisionByZero)
        );
    }

    #[test]
    fn test_scale_overflow() {
        assert_eq!(
            scale_by_ratio(U256::MAX, U256::one(), U256::from(2)),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn test_slippage_bounds() {
        let amount = U256::from(123_456_789u64);

        assert_eq!(apply_slippage(amount, 0), amount);
        assert_eq!(apply_slippage(amount, 1000), U256::zero());
        assert_eq!(apply_slippage(amount, 5000), U256::zero());
        for tolerance in [1, 5, 10, 500, 999] {
            assert!(apply_slippage(amount, tolerance) <= amount);
        }
    }

    #[test]
    fn test_slippage_floors_the_margin() {
        // 1999 * 5 / 1000 = 9.995 -> margin 9
        assert_eq!(apply_slippage(U256::from(1999), 5), U256::from(1990));
        // below 200 the 0.5% margin rounds down to nothing
        assert_eq!(apply_slippage(U256::from(199), 5), U256::from(199));
    }

    #[test]
    fn test_slippage_at_max_amount() {
        let min = apply_slippage(U256::MAX, 5);
        assert!(min < U256::MAX);
        assert_eq!(apply_slippage(U256::MAX, 1000), U256::zero());
    }
}
