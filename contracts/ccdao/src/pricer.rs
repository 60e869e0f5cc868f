//! # Bonding Curve Pricer
//!
//! A linear curve expressed in basis points of [`PRICE_SCALE`]:
//!
//! ```text
//! price_for(x) = base_rate + slope * x
//! ```
//!
//! The price is read as the share of a project's outstanding balance that an
//! allocation releases, so it is capped at `PRICE_SCALE` (100%) when sizing an
//! allocation. Everything here is pure: no storage access, no `Env`.

use soroban_sdk::contracttype;

use crate::types::Project;

/// Basis-point denominator for curve rates.
pub const PRICE_SCALE: i128 = 10_000;

/// Curve parameters, immutable after construction.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BondingCurve {
    /// Rate at zero input, in basis points. Must be in `1..=PRICE_SCALE`.
    pub base_rate: i128,
    /// Rate increase per unit of input, in basis points. Must be `>= 0`.
    pub slope: i128,
}

impl BondingCurve {
    pub fn is_valid(&self) -> bool {
        self.base_rate > 0 && self.base_rate <= PRICE_SCALE && self.slope >= 0
    }

    /// Price at `cumulative_input`. Negative inputs price as zero.
    pub fn price_for(&self, cumulative_input: i128) -> i128 {
        let input = if cumulative_input > 0 { cumulative_input } else { 0 };
        self.slope
            .saturating_mul(input)
            .saturating_add(self.base_rate)
    }

    /// Amount releasable to `project` right now.
    pub fn allocation_amount(&self, project: &Project) -> i128 {
        self.allocation_for_outstanding(project.outstanding())
    }

    /// `ceil(outstanding * rate / PRICE_SCALE)`, clamped to `[0, outstanding]`.
    pub fn allocation_for_outstanding(&self, outstanding: i128) -> i128 {
        if outstanding <= 0 {
            return 0;
        }
        let rate = self.price_for(outstanding).min(PRICE_SCALE);
        if rate <= 0 {
            return 0;
        }

        // Split to keep the product in range: o = q * S + r.
        let whole = (outstanding / PRICE_SCALE) * rate;
        let part = (outstanding % PRICE_SCALE) * rate;
        let amount = whole + (part + PRICE_SCALE - 1) / PRICE_SCALE;

        amount.min(outstanding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVE: BondingCurve = BondingCurve {
        base_rate: 5_000,
        slope: 10,
    };

    #[test]
    fn validity() {
        assert!(CURVE.is_valid());
        assert!(BondingCurve { base_rate: PRICE_SCALE, slope: 0 }.is_valid());
        assert!(!BondingCurve { base_rate: 0, slope: 10 }.is_valid());
        assert!(!BondingCurve { base_rate: PRICE_SCALE + 1, slope: 0 }.is_valid());
        assert!(!BondingCurve { base_rate: 5_000, slope: -1 }.is_valid());
    }

    #[test]
    fn price_is_linear_from_base() {
        assert_eq!(CURVE.price_for(0), 5_000);
        assert_eq!(CURVE.price_for(100), 6_000);
        assert_eq!(CURVE.price_for(-50), 5_000);
    }

    #[test]
    fn price_is_monotonic() {
        let inputs = [
            -1_000,
            0,
            1,
            2,
            99,
            100,
            1_000,
            1_000_000_000,
            i128::MAX / 20,
            i128::MAX / 2,
            i128::MAX,
        ];
        for pair in inputs.windows(2) {
            assert!(CURVE.price_for(pair[0]) <= CURVE.price_for(pair[1]));
        }
        for x in 0..2_000 {
            assert!(CURVE.price_for(x) <= CURVE.price_for(x + 1));
        }
    }

    #[test]
    fn price_saturates() {
        assert_eq!(CURVE.price_for(i128::MAX), i128::MAX);
    }

    #[test]
    fn allocation_follows_rate() {
        // price_for(100) = 6_000 bps -> 60%
        assert_eq!(CURVE.allocation_for_outstanding(100), 60);
        // price_for(500) = 10_000 bps -> everything
        assert_eq!(CURVE.allocation_for_outstanding(500), 500);
        // beyond the cap still releases everything, never more
        assert_eq!(CURVE.allocation_for_outstanding(1_000_000), 1_000_000);
    }

    #[test]
    fn allocation_rounds_up_single_unit() {
        assert_eq!(CURVE.allocation_for_outstanding(1), 1);
        let flat = BondingCurve { base_rate: 1, slope: 0 };
        assert_eq!(flat.allocation_for_outstanding(3), 1);
    }

    #[test]
    fn allocation_nothing_outstanding() {
        assert_eq!(CURVE.allocation_for_outstanding(0), 0);
        assert_eq!(CURVE.allocation_for_outstanding(-5), 0);
    }

    #[test]
    fn allocation_bounded_by_outstanding() {
        let flat = BondingCurve { base_rate: 3_333, slope: 0 };
        for o in 0..5_000 {
            let amount = flat.allocation_for_outstanding(o);
            assert!(amount >= 0 && amount <= o);
            if o > 0 {
                assert!(amount > 0);
            }
        }
    }

    #[test]
    fn allocation_does_not_overflow() {
        let flat = BondingCurve { base_rate: 9_999, slope: 0 };
        let amount = flat.allocation_for_outstanding(i128::MAX);
        assert!(amount > 0 && amount <= i128::MAX);
    }
}
