use super::constants::FEE_DENOMINATOR;
use super::types::Pool;
use num_bigint::BigUint;
use num_traits::{One, Zero};

impl Pool {
    /// Orients the reserves for a swap entering with `token_in`. Returns
    /// `(reserve_in, reserve_out)`, or `None` if the token is not a side
    /// of this pool.
    pub fn reserves_oriented(&self, token_in: &str) -> Option<(&BigUint, &BigUint)> {
        if token_in == self.token0 {
            Some((&self.reserve0, &self.reserve1))
        } else if token_in == self.token1 {
            Some((&self.reserve1, &self.reserve0))
        } else {
            None
        }
    }

    /// Fee-adjusted constant-product forward price, floored to match
    /// on-chain integer settlement:
    /// `floor(amount_in * (D - fee) * reserve_out / (reserve_in * D + amount_in * (D - fee)))`.
    ///
    /// Empty pools price to zero so the candidate filter can drop them.
    pub fn get_amount_out(
        &self,
        amount_in: &BigUint,
        reserve_in: &BigUint,
        reserve_out: &BigUint,
    ) -> BigUint {
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return BigUint::zero();
        }

        let fee_denominator = BigUint::from(FEE_DENOMINATOR);
        let fee = BigUint::from(self.fee.min(FEE_DENOMINATOR));

        let amount_in_with_fee = amount_in * (&fee_denominator - &fee);
        let numerator = &amount_in_with_fee * reserve_out;
        let denominator = (reserve_in * &fee_denominator) + &amount_in_with_fee;

        if denominator.is_zero() {
            return BigUint::zero();
        }
        numerator / denominator
    }

    /// Algebraic inverse of `get_amount_out`: the minimal input that
    /// guarantees at least `amount_out`, rounded up. `None` means the pool
    /// cannot supply that amount (`amount_out >= reserve_out`); callers
    /// rank this as worse than any finite input, not as a failure.
    pub fn get_amount_in(
        &self,
        amount_out: &BigUint,
        reserve_in: &BigUint,
        reserve_out: &BigUint,
    ) -> Option<BigUint> {
        if amount_out >= reserve_out {
            return None;
        }

        let fee_denominator = BigUint::from(FEE_DENOMINATOR);
        let fee = BigUint::from(self.fee.min(FEE_DENOMINATOR));

        let numerator = amount_out * reserve_in * &fee_denominator;
        let denominator = (reserve_out - amount_out) * (&fee_denominator - &fee);
        if denominator.is_zero() {
            return None;
        }

        // Ceiling division: round the required input up.
        Some((&numerator + &denominator - BigUint::one()) / denominator)
    }
}
