use super::constants::{BPS, FEE_DENOMINATOR};
use super::types::{pool_key, Allocation, PoolMap};
use num_bigint::BigUint;
use num_traits::Zero;

/// Display/validation annotations for one executed hop. Amounts stay in
/// integer base units; price impact is reported in basis points so no
/// floating point enters the pipeline.
#[derive(Clone, Debug)]
pub struct HopReport {
    pub pool_address: String,
    pub token_in: String,
    pub token_out: String,
    /// Fee taken by the pool, denominated in the hop's output token.
    pub fee_amount: BigUint,
    /// Hop output as a fraction of the output-side reserve, in basis points.
    pub price_impact_bps: BigUint,
}

/// Per-hop fee and price-impact figures for a finalized allocation.
/// Consumed by display and validation layers only; the allocation math
/// never reads these. Hops without a backing pool produce no entry.
pub fn hop_breakdown(allocation: &Allocation, pools: &PoolMap) -> Vec<HopReport> {
    let mut reports = Vec::new();
    for (i, pair) in allocation.path.tokens.windows(2).enumerate() {
        let Some(pool) = pools.get(&pool_key(&pair[0], &pair[1])) else {
            continue;
        };
        let Some((_, reserve_out)) = pool.reserves_oriented(&pair[0]) else {
            continue;
        };
        let Some(hop_out) = allocation.amounts.get(i + 1) else {
            continue;
        };

        let fee_amount = hop_out * pool.fee / FEE_DENOMINATOR;
        let price_impact_bps = if reserve_out.is_zero() {
            BigUint::zero()
        } else {
            hop_out * BPS / reserve_out
        };

        reports.push(HopReport {
            pool_address: pool.address.clone(),
            token_in: pair[0].clone(),
            token_out: pair[1].clone(),
            fee_amount,
            price_impact_bps,
        });
    }
    reports
}
