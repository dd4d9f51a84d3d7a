use super::types::{pool_key, Allocation, Direction, PoolMap, TradePath};
use crate::error::RouterError;
use num_bigint::BigUint;
use num_traits::Zero;

impl TradePath {
    /// Forward walk: pushes `amount_in` through every hop in order against
    /// the given (unmodified) snapshot and returns the full intermediary
    /// sequence, one amount per path token.
    ///
    /// A hop with no backing pool in the snapshot is skipped and the amount
    /// carried through unchanged. This mirrors how stale path data has
    /// always been handled here; see DESIGN.md before changing it.
    pub fn amounts_out(&self, amount_in: &BigUint, pools: &PoolMap) -> Vec<BigUint> {
        let mut amounts = Vec::with_capacity(self.tokens.len());
        amounts.push(amount_in.clone());
        let mut current = amount_in.clone();

        for pair in self.tokens.windows(2) {
            if let Some(pool) = pools.get(&pool_key(&pair[0], &pair[1])) {
                if let Some((reserve_in, reserve_out)) = pool.reserves_oriented(&pair[0]) {
                    current = pool.get_amount_out(&current, reserve_in, reserve_out);
                }
            }
            amounts.push(current.clone());
        }
        amounts
    }

    pub fn get_amount_out(&self, amount_in: &BigUint, pools: &PoolMap) -> BigUint {
        self.amounts_out(amount_in, pools)
            .last()
            .cloned()
            .unwrap_or_default()
    }

    /// Backward walk: starting from the desired `amount_out`, derives the
    /// required input hop by hop in reverse. `None` means some hop cannot
    /// supply its output (infinite input required), which propagates for
    /// the rest of the path. Missing pools are skipped as in `amounts_out`.
    pub fn amounts_in(&self, amount_out: &BigUint, pools: &PoolMap) -> Option<Vec<BigUint>> {
        let mut amounts = Vec::with_capacity(self.tokens.len());
        amounts.push(amount_out.clone());
        let mut current = amount_out.clone();

        for pair in self.tokens.windows(2).rev() {
            if let Some(pool) = pools.get(&pool_key(&pair[0], &pair[1])) {
                if let Some((reserve_in, reserve_out)) = pool.reserves_oriented(&pair[0]) {
                    current = pool.get_amount_in(&current, reserve_in, reserve_out)?;
                }
            }
            amounts.push(current.clone());
        }
        amounts.reverse();
        Some(amounts)
    }

    /// Pool addresses backing this path, in hop order. Hops without a pool
    /// in the snapshot contribute nothing.
    pub fn pool_addresses(&self, pools: &PoolMap) -> Vec<String> {
        self.tokens
            .windows(2)
            .filter_map(|pair| {
                pools
                    .get(&pool_key(&pair[0], &pair[1]))
                    .map(|pool| pool.address.clone())
            })
            .collect()
    }
}

fn allocation_from_amounts(path: &TradePath, pools: &PoolMap, amounts: Vec<BigUint>) -> Allocation {
    Allocation {
        pool_addresses: path.pool_addresses(pools),
        amount_in: amounts.first().cloned().unwrap_or_default(),
        amount_out: amounts.last().cloned().unwrap_or_default(),
        amounts,
        path: path.clone(),
    }
}

/// Routes the entire amount through a single path. Pure function of the
/// snapshot: every candidate is evaluated independently.
pub fn settle_route(path: &TradePath, pools: &PoolMap, amount_in: &BigUint) -> Allocation {
    allocation_from_amounts(path, pools, path.amounts_out(amount_in, pools))
}

/// Single-route compute: evaluates every candidate path with the whole
/// amount and picks the best one, maximizing output for fixed input and
/// minimizing required input for fixed output. Ties keep the first path.
pub fn best_single_route(
    paths: &[TradePath],
    pools: &PoolMap,
    amount: &BigUint,
    direction: Direction,
) -> Result<Allocation, RouterError> {
    let mut best: Option<Allocation> = None;

    for path in paths {
        if path.tokens.len() < 2 {
            continue;
        }
        let candidate = match direction {
            Direction::FixedInput => {
                let allocation = settle_route(path, pools, amount);
                if allocation.amount_out.is_zero() {
                    continue;
                }
                allocation
            }
            Direction::FixedOutput => {
                let Some(amounts) = path.amounts_in(amount, pools) else {
                    continue;
                };
                let allocation = allocation_from_amounts(path, pools, amounts);
                if allocation.amount_in.is_zero() {
                    continue;
                }
                allocation
            }
        };

        let better = match (&best, direction) {
            (None, _) => true,
            (Some(current), Direction::FixedInput) => candidate.amount_out > current.amount_out,
            (Some(current), Direction::FixedOutput) => candidate.amount_in < current.amount_in,
        };
        if better {
            best = Some(candidate);
        }
    }

    best.ok_or(RouterError::RouteNotFound)
}
