//! Smart (parallel) router: splits a fixed input across pool-disjoint
//! routes by solving a closed-form capital allocation with a shared
//! Lagrange multiplier, then normalizes to an exact integer sum.
//!
//! Fixed-output requests do not split; they fall through to the backward
//! single-route walk.

use super::constants::{BISECT_ITERATIONS, BRACKET_DOUBLINGS, FEE_DENOMINATOR, PHI_SCALE};
use super::path::{best_single_route, settle_route};
use super::types::{pool_key, Direction, PoolMap, RoutingResult, TradePath};
use crate::error::RouterError;
use num_bigint::BigUint;
use num_traits::{CheckedSub, One, Zero};
use std::collections::{HashSet, VecDeque};

/// A surviving path together with its single-route quote: the output it
/// would produce if the whole amount went through it alone.
struct RouteCandidate {
    path: TradePath,
    pool_addresses: Vec<String>,
    quote: BigUint,
}

/// Integer parameterization of one route's marginal-output curve
/// `dOut/dx = alpha / (beta + epsilon*x)^2`, all three scalars pre-scaled
/// by `FEE_DENOMINATOR^n` (an invariance of the allocation expression), so
/// the solve never leaves integer arithmetic.
struct RouteCurve {
    sqrt_alpha: BigUint,
    beta: BigUint,
    epsilon: BigUint,
}

/// Splits `amount_in` across disjoint routes, maximizing total output.
pub fn optimize_amount_out(
    paths: &[TradePath],
    pools: &PoolMap,
    amount_in: &BigUint,
) -> Result<RoutingResult, RouterError> {
    if amount_in.is_zero() {
        return Err(RouterError::InvalidInput(
            "swap amount must be positive".to_string(),
        ));
    }
    if paths.is_empty() {
        return Err(RouterError::RouteNotFound);
    }

    // Shorter routes first: deterministic order, and first-seen tie-breaks
    // favor fewer hops.
    let mut sorted_paths = paths.to_vec();
    sorted_paths.sort_by_key(|p| p.tokens.len());

    // Step A: quote each path with the full amount, drop dead ones.
    let candidates: Vec<RouteCandidate> = sorted_paths
        .iter()
        .filter(|p| p.tokens.len() >= 2)
        .filter_map(|p| {
            let quote = p.get_amount_out(amount_in, pools);
            if quote.is_zero() {
                return None;
            }
            Some(RouteCandidate {
                pool_addresses: p.pool_addresses(pools),
                path: p.clone(),
                quote,
            })
        })
        .collect();
    if candidates.is_empty() {
        return Err(RouterError::AllRoutesZero);
    }

    let mut best_quote_index = 0;
    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        if candidate.quote > candidates[best_quote_index].quote {
            best_quote_index = i;
        }
    }
    let best_fallback = candidates[best_quote_index].path.clone();

    // Step B: routes sharing a pool cannot run against independent
    // reserves, so keep only the best route of each conflict component.
    let chosen = select_disjoint(candidates);

    // Step C: nothing to split.
    if chosen.len() == 1 {
        let allocation = settle_route(&chosen[0].path, pools, amount_in);
        let total = allocation.amount_out.clone();
        return Ok(RoutingResult {
            allocations: vec![allocation],
            total,
        });
    }

    // Step D: solve the shared multiplier over routes that have a usable
    // curve, pruning routes the optimum leaves unfunded.
    let curves: Vec<Option<RouteCurve>> = chosen
        .iter()
        .map(|c| route_curve(&c.path, pools))
        .collect();
    let mut active: Vec<usize> = (0..chosen.len())
        .filter(|&i| curves[i].is_some())
        .collect();

    let mut raw: Vec<BigUint> = Vec::new();
    while !active.is_empty() {
        let active_curves: Vec<&RouteCurve> = active
            .iter()
            .map(|&i| curves[i].as_ref().unwrap())
            .collect();
        let phi = solve_phi(&active_curves, amount_in);
        raw = active_curves
            .iter()
            .map(|curve| curve.allocation_at(&phi))
            .collect();

        let keep: Vec<usize> = active
            .iter()
            .zip(raw.iter())
            .filter(|(_, x)| !x.is_zero())
            .map(|(&i, _)| i)
            .collect();
        if keep.len() == active.len() || keep.len() <= 1 {
            if keep.len() == 1 {
                active = keep;
            }
            break;
        }
        tracing::debug!(
            pruned = active.len() - keep.len(),
            remaining = keep.len(),
            "re-solving multiplier after pruning unfunded routes"
        );
        active = keep;
        raw.clear();
    }

    let raw_sum: BigUint = raw.iter().sum();
    if active.len() <= 1 || raw_sum.is_zero() {
        // Degenerate numerics: put everything on the best standalone route.
        let path = if active.len() == 1 {
            &chosen[active[0]].path
        } else {
            &best_fallback
        };
        let allocation = settle_route(path, pools, amount_in);
        let total = allocation.amount_out.clone();
        return Ok(RoutingResult {
            allocations: vec![allocation],
            total,
        });
    }

    // Step E: rescale to the requested total; the last funded route takes
    // the exact remainder so nothing is lost to rounding.
    let raw = {
        // Keep only routes whose allocation survives flooring.
        let mut scaled: Vec<(usize, BigUint)> = Vec::with_capacity(active.len());
        for (&i, x) in active.iter().zip(raw.iter()) {
            let share = x * amount_in / &raw_sum;
            if !share.is_zero() {
                scaled.push((i, share));
            }
        }
        scaled
    };
    if raw.is_empty() {
        let allocation = settle_route(&best_fallback, pools, amount_in);
        let total = allocation.amount_out.clone();
        return Ok(RoutingResult {
            allocations: vec![allocation],
            total,
        });
    }

    let mut inputs: Vec<(usize, BigUint)> = Vec::with_capacity(raw.len());
    let mut allocated = BigUint::zero();
    for (slot, (i, share)) in raw.iter().enumerate() {
        if slot + 1 == raw.len() {
            let remainder = amount_in.checked_sub(&allocated).ok_or_else(|| {
                RouterError::InternalInvariant(format!(
                    "allocated {} exceeds requested {}",
                    allocated, amount_in
                ))
            })?;
            inputs.push((*i, remainder));
        } else {
            allocated += share;
            inputs.push((*i, share.clone()));
        }
    }

    // Step F: settle each funded route independently against the original
    // snapshot. Routes are pool-disjoint, so reserves never interact.
    let mut allocations = Vec::with_capacity(inputs.len());
    let mut total = BigUint::zero();
    let mut input_check = BigUint::zero();
    for (i, amount) in inputs {
        if amount.is_zero() {
            continue;
        }
        input_check += &amount;
        let allocation = settle_route(&chosen[i].path, pools, &amount);
        total += &allocation.amount_out;
        allocations.push(allocation);
    }
    if &input_check != amount_in {
        return Err(RouterError::InternalInvariant(format!(
            "allocation sum {} != requested {}",
            input_check, amount_in
        )));
    }

    tracing::info!(
        routes = allocations.len(),
        %total,
        "parallel allocation settled"
    );
    Ok(RoutingResult { allocations, total })
}

/// Fixed-output routing. Splitting the output side across routes is out of
/// scope: the whole amount goes to the path needing the least input.
pub fn optimize_amount_in(
    paths: &[TradePath],
    pools: &PoolMap,
    amount_out: &BigUint,
) -> Result<RoutingResult, RouterError> {
    if amount_out.is_zero() {
        return Err(RouterError::InvalidInput(
            "swap amount must be positive".to_string(),
        ));
    }
    let allocation = best_single_route(paths, pools, amount_out, Direction::FixedOutput)?;
    let total = allocation.amount_in.clone();
    Ok(RoutingResult {
        allocations: vec![allocation],
        total,
    })
}

/// Groups candidates into connected components of the "shares a pool"
/// graph and keeps the best-quoted candidate of each component. The
/// survivors are mutually pool-disjoint by construction.
fn select_disjoint(candidates: Vec<RouteCandidate>) -> Vec<RouteCandidate> {
    let n = candidates.len();
    let pool_sets: Vec<HashSet<&str>> = candidates
        .iter()
        .map(|c| c.pool_addresses.iter().map(String::as_str).collect())
        .collect();

    let mut component = vec![usize::MAX; n];
    let mut next_component = 0usize;
    for start in 0..n {
        if component[start] != usize::MAX {
            continue;
        }
        component[start] = next_component;
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            for j in 0..n {
                if component[j] == usize::MAX && !pool_sets[i].is_disjoint(&pool_sets[j]) {
                    component[j] = next_component;
                    queue.push_back(j);
                }
            }
        }
        next_component += 1;
    }

    let mut winner: Vec<Option<usize>> = vec![None; next_component];
    for (i, candidate) in candidates.iter().enumerate() {
        // Strict comparison keeps the first-seen candidate on ties.
        let replace = match winner[component[i]] {
            Some(w) => candidate.quote > candidates[w].quote,
            None => true,
        };
        if replace {
            winner[component[i]] = Some(i);
        }
    }

    let keep: HashSet<usize> = winner.into_iter().flatten().collect();
    candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, c)| c)
        .collect()
}

/// Derives the integer alpha/beta/epsilon scalars for a route of `n` hops:
///
/// ```text
/// alpha   = prod(a_i * b_i * g_i)            beta = prod(a_i)
/// epsilon = sum_i prod(b_j, j<i) * prod(a_j, j>i) * prod(g_j, j<=min(i+1, n-1))
/// ```
///
/// with `g_i = (D - fee_i)/D`. Multiplying alpha by `D^2n` and beta/epsilon
/// by `D^n` leaves `x(phi) = (phi*sqrt(alpha) - beta)/epsilon` unchanged and
/// clears every denominator. `None` when the route has no backed hops or a
/// degenerate curve (such a route cannot take part in the parallel solve).
fn route_curve(path: &TradePath, pools: &PoolMap) -> Option<RouteCurve> {
    struct Hop {
        reserve_in: BigUint,
        reserve_out: BigUint,
        one_minus_fee: BigUint,
    }

    let mut hops = Vec::new();
    for pair in path.tokens.windows(2) {
        // Unbacked hops are skipped here exactly as in the walks.
        let Some(pool) = pools.get(&pool_key(&pair[0], &pair[1])) else {
            continue;
        };
        let (reserve_in, reserve_out) = pool.reserves_oriented(&pair[0])?;
        hops.push(Hop {
            reserve_in: reserve_in.clone(),
            reserve_out: reserve_out.clone(),
            one_minus_fee: BigUint::from(FEE_DENOMINATOR.saturating_sub(pool.fee)),
        });
    }
    if hops.is_empty() {
        return None;
    }

    let n = hops.len();
    let d = BigUint::from(FEE_DENOMINATOR);
    let d_pow_n = d.pow(n as u32);

    let mut alpha = d_pow_n.clone();
    let mut beta = d_pow_n.clone();
    for hop in &hops {
        alpha *= &hop.reserve_in * &hop.reserve_out * &hop.one_minus_fee;
        beta *= &hop.reserve_in;
    }

    let mut epsilon = BigUint::zero();
    for i in 0..n {
        let mut term = BigUint::one();
        for hop in &hops[..i] {
            term *= &hop.reserve_out;
        }
        for hop in &hops[i + 1..] {
            term *= &hop.reserve_in;
        }
        let fee_terms = (i + 1).min(n - 1);
        for hop in &hops[..=fee_terms] {
            term *= &hop.one_minus_fee;
        }
        // Bring the term to the common D^n scale.
        term *= d.pow((n - 1 - fee_terms) as u32);
        epsilon += term;
    }

    if alpha.is_zero() || epsilon.is_zero() {
        return None;
    }
    Some(RouteCurve {
        sqrt_alpha: alpha.sqrt(),
        beta,
        epsilon,
    })
}

impl RouteCurve {
    /// Raw capital assigned to this route at multiplier `phi` (fixed-point,
    /// `PHI_SCALE` = one): `max(0, (phi*sqrt_alpha - beta)/epsilon)` floored.
    fn allocation_at(&self, phi: &BigUint) -> BigUint {
        let scale = BigUint::from(PHI_SCALE);
        let gain = phi * &self.sqrt_alpha;
        let cost = &scale * &self.beta;
        match gain.checked_sub(&cost) {
            Some(surplus) => surplus / (&scale * &self.epsilon),
            None => BigUint::zero(),
        }
    }
}

fn total_allocation(curves: &[&RouteCurve], phi: &BigUint) -> BigUint {
    curves.iter().map(|c| c.allocation_at(phi)).sum()
}

/// Monotonic bisection for the multiplier phi such that the summed raw
/// allocations meet the requested total. The sum is non-decreasing in phi,
/// so bracket by doubling, then halve.
fn solve_phi(curves: &[&RouteCurve], total: &BigUint) -> BigUint {
    let mut hi = BigUint::from(PHI_SCALE);
    let mut doublings = 0;
    while total_allocation(curves, &hi) < *total {
        hi = &hi * 2u32;
        doublings += 1;
        if doublings >= BRACKET_DOUBLINGS {
            break;
        }
    }

    let mut lo = BigUint::zero();
    for _ in 0..BISECT_ITERATIONS {
        if &hi - &lo <= BigUint::one() {
            break;
        }
        let mid = (&lo + &hi) / 2u32;
        if total_allocation(curves, &mid) < *total {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    // hi is the smallest probed phi meeting the total.
    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Pool;
    use std::collections::HashMap;

    fn pool(address: &str, a: &str, b: &str, ra: u64, rb: u64) -> ((String, String), Pool) {
        let p = Pool {
            address: address.to_string(),
            token0: a.to_string(),
            token1: b.to_string(),
            reserve0: BigUint::from(ra),
            reserve1: BigUint::from(rb),
            fee: 3000,
        };
        (pool_key(a, b), p)
    }

    fn path(tokens: &[&str]) -> TradePath {
        TradePath {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn single_hop_curve_matches_hand_derivation() {
        let pools: PoolMap = HashMap::from([pool("p", "A", "B", 400, 900)]);
        let curve = route_curve(&path(&["A", "B"]), &pools).unwrap();
        let d = FEE_DENOMINATOR;
        // alpha = D * a*b*(D-f); beta = D*a; epsilon = (D-f)
        let alpha = BigUint::from(d) * 400u64 * 900u64 * (d - 3000);
        assert_eq!(curve.sqrt_alpha, alpha.sqrt());
        assert_eq!(curve.beta, BigUint::from(d) * 400u64);
        assert_eq!(curve.epsilon, BigUint::from(d - 3000));
    }

    #[test]
    fn conflict_components_keep_best_quote_only() {
        let candidates = vec![
            RouteCandidate {
                path: path(&["A", "B"]),
                pool_addresses: vec!["p1".into()],
                quote: BigUint::from(50u32),
            },
            RouteCandidate {
                path: path(&["A", "C", "B"]),
                pool_addresses: vec!["p2".into(), "p1".into()],
                quote: BigUint::from(80u32),
            },
            RouteCandidate {
                path: path(&["A", "D", "B"]),
                pool_addresses: vec!["p3".into(), "p4".into()],
                quote: BigUint::from(10u32),
            },
        ];
        let chosen = select_disjoint(candidates);
        assert_eq!(chosen.len(), 2);
        // p1 is shared: the 80-quote route wins its component.
        assert_eq!(chosen[0].quote, BigUint::from(80u32));
        assert_eq!(chosen[1].quote, BigUint::from(10u32));
    }

    #[test]
    fn equal_routes_split_evenly() {
        let pools: PoolMap = HashMap::from([
            pool("p1", "A", "B", 1_000_000, 1_000_000),
            pool("p2", "A", "C", 1_000_000, 1_000_000),
            pool("p3", "C", "B", 1_000_000, 1_000_000),
        ]);
        let paths = [path(&["A", "B"]), path(&["A", "C", "B"])];
        let amount = BigUint::from(100_000u32);
        let result = optimize_amount_out(&paths, &pools, &amount).unwrap();

        assert_eq!(result.allocations.len(), 2);
        let sum: BigUint = result.allocations.iter().map(|a| a.amount_in.clone()).sum();
        assert_eq!(sum, amount);
        // The direct route has the flatter curve, so it takes the larger share.
        assert!(result.allocations[0].amount_in > result.allocations[1].amount_in);
    }

    #[test]
    fn zero_amount_is_invalid_input() {
        let pools: PoolMap = HashMap::from([pool("p1", "A", "B", 1_000_000, 1_000_000)]);
        let err = optimize_amount_out(&[path(&["A", "B"])], &pools, &BigUint::zero()).unwrap_err();
        assert!(matches!(err, RouterError::InvalidInput(_)));
    }

    #[test]
    fn all_dead_candidates_is_all_routes_zero() {
        let pools: PoolMap = HashMap::from([pool("p1", "A", "B", 0, 0)]);
        let err =
            optimize_amount_out(&[path(&["A", "B"])], &pools, &BigUint::from(100u32)).unwrap_err();
        assert!(matches!(err, RouterError::AllRoutesZero));
    }

    #[test]
    fn fixed_output_returns_single_allocation() {
        let pools: PoolMap = HashMap::from([
            pool("p1", "A", "B", 10_000_000, 10_000_000),
            pool("p2", "A", "C", 100_000, 100_000),
            pool("p3", "C", "B", 100_000, 100_000),
        ]);
        let paths = [path(&["A", "B"]), path(&["A", "C", "B"])];
        let result =
            optimize_amount_in(&paths, &pools, &BigUint::from(50_000u32)).unwrap();
        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.total, result.allocations[0].amount_in);
        assert_eq!(result.allocations[0].amount_out, BigUint::from(50_000u32));
    }

    #[test]
    fn tiny_trades_collapse_to_one_route() {
        // A 10-unit trade cannot meaningfully split; it must still conserve.
        let pools: PoolMap = HashMap::from([
            pool("p1", "A", "B", 1_000_000, 1_000_000),
            pool("p2", "A", "C", 900_000, 900_000),
            pool("p3", "C", "B", 900_000, 900_000),
        ]);
        let paths = [path(&["A", "B"]), path(&["A", "C", "B"])];
        let amount = BigUint::from(10u32);
        let result = optimize_amount_out(&paths, &pools, &amount).unwrap();
        let sum: BigUint = result.allocations.iter().map(|a| a.amount_in.clone()).sum();
        assert_eq!(sum, amount);
        for allocation in &result.allocations {
            assert!(!allocation.amount_in.is_zero());
        }
    }
}
