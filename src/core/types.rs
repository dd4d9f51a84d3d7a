use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token pair ordered lexicographically, used to key the pool map.
pub type PoolKey = (String, String);
pub type PoolMap = HashMap<PoolKey, Pool>;

pub fn pool_key(a: &str, b: &str) -> PoolKey {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub decimals: u32,
}

/// One constant-product pool at a fixed reserve snapshot. `reserve0`
/// belongs to `token0`, `reserve1` to `token1`. `fee` is in parts per
/// million of the input amount and must be below `FEE_DENOMINATOR`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    pub token0: String,
    pub token1: String,
    pub reserve0: BigUint,
    pub reserve1: BigUint,
    pub fee: u64,
}

/// Immutable view of all pools and tokens at one point in time. `version`
/// changes whenever reserves are refreshed and keys the external path cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub tokens: HashMap<String, Token>,
    pub pools: PoolMap,
}

impl Snapshot {
    pub fn new(version: u64, tokens: Vec<Token>, pools: Vec<Pool>) -> Self {
        let tokens = tokens
            .into_iter()
            .map(|t| (t.address.clone(), t))
            .collect();
        let pools = pools
            .into_iter()
            .map(|p| (pool_key(&p.token0, &p.token1), p))
            .collect();
        Self {
            version,
            tokens,
            pools,
        }
    }
}

/// Ordered token sequence, e.g. ["A", "B", "C"] for the route A->B->C.
/// Always a simple path: no token repeats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradePath {
    pub tokens: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    FixedInput,
    FixedOutput,
}

/// Final allocation of capital to one route. `amounts` is the full
/// intermediary sequence, one entry per path token: `amounts[0]` is the
/// input, the last entry the output.
#[derive(Clone, Debug)]
pub struct Allocation {
    pub path: TradePath,
    pub pool_addresses: Vec<String>,
    pub amount_in: BigUint,
    pub amount_out: BigUint,
    pub amounts: Vec<BigUint>,
}

/// Result of one routing computation. In fixed-input mode `total` is the
/// aggregate output across allocations; in fixed-output mode it is the
/// aggregate input. Allocations never share a pool address.
#[derive(Clone, Debug)]
pub struct RoutingResult {
    pub allocations: Vec<Allocation>,
    pub total: BigUint,
}
