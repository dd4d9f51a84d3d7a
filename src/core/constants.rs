/// Pool fees are expressed in parts per million of the input amount,
/// so a 0.3% fee is 3000.
pub const FEE_DENOMINATOR: u64 = 1_000_000;

/// Default bound on the number of hops in an enumerated path.
pub const DEFAULT_MAX_HOPS: usize = 4;

/// Fixed-point resolution of the Lagrange multiplier during bisection.
pub const PHI_SCALE: u64 = 1_000_000_000;

/// Bisection iterations for solving the multiplier. 64 halvings converge
/// well past integer settlement precision.
pub const BISECT_ITERATIONS: u32 = 64;

/// Cap on upper-bound doublings while bracketing the multiplier.
pub const BRACKET_DOUBLINGS: u32 = 256;

/// Basis-point scale used for price impact and route shares.
pub const BPS: u64 = 10_000;
