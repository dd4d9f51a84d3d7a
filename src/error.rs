use thiserror::Error;

/// Failure taxonomy of the routing core. Everything surfaces synchronously
/// to the immediate caller; nothing is retried internally.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The request is malformed before any computation happens: zero
    /// amount, unknown or duplicate tokens, unparseable amount string.
    #[error("invalid swap request: {0}")]
    InvalidInput(String),

    /// No candidate path connects the pair within the hop bound, or no
    /// candidate yields a positive finite result.
    #[error("no viable route for the requested token pair")]
    RouteNotFound,

    /// Every enumerated path quoted zero output for the full amount.
    #[error("all candidate routes produced zero output")]
    AllRoutesZero,

    /// The exact-sum normalization broke its own invariant. This is a
    /// numerics bug, not a user-facing condition.
    #[error("allocation invariant violated: {0}")]
    InternalInvariant(String),
}
