//! Smart order router for constant-product AMM pools.
//!
//! Given an immutable pool snapshot and a token pair, the crate enumerates
//! candidate multi-hop paths, prices them with exact integer arithmetic,
//! and either routes the whole amount through the best single path or
//! splits a fixed input across pool-disjoint paths via a closed-form
//! Lagrange allocation. Fetching pool state, caching snapshots, and
//! executing trades are the embedding service's concern.

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod types;

pub use error::RouterError;
