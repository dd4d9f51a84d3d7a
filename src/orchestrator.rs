//! Request validation and quote assembly around the routing core. This is
//! the seam the embedding transport layer (HTTP, GraphQL, whatever) calls
//! into; everything below it is pure computation over the snapshot.

use crate::core::constants::BPS;
use crate::core::optimization::{optimize_amount_in, optimize_amount_out};
use crate::core::report::hop_breakdown;
use crate::core::token_graph::PathCache;
use crate::core::types::{RoutingResult, Snapshot};
use crate::error::RouterError;
use crate::types::{HopQuote, QuoteRequest, QuoteResponse, RouteQuote, RouterConfig};
use anyhow::{Context, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use std::str::FromStr;

pub fn validate_request(
    config: &RouterConfig,
    snapshot: &Snapshot,
    request: &QuoteRequest,
) -> Result<(), RouterError> {
    let sell = request.sell_token_address.trim();
    let buy = request.buy_token_address.trim();
    if sell.is_empty() || buy.is_empty() {
        return Err(RouterError::InvalidInput(
            "buy and sell token addresses cannot be empty".to_string(),
        ));
    }
    if sell == buy {
        return Err(RouterError::InvalidInput(
            "buy and sell token must differ".to_string(),
        ));
    }
    for token in [sell, buy] {
        if !snapshot.tokens.contains_key(token) {
            return Err(RouterError::InvalidInput(format!(
                "unknown token address {token}"
            )));
        }
        if !config.supported_tokens.is_empty()
            && !config.supported_tokens.iter().any(|t| t == token)
        {
            return Err(RouterError::InvalidInput(format!(
                "unsupported token address {token}"
            )));
        }
    }
    match (&request.sell_amount, &request.buy_amount) {
        (None, None) => Err(RouterError::InvalidInput(
            "either sellAmount or buyAmount is mandatory".to_string(),
        )),
        (Some(_), Some(_)) => Err(RouterError::InvalidInput(
            "provide only one of sellAmount and buyAmount".to_string(),
        )),
        _ => Ok(()),
    }
}

fn parse_amount(raw: &str) -> Result<BigUint, RouterError> {
    let amount = BigUint::from_str(raw.trim())
        .map_err(|_| RouterError::InvalidInput(format!("invalid amount {raw:?}")))?;
    if amount.is_zero() {
        return Err(RouterError::InvalidInput(
            "swap amount must be positive".to_string(),
        ));
    }
    Ok(amount)
}

/// Computes a routed quote for the request against the given snapshot.
/// The path cache is owned by the caller and reused across requests that
/// share a snapshot version.
pub fn get_router_quote(
    config: &RouterConfig,
    snapshot: &Snapshot,
    cache: &mut PathCache,
    request: &QuoteRequest,
) -> Result<QuoteResponse> {
    validate_request(config, snapshot, request)?;

    let sell = request.sell_token_address.trim().to_string();
    let buy = request.buy_token_address.trim().to_string();

    let paths = cache.paths_between(snapshot, &sell, &buy);
    if paths.is_empty() {
        return Err(RouterError::RouteNotFound)
            .with_context(|| format!("no path from {sell} to {buy} within {} hops", config.max_hops));
    }

    let (result, sell_amount, buy_amount) = if let Some(raw) = &request.sell_amount {
        let amount_in = parse_amount(raw)?;
        let result = optimize_amount_out(&paths, &snapshot.pools, &amount_in)
            .with_context(|| format!("routing {amount_in} {sell} into {buy}"))?;
        let total_out = result.total.to_string();
        (result, amount_in.to_string(), total_out)
    } else {
        // Validation guarantees buy_amount is present here.
        let raw = request.buy_amount.as_deref().unwrap_or_default();
        let amount_out = parse_amount(raw)?;
        let result = optimize_amount_in(&paths, &snapshot.pools, &amount_out)
            .with_context(|| format!("routing {sell} into {amount_out} {buy}"))?;
        let total_in = result.total.to_string();
        (result, total_in, amount_out.to_string())
    };

    tracing::info!(
        %sell,
        %buy,
        routes = result.allocations.len(),
        total = %result.total,
        "quote computed"
    );

    Ok(QuoteResponse {
        sell_token_address: sell,
        buy_token_address: buy,
        sell_amount,
        buy_amount,
        chain_id: config.chain_id.clone(),
        snapshot_version: snapshot.version,
        routes: build_routes(&result, snapshot),
    })
}

fn build_routes(result: &RoutingResult, snapshot: &Snapshot) -> Vec<RouteQuote> {
    let total_in: BigUint = result
        .allocations
        .iter()
        .map(|a| a.amount_in.clone())
        .sum();

    result
        .allocations
        .iter()
        .map(|allocation| {
            let share_bps = if total_in.is_zero() {
                0
            } else {
                let bps = &allocation.amount_in * BPS / &total_in;
                // Fits by construction: amount_in <= total_in.
                bps.try_into().unwrap_or(BPS)
            };
            let hops = hop_breakdown(allocation, &snapshot.pools)
                .into_iter()
                .map(|hop| HopQuote {
                    pool_address: hop.pool_address,
                    token_in: hop.token_in,
                    token_out: hop.token_out,
                    fee_amount: hop.fee_amount.to_string(),
                    price_impact_bps: hop.price_impact_bps.to_string(),
                })
                .collect();
            RouteQuote {
                share_bps,
                tokens: allocation.path.tokens.clone(),
                pool_addresses: allocation.pool_addresses.clone(),
                amount_in: allocation.amount_in.to_string(),
                amount_out: allocation.amount_out.to_string(),
                intermediary_amounts: allocation.amounts.iter().map(|a| a.to_string()).collect(),
                hops,
            }
        })
        .collect()
}
