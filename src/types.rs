use serde::{Deserialize, Serialize};

/// Swap request as received from the embedding service. Exactly one of
/// `sell_amount` (fixed input) and `buy_amount` (fixed output) must be
/// present; amounts travel as decimal strings because token base units
/// routinely exceed what a JSON number can carry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub sell_token_address: String,
    pub buy_token_address: String,
    pub sell_amount: Option<String>,
    pub buy_amount: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub sell_token_address: String,
    pub buy_token_address: String,
    pub sell_amount: String,
    pub buy_amount: String,
    pub chain_id: String,
    pub snapshot_version: u64,
    pub routes: Vec<RouteQuote>,
}

/// One funded route of the final split.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuote {
    /// Share of the total input routed through this path, in basis points.
    pub share_bps: u64,
    pub tokens: Vec<String>,
    pub pool_addresses: Vec<String>,
    pub amount_in: String,
    pub amount_out: String,
    /// Full per-token amount sequence along the path, input first.
    pub intermediary_amounts: Vec<String>,
    pub hops: Vec<HopQuote>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HopQuote {
    pub pool_address: String,
    pub token_in: String,
    pub token_out: String,
    pub fee_amount: String,
    pub price_impact_bps: String,
}

/// Router configuration, loaded from a TOML file via confy or built in
/// code. An empty `supported_tokens` list means every snapshot token is
/// accepted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouterConfig {
    pub chain_id: String,
    pub max_hops: usize,
    pub supported_tokens: Vec<String>,
}
