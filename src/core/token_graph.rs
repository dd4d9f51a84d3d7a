use super::types::{PoolMap, Snapshot, TradePath};
use std::collections::{HashMap, HashSet};

/// Undirected token graph: one edge per pool, both directions.
#[derive(Debug, Default)]
pub struct Graph {
    pub edges: HashMap<String, Vec<String>>,
}

impl Graph {
    pub fn from_pools(pools: &PoolMap) -> Self {
        let mut graph = Graph::default();
        for pool in pools.values() {
            graph.add_edge(&pool.token0, &pool.token1);
        }
        graph
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.edges
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
    }

    /// All simple paths from `start` to `end` with at most `max_hops` hops.
    /// Unreachable or unknown tokens yield an empty set, never an error.
    pub fn find_paths(&self, start: &str, end: &str, max_hops: usize) -> Vec<TradePath> {
        let mut paths = Vec::new();
        if max_hops == 0 || start == end {
            return paths;
        }
        let mut visited = HashSet::new();
        let mut current = Vec::new();
        self.dfs(start, end, max_hops, &mut visited, &mut current, &mut paths);
        paths
    }

    fn dfs(
        &self,
        current_token: &str,
        end: &str,
        max_hops: usize,
        visited: &mut HashSet<String>,
        current: &mut Vec<String>,
        paths: &mut Vec<TradePath>,
    ) {
        visited.insert(current_token.to_string());
        current.push(current_token.to_string());

        if current_token == end {
            paths.push(TradePath {
                tokens: current.clone(),
            });
        } else if current.len() <= max_hops {
            // One more hop still fits under the bound.
            if let Some(neighbors) = self.edges.get(current_token) {
                for neighbor in neighbors {
                    if !visited.contains(neighbor) {
                        self.dfs(neighbor, end, max_hops, visited, current, paths);
                    }
                }
            }
        }

        visited.remove(current_token);
        current.pop();
    }
}

/// Caller-owned memo of enumerated paths, keyed by snapshot version and
/// token pair. Replaces the hidden process-wide graph cache of earlier
/// designs: the owner decides sharing and lifetime.
#[derive(Debug)]
pub struct PathCache {
    max_hops: usize,
    entries: HashMap<(u64, String, String), Vec<TradePath>>,
}

impl PathCache {
    pub fn new(max_hops: usize) -> Self {
        Self {
            max_hops,
            entries: HashMap::new(),
        }
    }

    /// Enumerated paths for the pair under this snapshot, computed on first
    /// use. Entries from older snapshot versions are evicted on a miss.
    pub fn paths_between(
        &mut self,
        snapshot: &Snapshot,
        token_in: &str,
        token_out: &str,
    ) -> Vec<TradePath> {
        let key = (
            snapshot.version,
            token_in.to_string(),
            token_out.to_string(),
        );
        if let Some(paths) = self.entries.get(&key) {
            return paths.clone();
        }

        self.entries.retain(|(version, _, _), _| *version == snapshot.version);

        let graph = Graph::from_pools(&snapshot.pools);
        let paths = graph.find_paths(token_in, token_out, self.max_hops);
        tracing::debug!(
            token_in,
            token_out,
            version = snapshot.version,
            count = paths.len(),
            "enumerated candidate paths"
        );
        self.entries.insert(key, paths.clone());
        paths
    }
}
