use crate::core::constants::DEFAULT_MAX_HOPS;
use crate::types::RouterConfig;
use std::path::PathBuf;

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            chain_id: "SN_MAIN".to_string(),
            max_hops: DEFAULT_MAX_HOPS,
            supported_tokens: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Loads configuration from a specific TOML file, creating it with
    /// defaults when absent.
    pub fn load_from(path: PathBuf) -> anyhow::Result<Self> {
        let config: Self = confy::load_path(path)?;
        Ok(config)
    }
}
