pub mod constants;
pub mod optimization;
pub mod path;
pub mod pool;
pub mod report;
pub mod token_graph;
pub mod types;
