//! Configuration types and filter-value parsing
//!
//! The whole configuration is assembled once at startup from CLI input and
//! never mutated afterwards.

mod parser;
mod types;

pub use parser::{parse_size, parse_types};
pub use types::{
    Config, CrawlConfig, DedupConfig, FilterConfig, NamingConfig, OutputConfig,
};
