pub mod chain_info;
pub mod config;
pub mod metrics;
pub mod task;
pub mod utils;

pub use chain_info::*;
pub use config::*;

/// Commit the binary was built from, empty when git was unavailable at build time.
pub fn commit_hash() -> &'static str {
    env!("GIT_HASH")
}
