use std::time::Duration;

/// Runtime config with all chain specific information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub name: String,
    /// Seconds between consecutive blocks
    pub period_secs: u64,
    /// Number of blocks per epoch, validators re-register at every epoch boundary
    pub epoch_length: u64,
    pub gas_limit_bound_divisor: u64,
}

impl ChainInfo {
    pub fn for_bsc() -> Self {
        Self {
            name: "bsc".to_string(),
            period_secs: 3,
            epoch_length: 200,
            gas_limit_bound_divisor: 256,
        }
    }

    pub fn for_chapel() -> Self {
        Self {
            name: "chapel".to_string(),
            period_secs: 3,
            epoch_length: 200,
            gas_limit_bound_divisor: 256,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for ChainInfo {
    fn default() -> Self {
        Self::for_bsc()
    }
}
