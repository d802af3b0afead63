use std::sync::atomic::{AtomicU64, Ordering};

/// Minimum the gas limit may ever be.
pub const MIN_GAS_LIMIT: u64 = 5000;

/// Bound divisor of the gas limit, used in update calculations. BSC uses 256, Ethereum 1024.
pub const DEFAULT_GAS_LIMIT_BOUND_DIVISOR: u64 = 256;

/// Computes the gas limit of the next block after `parent_gas_limit`. Moves towards
/// `desired_limit` by at most `parent_gas_limit / bound_divisor - 1` per block.
pub fn calc_gas_limit(parent_gas_limit: u64, desired_limit: u64, bound_divisor: u64) -> u64 {
    let delta = (parent_gas_limit / bound_divisor.max(1)).saturating_sub(1);
    let desired_limit = desired_limit.max(MIN_GAS_LIMIT);

    if parent_gas_limit < desired_limit {
        return parent_gas_limit.saturating_add(delta).min(desired_limit);
    }
    if parent_gas_limit > desired_limit {
        return parent_gas_limit.saturating_sub(delta).max(desired_limit);
    }
    parent_gas_limit
}

/// Gas limits published by the block-building pipeline. Single writer, many readers: values are
/// only ever loaded here, never locked.
#[derive(Debug, Default)]
pub struct GasLimits {
    current: AtomicU64,
    previous_block: AtomicU64,
}

impl GasLimits {
    pub fn new(current: u64, previous_block: u64) -> Self {
        Self { current: AtomicU64::new(current), previous_block: AtomicU64::new(previous_block) }
    }

    /// Gas limit of the block currently being built.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Gas limit of the current chain head.
    pub fn previous_block(&self) -> u64 {
        self.previous_block.load(Ordering::Acquire)
    }

    pub fn update(&self, current: u64, previous_block: u64) {
        self.previous_block.store(previous_block, Ordering::Release);
        self.current.store(current, Ordering::Release);
    }
}
