use async_trait::async_trait;
use pbs_types::{AcceptedBid, BlockHeader, ProposedBlockArgs, SimulatedWork};

use crate::error::{BidBackendError, BlockSimError};

/// Read access to the current chain head.
#[auto_impl::auto_impl(Arc)]
pub trait ChainReader: Send + Sync {
    fn current_block(&self) -> BlockHeader;
}

#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait ProposedBlockSimulator: Send + Sync {
    /// Simulates a proposed block on top of the current head. `Ok(None)` means the block was
    /// deliberately skipped, eg because it is not competitive.
    async fn simulate(
        &self,
        args: &ProposedBlockArgs,
    ) -> Result<Option<SimulatedWork>, BlockSimError>;
}

#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait BidBackend: Send + Sync {
    fn builder_enabled(&self) -> bool;

    async fn bid(&self, bid: AcceptedBid) -> Result<(), BidBackendError>;
}
