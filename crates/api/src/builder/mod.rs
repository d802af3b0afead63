use std::str::FromStr;

use alloy_primitives::{Address, B256};
use pbs_common::metrics::BidMetrics;
use pbs_proposer::{BidBackend, ChainReader};
use pbs_types::{decode_transactions, AcceptedBid, BidArgs, BlockHeader, TxEnvelope};
use tracing::debug;

use crate::error::BidError;

#[cfg(test)]
mod tests;

/// Entry point for signed builder bids.
pub struct BuilderApi<C, B> {
    chain: C,
    backend: B,
}

impl<C: ChainReader, B: BidBackend> BuilderApi<C, B> {
    pub fn new(chain: C, backend: B) -> Self {
        Self { chain, backend }
    }

    /// Validates `args` and forwards it to the bid backend. Checks run in order and the first
    /// failure is returned.
    pub async fn bid(&self, args: BidArgs) -> Result<(), BidError> {
        let result = self.process_bid(args).await;
        match &result {
            Ok(()) => BidMetrics::outcome("accepted"),
            Err(err) => {
                debug!(%err, "rejected bid");
                BidMetrics::outcome(err.label());
            }
        }
        result
    }

    async fn process_bid(&self, args: BidArgs) -> Result<(), BidError> {
        if !self.backend.builder_enabled() {
            return Err(BidError::BuilderDisabled);
        }

        let builder = check_basic(&args)?;

        let head = self.chain.current_block();
        let txs = check_block(&args, &head)?;

        check_signature(&args, builder)?;

        debug!(%builder, block_number = args.message.block, tx_count = txs.len(), "accepted bid");

        // non-negative after check_basic
        let bid = AcceptedBid {
            builder,
            block_number: head.number + 1,
            txs,
            gas_value: args.message.gas_value as u64,
            builder_fee_value: args.message.builder_fee_value as u64,
            gas_limit: args.message.gas_limit as u64,
        };
        Ok(self.backend.bid(bid).await?)
    }
}

fn check_basic(args: &BidArgs) -> Result<Address, BidError> {
    let message = &args.message;

    if message.block == 0 {
        return Err(BidError::MissingBlockNumber);
    }
    if message.parent_hash.is_empty() {
        return Err(BidError::MissingParentHash);
    }
    if message.gas_limit <= 0 {
        return Err(BidError::MissingGasLimit);
    }
    if message.gas_value <= 0 {
        return Err(BidError::MissingGasValue);
    }
    if message.builder_fee_value < 0 {
        return Err(BidError::InvalidBuilderFee);
    }
    if message.gas_value <= message.builder_fee_value {
        return Err(BidError::GasValueBelowFee);
    }
    if message.builder_address.is_empty() {
        return Err(BidError::MissingBuilderAddress);
    }

    Address::from_str(&message.builder_address).map_err(|_| BidError::InvalidBuilderAddress)
}

fn check_block(args: &BidArgs, head: &BlockHeader) -> Result<Vec<TxEnvelope>, BidError> {
    let message = &args.message;

    if u64::try_from(message.block).ok() != head.number.checked_add(1) {
        return Err(BidError::InvalidBlockHeight { bid: message.block, current: head.number });
    }

    match B256::from_str(&message.parent_hash) {
        Ok(parent_hash) if parent_hash == head.hash => {}
        _ => {
            return Err(BidError::InvalidParentHash {
                bid: message.parent_hash.clone(),
                current: head.hash,
            })
        }
    }

    Ok(decode_transactions(&message.txs)?)
}

fn check_signature(args: &BidArgs, declared: Address) -> Result<(), BidError> {
    let recovered = args.recover_signer()?;
    if recovered != declared {
        return Err(BidError::SignerMismatch { recovered, declared });
    }
    Ok(())
}
