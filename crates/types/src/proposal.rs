use std::{collections::HashSet, time::Duration};

use alloy_consensus::TxEnvelope;
use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// Block proposed by a relay, constructed at ingress and consumed once by the proposal pipeline.
#[derive(Debug, Clone)]
pub struct ProposedBlockArgs {
    pub mev_relay: String,
    pub block_number: u64,
    pub prev_block_hash: B256,
    pub block_reward: U256,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub txs: Vec<TxEnvelope>,
    /// Hashes of transactions that must not be pruned when they revert.
    pub un_reverted: HashSet<B256>,
}

/// Result of simulating a proposed block, produced by the external execution engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedWork {
    pub gas_used: u64,
    pub profit: U256,
}

/// Envelope handed to the block-building pipeline once a proposal simulated successfully.
#[derive(Debug)]
pub struct ProposedBlock {
    pub args: ProposedBlockArgs,
    pub simulated_work: SimulatedWork,
    pub sim_duration: Duration,
}
