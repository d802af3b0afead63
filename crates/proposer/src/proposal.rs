use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use pbs_common::{metrics::ProposalMetrics, utils::format_timestamp, ChainInfo, ProposerConfig};
use pbs_types::{calc_gas_limit, GasLimits, ProposedBlock, ProposedBlockArgs};
use tokio::{
    sync::mpsc,
    time::{timeout_at, Instant},
};
use tracing::{debug, warn};

use crate::{
    error::{BlockSimError, ProposalError},
    traits::{ChainReader, ProposedBlockSimulator},
};

/// Creates the single slot channel proposed blocks are handed to the block-building pipeline on.
pub fn proposed_block_channel() -> (mpsc::Sender<ProposedBlock>, mpsc::Receiver<ProposedBlock>) {
    mpsc::channel(1)
}

#[derive(Debug, Clone)]
pub struct ProposalConfig {
    /// Block period of the chain
    pub period: Duration,
    /// Reserved at the end of the proposing window to finalize the block
    pub delay_left_over: Duration,
    pub gas_ceil: u64,
    pub gas_limit_bound_divisor: u64,
}

impl ProposalConfig {
    pub fn new(chain_info: &ChainInfo, proposer: &ProposerConfig) -> Self {
        Self {
            period: chain_info.period(),
            delay_left_over: proposer.delay_left_over(),
            gas_ceil: proposer.gas_ceil,
            gas_limit_bound_divisor: chain_info.gas_limit_bound_divisor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOutcome {
    /// Simulated and handed to the block-building pipeline
    Accepted { sim_duration: Duration },
    /// The simulator chose not to use the block, this is not an error
    Skipped { sim_duration: Duration },
}

impl ProposalOutcome {
    pub fn sim_duration(&self) -> Duration {
        match self {
            ProposalOutcome::Accepted { sim_duration } |
            ProposalOutcome::Skipped { sim_duration } => *sim_duration,
        }
    }
}

#[derive(Debug, Default)]
struct ProposalTrace {
    current_gas_limit: u64,
    is_block_skipped: bool,
    sim_duration: Duration,
}

/// Deadline-bounded path from a relay's proposed block to the block-building pipeline.
///
/// Each proposal is checked against the proposing window of the current head, the current gas
/// limits and the gas limit the validator would pick itself, then simulated under a timeout
/// ending with the window. A successful simulation races the window for the single handoff slot.
pub struct ProposalPipeline<C, S> {
    chain: C,
    simulator: S,
    gas_limits: Arc<GasLimits>,
    config: ProposalConfig,
    proposed_tx: mpsc::Sender<ProposedBlock>,
}

impl<C: ChainReader, S: ProposedBlockSimulator> ProposalPipeline<C, S> {
    pub fn new(
        chain: C,
        simulator: S,
        gas_limits: Arc<GasLimits>,
        config: ProposalConfig,
        proposed_tx: mpsc::Sender<ProposedBlock>,
    ) -> Self {
        Self { chain, simulator, gas_limits, config, proposed_tx }
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub async fn propose(&self, args: ProposedBlockArgs) -> Result<ProposalOutcome, ProposalError> {
        let block_number = args.block_number;
        let mev_relay = args.mev_relay.clone();
        let prev_block_hash = args.prev_block_hash;
        let proposed_reward = args.block_reward;
        let gas_limit = args.gas_limit;
        let gas_used = args.gas_used;
        let tx_count = args.txs.len();
        let un_reverted_count = args.un_reverted.len();

        let mut trace = ProposalTrace::default();
        let result = self.process(args, &mut trace).await;

        debug!(
            block_number,
            %mev_relay,
            %prev_block_hash,
            %proposed_reward,
            gas_limit,
            gas_used,
            tx_count,
            un_reverted_count,
            is_block_skipped = trace.is_block_skipped,
            current_gas_limit = trace.current_gas_limit,
            timestamp = %format_timestamp(SystemTime::now()),
            sim_duration = ?trace.sim_duration,
            err = result.as_ref().err().map(tracing::field::display),
            "received proposed block"
        );
        ProposalMetrics::outcome(outcome_label(&result));

        result
    }

    async fn process(
        &self,
        args: ProposedBlockArgs,
        trace: &mut ProposalTrace,
    ) -> Result<ProposalOutcome, ProposalError> {
        let head = self.chain.current_block();
        // a head timestamp the clock can't represent leaves no window to propose in
        let out_of_range = || ProposalError::TooLate {
            deadline: format!("out of range (head timestamp {})", head.timestamp),
            overshoot: Duration::ZERO,
        };

        let end_of_window = UNIX_EPOCH
            .checked_add(Duration::from_secs(head.timestamp))
            .and_then(|start| start.checked_add(self.config.period))
            .ok_or_else(out_of_range)?
            .checked_sub(self.config.delay_left_over)
            .unwrap_or(UNIX_EPOCH);

        let timeout = match end_of_window.duration_since(SystemTime::now()) {
            Ok(timeout) if !timeout.is_zero() => timeout,
            Ok(_) => {
                return Err(ProposalError::TooLate {
                    deadline: format_timestamp(end_of_window),
                    overshoot: Duration::ZERO,
                })
            }
            Err(err) => {
                return Err(ProposalError::TooLate {
                    deadline: format_timestamp(end_of_window),
                    overshoot: err.duration(),
                })
            }
        };
        let deadline = Instant::now().checked_add(timeout).ok_or_else(out_of_range)?;

        let current_gas_limit = self.gas_limits.current();
        let previous_block_gas_limit = self.gas_limits.previous_block();
        trace.current_gas_limit = current_gas_limit;

        if args.gas_used > current_gas_limit {
            trace.is_block_skipped = true;
            return Err(ProposalError::GasUsedExceedsLimit {
                gas_used: args.gas_used,
                gas_limit: current_gas_limit,
            });
        }

        let expected_gas_limit = calc_gas_limit(
            previous_block_gas_limit,
            self.config.gas_ceil,
            self.config.gas_limit_bound_divisor,
        );
        if expected_gas_limit != args.gas_limit {
            warn!(
                mev_relay = %args.mev_relay,
                block_number = args.block_number,
                validator_gas_limit = expected_gas_limit,
                proposed_block_gas_limit = args.gas_limit,
                "proposed block has wrong gas limit"
            );
            return Err(ProposalError::GasLimitMismatch {
                proposed: args.gas_limit,
                expected: expected_gas_limit,
            });
        }

        let start = Instant::now();
        let simulated = timeout_at(deadline, self.simulator.simulate(&args)).await;
        let sim_duration = start.elapsed();
        trace.sim_duration = sim_duration;
        ProposalMetrics::sim_latency(sim_duration);

        let simulated_work = match simulated {
            Ok(Ok(Some(work))) => work,
            Ok(Ok(None)) => {
                trace.is_block_skipped = true;
                return Ok(ProposalOutcome::Skipped { sim_duration });
            }
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => return Err(BlockSimError::Timeout.into()),
        };

        let block = ProposedBlock { args, simulated_work, sim_duration };
        match timeout_at(deadline, self.proposed_tx.send(block)).await {
            Ok(Ok(())) => Ok(ProposalOutcome::Accepted { sim_duration }),
            Ok(Err(_)) => Err(ProposalError::ChannelClosed),
            Err(_) => Err(ProposalError::DeadlineExceeded),
        }
    }
}

fn outcome_label(result: &Result<ProposalOutcome, ProposalError>) -> &'static str {
    match result {
        Ok(ProposalOutcome::Accepted { .. }) => "accepted",
        Ok(ProposalOutcome::Skipped { .. }) => "skipped",
        Err(ProposalError::TooLate { .. }) => "too_late",
        Err(ProposalError::GasUsedExceedsLimit { .. }) => "gas_used_exceeds_limit",
        Err(ProposalError::GasLimitMismatch { .. }) => "gas_limit_mismatch",
        Err(ProposalError::Simulation(_)) => "simulation_failed",
        Err(ProposalError::DeadlineExceeded) => "deadline_exceeded",
        Err(ProposalError::ChannelClosed) => "channel_closed",
    }
}
