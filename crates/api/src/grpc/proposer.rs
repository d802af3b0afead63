use std::{
    collections::HashSet,
    sync::Arc,
    time::{Instant, SystemTime},
};

use alloy_primitives::{B256, U256};
use pbs_common::{metrics::ProposalMetrics, utils::format_timestamp};
use pbs_proposer::{ChainReader, ProposalPipeline, ProposedBlockSimulator};
use pbs_types::{
    decode_transactions,
    grpc::{
        proposer_server::Proposer, ProposeBlockRequest, ProposeBlockResponse,
        RegisterValidatorRequest, RegisterValidatorResponse,
    },
    BlockHeader, ProposedBlockArgs,
};
use tonic::{Request, Response, Status};
use tracing::info;

use crate::error::ProposeBlockError;

/// gRPC ingress for blocks proposed by relays.
pub struct ProposerService<C, S> {
    pipeline: Arc<ProposalPipeline<C, S>>,
}

impl<C, S> ProposerService<C, S> {
    pub fn new(pipeline: Arc<ProposalPipeline<C, S>>) -> Self {
        Self { pipeline }
    }
}

#[tonic::async_trait]
impl<C, S> Proposer for ProposerService<C, S>
where
    C: ChainReader + 'static,
    S: ProposedBlockSimulator + 'static,
{
    #[tracing::instrument(skip_all, fields(
        block_number = request.get_ref().block_number,
        mev_relay = %request.get_ref().mev_relay,
    ))]
    async fn propose_block(
        &self,
        request: Request<ProposeBlockRequest>,
    ) -> Result<Response<ProposeBlockResponse>, Status> {
        let received_at = SystemTime::now();
        let start = Instant::now();

        let head = self.pipeline.chain().current_block();
        let args = validate_proposed_block(request.into_inner(), &head)?;
        let outcome = self.pipeline.propose(args).await.map_err(ProposeBlockError::from)?;

        let response = ProposeBlockResponse {
            received_at: format_timestamp(received_at),
            simulated_duration: prost_types::Duration::try_from(outcome.sim_duration()).ok(),
            response_sent_at: format_timestamp(SystemTime::now()),
        };
        ProposalMetrics::ingress_latency("propose_block", start.elapsed());

        Ok(Response::new(response))
    }

    async fn register_validator(
        &self,
        _request: Request<RegisterValidatorRequest>,
    ) -> Result<Response<RegisterValidatorResponse>, Status> {
        Err(Status::unimplemented("validators do not accept registrations"))
    }
}

/// Structural and chain-position checks of a proposed block, run before the pipeline.
pub fn validate_proposed_block(
    request: ProposeBlockRequest,
    head: &BlockHeader,
) -> Result<ProposedBlockArgs, ProposeBlockError> {
    if request.payload.is_empty() {
        return Err(ProposeBlockError::MissingTxs);
    }
    if request.block_number == 0 {
        return Err(ProposeBlockError::MissingBlockNumber);
    }
    if request.block_number <= head.number {
        info!(
            block_number = request.block_number,
            on_chain_block_number = head.number,
            on_chain_block_hash = %head.hash,
            prev_block_hash = %request.prev_block_hash,
            mev_relay = %request.mev_relay,
            "validating proposed block failed"
        );
        return Err(ProposeBlockError::StaleBlockNumber {
            proposed: request.block_number,
            on_chain: head.number,
            on_chain_hash: head.hash,
        });
    }

    let txs = decode_transactions(&request.payload)?;

    Ok(ProposedBlockArgs {
        mev_relay: request.mev_relay,
        block_number: request.block_number,
        prev_block_hash: parse_hash_lenient(&request.prev_block_hash),
        block_reward: U256::from(request.block_reward),
        gas_limit: request.gas_limit,
        gas_used: request.gas_used,
        txs,
        // relays never send revert protected hashes over gRPC
        un_reverted: HashSet::new(),
    })
}

/// Parses a hex hash without rejecting anything. Short input is left padded, input longer
/// than 32 bytes keeps its trailing bytes and decoding stops at the first non hex digit.
fn parse_hash_lenient(hash: &str) -> B256 {
    let digits = hash.strip_prefix("0x").or_else(|| hash.strip_prefix("0X")).unwrap_or(hash);
    let digits = if digits.len() % 2 == 1 { format!("0{digits}") } else { digits.to_string() };

    let bytes: Vec<u8> = digits
        .as_bytes()
        .chunks_exact(2)
        .map_while(|pair| {
            let high = char::from(pair[0]).to_digit(16)?;
            let low = char::from(pair[1]).to_digit(16)?;
            Some(((high << 4) | low) as u8)
        })
        .collect();

    let len = bytes.len().min(32);
    let mut out = B256::ZERO;
    out.0[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    out
}
