use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Bytes, B256, U256};
use async_trait::async_trait;
use jsonrpsee::{core::ClientError, rpc_params};
use pbs_proposer::{BlockSimError, ProposedBlockSimulator};
use pbs_types::{ProposedBlockArgs, SimulatedWork};
use serde::Serialize;
use tracing::debug;

use crate::{client::ExecutionClient, error::ExecutionError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateProposedBlockRequest<'a> {
    mev_relay: &'a str,
    block_number: u64,
    prev_block_hash: B256,
    block_reward: U256,
    gas_limit: u64,
    gas_used: u64,
    txs: Vec<Bytes>,
    un_reverted: Vec<B256>,
}

impl<'a> From<&'a ProposedBlockArgs> for SimulateProposedBlockRequest<'a> {
    fn from(args: &'a ProposedBlockArgs) -> Self {
        Self {
            mev_relay: &args.mev_relay,
            block_number: args.block_number,
            prev_block_hash: args.prev_block_hash,
            block_reward: args.block_reward,
            gas_limit: args.gas_limit,
            gas_used: args.gas_used,
            txs: args.txs.iter().map(|tx| tx.encoded_2718().into()).collect(),
            un_reverted: args.un_reverted.iter().copied().collect(),
        }
    }
}

/// Delegates simulation of proposed blocks to the execution node over JSON-RPC. A `null`
/// result means the node chose not to use the block.
pub struct RpcSimulator {
    client: ExecutionClient,
    sim_method: String,
}

impl RpcSimulator {
    pub fn new(client: ExecutionClient, namespace: &str) -> Self {
        let sim_method = format!("{namespace}_simulateProposedBlock");
        Self { client, sim_method }
    }
}

#[async_trait]
impl ProposedBlockSimulator for RpcSimulator {
    async fn simulate(
        &self,
        args: &ProposedBlockArgs,
    ) -> Result<Option<SimulatedWork>, BlockSimError> {
        let request = SimulateProposedBlockRequest::from(args);
        debug!(
            block_number = args.block_number,
            mev_relay = %args.mev_relay,
            tx_count = request.txs.len(),
            method = %self.sim_method,
            "sending simulation request"
        );

        match self.client.request(&self.sim_method, rpc_params![request]).await {
            Ok(work) => Ok(work),
            Err(ExecutionError::Rpc(ClientError::Call(err))) => {
                Err(BlockSimError::SimulationFailed(err.message().to_string()))
            }
            Err(ExecutionError::Rpc(ClientError::ParseError(err))) => {
                Err(BlockSimError::InvalidResponse(err.to_string()))
            }
            Err(err) => Err(BlockSimError::RpcError(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pbs_types::{decode_transactions, test_utils::encoded_legacy_tx};
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::test_utils::{start_node, MockNode};

    fn args() -> ProposedBlockArgs {
        let raw = vec![encoded_legacy_tx(0).to_vec()];
        ProposedBlockArgs {
            mev_relay: "relay-a".to_string(),
            block_number: 101,
            prev_block_hash: B256::repeat_byte(0x11),
            block_reward: U256::from(1_000),
            gas_limit: 140_000_000,
            gas_used: 21_000,
            txs: decode_transactions(&raw).unwrap(),
            un_reverted: HashSet::new(),
        }
    }

    async fn simulator(node: &MockNode) -> (RpcSimulator, jsonrpsee::server::ServerHandle) {
        let (url, handle) = start_node(node.clone()).await;
        (RpcSimulator::new(ExecutionClient::new(url).unwrap(), "eth"), handle)
    }

    #[tokio::test]
    async fn test_simulated() {
        let node = MockNode::default();
        node.set_simulation(Ok(json!({"gasUsed": 21000, "profit": "0x3e8"})));
        let (simulator, _handle) = simulator(&node).await;

        let work = simulator.simulate(&args()).await.unwrap().unwrap();
        assert_eq!(node.sim_requests().len(), 1);
        assert_eq!(work.gas_used, 21_000);
        assert_eq!(work.profit, U256::from(1_000));
    }

    #[tokio::test]
    async fn test_request_body() {
        let node = MockNode::default();
        let (simulator, _handle) = simulator(&node).await;

        simulator.simulate(&args()).await.unwrap();

        let request = &node.sim_requests()[0];
        assert_eq!(request["mevRelay"], "relay-a");
        assert_eq!(request["blockNumber"], 101);
        assert_eq!(request["prevBlockHash"], json!(B256::repeat_byte(0x11)));
        assert_eq!(request["txs"], json!([encoded_legacy_tx(0)]));
        assert_eq!(request["unReverted"], json!([]));
    }

    #[tokio::test]
    async fn test_skipped() {
        let node = MockNode::default();
        let (simulator, _handle) = simulator(&node).await;
        assert_eq!(simulator.simulate(&args()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_simulation_failed() {
        let node = MockNode::default();
        node.set_simulation(Err("nonce too low".to_string()));
        let (simulator, _handle) = simulator(&node).await;

        let err = simulator.simulate(&args()).await.unwrap_err();
        assert!(matches!(
            err,
            BlockSimError::SimulationFailed(message) if message == "nonce too low"
        ));
    }

    #[tokio::test]
    async fn test_invalid_response() {
        let node = MockNode::default();
        node.set_simulation(Ok(json!({"gasUsed": "lots"})));
        let (simulator, _handle) = simulator(&node).await;

        let err = simulator.simulate(&args()).await.unwrap_err();
        assert!(matches!(err, BlockSimError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let client = ExecutionClient::new(Url::parse("http://127.0.0.1:1").unwrap()).unwrap();
        let err = RpcSimulator::new(client, "eth").simulate(&args()).await.unwrap_err();
        assert!(matches!(err, BlockSimError::RpcError(_)));
    }
}
