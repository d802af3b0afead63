use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use alloy_primitives::{Bytes, B256, U256};
use async_trait::async_trait;
use pbs_common::GrpcConfig;
use pbs_proposer::{
    proposed_block_channel, BlockSimError, ChainHead, ProposalConfig, ProposalPipeline,
    ProposedBlockSimulator,
};
use pbs_types::{
    grpc::{proposer_client::ProposerClient, ProposeBlockRequest, RegisterValidatorRequest},
    test_utils::encoded_legacy_tx,
    BlockHeader, GasLimits, ProposedBlock, ProposedBlockArgs, SimulatedWork,
};
use tokio::sync::mpsc;
use tonic::{metadata::MetadataValue, transport::Channel, Code, Request};

use super::*;
use crate::error::ProposeBlockError;

const GAS_LIMIT: u64 = 8_000_000;

struct DelayedSimulator {
    delay: Duration,
}

#[async_trait]
impl ProposedBlockSimulator for DelayedSimulator {
    async fn simulate(
        &self,
        args: &ProposedBlockArgs,
    ) -> Result<Option<SimulatedWork>, BlockSimError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(SimulatedWork { gas_used: args.gas_used, profit: U256::from(1) }))
    }
}

type TestService = ProposerService<Arc<ChainHead>, Arc<DelayedSimulator>>;

fn head(timestamp: u64) -> BlockHeader {
    BlockHeader {
        number: 100,
        hash: B256::repeat_byte(0x11),
        parent_hash: B256::repeat_byte(0x10),
        timestamp,
        gas_limit: GAS_LIMIT,
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

fn service(head_timestamp: u64) -> (TestService, mpsc::Receiver<ProposedBlock>) {
    let config = ProposalConfig {
        period: Duration::from_secs(3),
        delay_left_over: Duration::ZERO,
        gas_ceil: GAS_LIMIT,
        gas_limit_bound_divisor: 256,
    };
    let (tx, rx) = proposed_block_channel();
    let pipeline = ProposalPipeline::new(
        Arc::new(ChainHead::new(head(head_timestamp))),
        Arc::new(DelayedSimulator { delay: Duration::from_millis(50) }),
        Arc::new(GasLimits::new(GAS_LIMIT, GAS_LIMIT)),
        config,
        tx,
    );
    (ProposerService::new(Arc::new(pipeline)), rx)
}

fn request(block_number: u64) -> ProposeBlockRequest {
    ProposeBlockRequest {
        payload: vec![encoded_legacy_tx(0).to_vec(), encoded_legacy_tx(1).to_vec()],
        block_number,
        prev_block_hash: B256::repeat_byte(0x11).to_string(),
        block_reward: 1_000,
        gas_limit: GAS_LIMIT,
        gas_used: 5_000_000,
        mev_relay: "relay-a".to_string(),
    }
}

async fn start_server(service: TestService, node_id: &str, secret: &str) -> (GrpcServer, String) {
    let config = GrpcConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        node_id: node_id.to_string(),
        secret: secret.to_string(),
    };
    let server = GrpcServer::new(config);
    let addr = server.start(service).await.unwrap();
    (server, format!("http://{addr}"))
}

async fn client(endpoint: String) -> ProposerClient<Channel> {
    ProposerClient::connect(endpoint).await.unwrap()
}

fn authorized<T>(message: T, header: &str) -> Request<T> {
    let mut request = Request::new(message);
    request.metadata_mut().insert("authorization", MetadataValue::try_from(header).unwrap());
    request
}

#[test]
fn test_validate_proposed_block() {
    let args = validate_proposed_block(request(101), &head(0)).unwrap();
    assert_eq!(args.block_number, 101);
    assert_eq!(args.prev_block_hash, B256::repeat_byte(0x11));
    assert_eq!(args.block_reward, U256::from(1_000));
    assert_eq!(args.txs.len(), 2);
    assert!(args.un_reverted.is_empty());
}

#[test]
fn test_validate_rejects_malformed_requests() {
    let mut empty = request(101);
    empty.payload.clear();
    assert!(matches!(validate_proposed_block(empty, &head(0)), Err(ProposeBlockError::MissingTxs)));

    assert!(matches!(
        validate_proposed_block(request(0), &head(0)),
        Err(ProposeBlockError::MissingBlockNumber)
    ));

    assert!(matches!(
        validate_proposed_block(request(100), &head(0)),
        Err(ProposeBlockError::StaleBlockNumber { proposed: 100, on_chain: 100, .. })
    ));

    let mut bad_tx = request(101);
    bad_tx.payload.push(Bytes::from_static(&[0x01, 0x02]).to_vec());
    assert!(matches!(
        validate_proposed_block(bad_tx, &head(0)),
        Err(ProposeBlockError::InvalidTransactions(_))
    ));
}

#[test]
fn test_validate_accepts_any_prev_block_hash() {
    let parsed = |hash: &str| {
        let mut request = request(101);
        request.prev_block_hash = hash.to_string();
        validate_proposed_block(request, &head(0)).unwrap().prev_block_hash
    };

    assert_eq!(parsed(""), B256::ZERO);
    assert_eq!(parsed("0x1234"), B256::left_padding_from(&[0x12, 0x34]));
    assert_eq!(parsed("abc"), B256::left_padding_from(&[0x0a, 0xbc]));
    assert_eq!(parsed("0x12zz34"), B256::with_last_byte(0x12));

    // longer input keeps the trailing 32 bytes
    let long = format!("0xff{}", "11".repeat(32));
    assert_eq!(parsed(&long), B256::repeat_byte(0x11));
}

#[tokio::test]
async fn test_propose_block_end_to_end() {
    let (service, mut rx) = service(now_secs());
    let (server, endpoint) = start_server(service, "node", "secret").await;
    let mut client = client(endpoint).await;

    let response = client
        .propose_block(authorized(request(101), &encode_node_secret("node", "secret")))
        .await
        .unwrap()
        .into_inner();

    let simulated = response.simulated_duration.unwrap();
    let simulated = Duration::new(simulated.seconds as u64, simulated.nanos as u32);
    assert!(simulated >= Duration::from_millis(50));
    assert!(simulated < Duration::from_secs(1));
    assert_eq!(response.received_at.len(), "2024-05-01 12:00:00.000000".len());
    assert!(response.response_sent_at >= response.received_at);

    let block = rx.recv().await.unwrap();
    assert_eq!(block.args.block_number, 101);
    assert_eq!(block.args.mev_relay, "relay-a");

    server.stop();
}

#[tokio::test]
async fn test_propose_block_requires_auth() {
    let (service, _rx) = service(now_secs());
    let (server, endpoint) = start_server(service, "node", "secret").await;
    let mut client = client(endpoint).await;

    let status = client.propose_block(request(101)).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    let wrong = encode_node_secret("node", "other");
    let status = client.propose_block(authorized(request(101), &wrong)).await.unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    server.stop();
}

#[tokio::test]
async fn test_propose_block_status_codes() {
    // window of the head ended long ago
    let (service, _rx) = service(now_secs() - 30);
    let (server, endpoint) = start_server(service, "", "").await;
    let mut client = client(endpoint).await;

    let status = client.propose_block(request(101)).await.unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert!(status.message().contains("too late"));

    let status = client.propose_block(request(99)).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .register_validator(RegisterValidatorRequest::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    server.stop();
}

#[tokio::test]
async fn test_start_twice() {
    let (service_a, _rx_a) = service(now_secs());
    let (service_b, _rx_b) = service(now_secs());
    let (server, _endpoint) = start_server(service_a, "", "").await;

    assert!(matches!(server.start(service_b).await, Err(ApiError::AlreadyRunning)));

    server.stop();
    // stopping again is a no-op
    server.stop();
}
