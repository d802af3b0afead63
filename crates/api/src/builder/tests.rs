use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use parking_lot::Mutex;
use pbs_proposer::{BidBackend, BidBackendError, ChainHead};
use pbs_types::{
    test_utils::{encoded_legacy_tx, sign_bid},
    AcceptedBid, BidArgs, BidMessage, BlockHeader,
};

use super::BuilderApi;
use crate::error::BidError;

#[derive(Default)]
struct MockBackend {
    enabled: bool,
    full: bool,
    bids: Mutex<Vec<AcceptedBid>>,
}

#[async_trait]
impl BidBackend for MockBackend {
    fn builder_enabled(&self) -> bool {
        self.enabled
    }

    async fn bid(&self, bid: AcceptedBid) -> Result<(), BidBackendError> {
        if self.full {
            return Err(BidBackendError::QueueFull);
        }
        self.bids.lock().push(bid);
        Ok(())
    }
}

fn head_hash() -> B256 {
    B256::repeat_byte(0x11)
}

fn builder_key() -> SigningKey {
    SigningKey::from_slice(&[0x22; 32]).unwrap()
}

fn builder_api(backend: Arc<MockBackend>) -> BuilderApi<Arc<ChainHead>, Arc<MockBackend>> {
    let head = BlockHeader { number: 100, hash: head_hash(), ..Default::default() };
    BuilderApi::new(Arc::new(ChainHead::new(head)), backend)
}

fn enabled_backend() -> Arc<MockBackend> {
    Arc::new(MockBackend { enabled: true, ..Default::default() })
}

fn message(builder: Address) -> BidMessage {
    BidMessage {
        block: 101,
        parent_hash: head_hash().to_string(),
        timestamp: 1_700_000_000,
        builder_address: builder.to_string(),
        gas_limit: 140_000_000,
        gas_value: 1_000_000,
        builder_fee_value: 10_000,
        txs: vec![encoded_legacy_tx(0), encoded_legacy_tx(1)],
    }
}

fn signed(message: BidMessage) -> BidArgs {
    sign_bid(message, &builder_key())
}

fn builder_address() -> Address {
    Address::from_private_key(&builder_key())
}

#[tokio::test]
async fn test_valid_bid_reaches_backend() {
    let backend = enabled_backend();
    let api = builder_api(backend.clone());

    api.bid(signed(message(builder_address()))).await.unwrap();

    let bids = backend.bids.lock();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].builder, builder_address());
    assert_eq!(bids[0].block_number, 101);
    assert_eq!(bids[0].txs.len(), 2);
    assert_eq!(bids[0].gas_value, 1_000_000);
    assert_eq!(bids[0].builder_fee_value, 10_000);
    assert_eq!(bids[0].gas_limit, 140_000_000);
}

#[tokio::test]
async fn test_disabled_builder() {
    let backend = Arc::new(MockBackend::default());
    let api = builder_api(backend.clone());

    let err = api.bid(signed(message(builder_address()))).await.unwrap_err();
    assert!(matches!(err, BidError::BuilderDisabled));
    assert!(backend.bids.lock().is_empty());
}

async fn assert_rejected(
    api: &BuilderApi<Arc<ChainHead>, Arc<MockBackend>>,
    mutate: impl FnOnce(&mut BidMessage),
    expected: impl FnOnce(&BidError) -> bool,
) {
    let mut message = message(builder_address());
    mutate(&mut message);
    // structural checks run before the signature is looked at
    let err = api.bid(BidArgs { message, signature: String::new() }).await.unwrap_err();
    assert!(expected(&err), "unexpected error {err:?}");
}

#[tokio::test]
async fn test_structural_checks() {
    let api = builder_api(enabled_backend());

    assert_rejected(&api, |m| m.block = 0, |e| matches!(e, BidError::MissingBlockNumber)).await;
    assert_rejected(&api, |m| m.parent_hash.clear(), |e| matches!(e, BidError::MissingParentHash))
        .await;
    assert_rejected(&api, |m| m.gas_limit = 0, |e| matches!(e, BidError::MissingGasLimit)).await;
    assert_rejected(&api, |m| m.gas_value = -5, |e| matches!(e, BidError::MissingGasValue)).await;
    assert_rejected(&api, |m| m.builder_fee_value = -1, |e| {
        matches!(e, BidError::InvalidBuilderFee)
    })
    .await;
    assert_rejected(&api, |m| m.builder_fee_value = m.gas_value + 1, |e| {
        matches!(e, BidError::GasValueBelowFee)
    })
    .await;
    assert_rejected(&api, |m| m.builder_address.clear(), |e| {
        matches!(e, BidError::MissingBuilderAddress)
    })
    .await;
    assert_rejected(&api, |m| m.builder_address = "0x1234".to_string(), |e| {
        matches!(e, BidError::InvalidBuilderAddress)
    })
    .await;
}

#[tokio::test]
async fn test_gas_value_equal_to_fee_is_rejected() {
    let api = builder_api(enabled_backend());

    let mut message = message(builder_address());
    message.gas_value = 500;
    message.builder_fee_value = 500;
    assert!(matches!(api.bid(signed(message)).await, Err(BidError::GasValueBelowFee)));
}

#[tokio::test]
async fn test_chain_checks() {
    let api = builder_api(enabled_backend());

    let mut wrong_height = message(builder_address());
    wrong_height.block = 100;
    assert!(matches!(
        api.bid(signed(wrong_height)).await,
        Err(BidError::InvalidBlockHeight { bid: 100, current: 100 })
    ));

    let mut wrong_parent = message(builder_address());
    wrong_parent.parent_hash = B256::repeat_byte(0x12).to_string();
    assert!(matches!(api.bid(signed(wrong_parent)).await, Err(BidError::InvalidParentHash { .. })));

    let mut bad_txs = message(builder_address());
    bad_txs.txs.push(Bytes::from_static(&[0x01, 0x02]));
    let err = api.bid(signed(bad_txs)).await.unwrap_err();
    assert!(matches!(err, BidError::InvalidTransactions(ref e) if e.index == 2));
}

#[tokio::test]
async fn test_signature_must_match_builder() {
    let backend = enabled_backend();
    let api = builder_api(backend.clone());

    // signed by the builder key but declaring another address
    let other = Address::repeat_byte(0x33);
    let err = api.bid(signed(message(other))).await.unwrap_err();
    assert!(matches!(
        err,
        BidError::SignerMismatch { recovered, declared }
            if recovered == builder_address() && declared == other
    ));

    let mut bad_signature = signed(message(builder_address()));
    bad_signature.signature = "0xzz".to_string();
    assert!(matches!(api.bid(bad_signature).await, Err(BidError::Signature(_))));

    assert!(backend.bids.lock().is_empty());
}

#[tokio::test]
async fn test_backend_error_is_returned() {
    let backend = Arc::new(MockBackend { enabled: true, full: true, ..Default::default() });
    let api = builder_api(backend);

    let err = api.bid(signed(message(builder_address()))).await.unwrap_err();
    assert!(matches!(err, BidError::Backend(BidBackendError::QueueFull)));
}
