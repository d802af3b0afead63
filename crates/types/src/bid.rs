use alloy_consensus::TxEnvelope;
use alloy_primitives::{hex, keccak256, Address, Bytes, PrimitiveSignature, B256};
use alloy_rlp::RlpEncodable;
use serde::{Deserialize, Serialize};

use crate::SigError;

/// Bid a builder sends for the next block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidMessage {
    /// block height
    pub block: i64,
    /// parent block hash
    pub parent_hash: String,
    /// unix timestamp in seconds
    pub timestamp: i64,
    /// address of builder
    pub builder_address: String,
    /// gas limit of the block to be proposed
    pub gas_limit: i64,
    /// gas value of the block to be proposed in wei
    pub gas_value: i64,
    /// the fee that builder would like to get
    pub builder_fee_value: i64,
    /// ordered raw transactions, optional
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub txs: Vec<Bytes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidArgs {
    pub message: BidMessage,
    /// hex encoded 65 byte `r || s || v` signature over [`BidMessage::signing_root`]
    pub signature: String,
}

/// Bid that passed every ingress check, handed to the block-building pipeline.
#[derive(Debug, Clone)]
pub struct AcceptedBid {
    pub builder: Address,
    pub block_number: u64,
    pub txs: Vec<TxEnvelope>,
    pub gas_value: u64,
    pub builder_fee_value: u64,
    pub gas_limit: u64,
}

/// Canonical RLP layout of a bid message. Strings are encoded as their UTF-8 bytes.
#[derive(RlpEncodable)]
struct SigningBidMessage {
    block: u64,
    parent_hash: Bytes,
    timestamp: u64,
    builder_address: Bytes,
    gas_limit: u64,
    gas_value: u64,
    builder_fee_value: u64,
    txs: Vec<Bytes>,
}

impl BidMessage {
    /// Keccak256 of the canonical RLP encoding of the message. This is what builders sign.
    pub fn signing_root(&self) -> Result<B256, SigError> {
        let message = SigningBidMessage {
            block: non_negative(self.block, "block")?,
            parent_hash: Bytes::copy_from_slice(self.parent_hash.as_bytes()),
            timestamp: non_negative(self.timestamp, "timestamp")?,
            builder_address: Bytes::copy_from_slice(self.builder_address.as_bytes()),
            gas_limit: non_negative(self.gas_limit, "gas_limit")?,
            gas_value: non_negative(self.gas_value, "gas_value")?,
            builder_fee_value: non_negative(self.builder_fee_value, "builder_fee_value")?,
            txs: self.txs.clone(),
        };

        Ok(keccak256(alloy_rlp::encode(&message)))
    }
}

impl BidArgs {
    /// Recovers the address that produced `signature` over the message signing root.
    pub fn recover_signer(&self) -> Result<Address, SigError> {
        let digest = self.message.signing_root()?;
        let raw = hex::decode(&self.signature)?;
        let signature = PrimitiveSignature::try_from(raw.as_slice())?;
        Ok(signature.recover_address_from_prehash(&digest)?)
    }
}

fn non_negative(value: i64, field: &'static str) -> Result<u64, SigError> {
    u64::try_from(value).map_err(|_| SigError::NegativeField(field))
}
