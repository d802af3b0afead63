use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{hex, Address, Bytes, PrimitiveSignature, TxKind, U256};
use k256::ecdsa::SigningKey;

use crate::{BidArgs, BidMessage};

/// Legacy transfer with a placeholder signature, EIP-2718 encoded.
pub fn encoded_legacy_tx(nonce: u64) -> Bytes {
    let tx = TxLegacy {
        chain_id: None,
        nonce,
        gas_price: 1_000_000_000,
        gas_limit: 21_000,
        to: TxKind::Call(Address::repeat_byte(0x42)),
        value: U256::from(1),
        input: Bytes::new(),
    };
    let signature = PrimitiveSignature::new(U256::from(1), U256::from(1), false);
    TxEnvelope::from(tx.into_signed(signature)).encoded_2718().into()
}

/// Signs `message` the way a builder would.
pub fn sign_bid(message: BidMessage, key: &SigningKey) -> BidArgs {
    let digest = message.signing_root().expect("signing root");
    let (signature, recovery_id) =
        key.sign_prehash_recoverable(digest.as_slice()).expect("sign bid");

    let mut raw = signature.to_bytes().to_vec();
    raw.push(recovery_id.to_byte());

    BidArgs { message, signature: hex::encode_prefixed(raw) }
}
