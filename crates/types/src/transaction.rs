use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::Decodable2718;

use crate::TxDecodeError;

/// Decodes a list of EIP-2718 encoded transactions (legacy RLP or typed envelopes), failing on
/// the first payload that does not decode.
pub fn decode_transactions<T: AsRef<[u8]>>(
    encoded: &[T],
) -> Result<Vec<TxEnvelope>, TxDecodeError> {
    encoded
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            TxEnvelope::decode_2718(&mut raw.as_ref())
                .map_err(|source| TxDecodeError { index, source })
        })
        .collect()
}
