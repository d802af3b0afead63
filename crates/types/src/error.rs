use alloy_eips::eip2718::Eip2718Error;

#[derive(Debug, thiserror::Error)]
#[error("invalid transaction at index {index}: {source}")]
pub struct TxDecodeError {
    pub index: usize,
    #[source]
    pub source: Eip2718Error,
}

#[derive(Debug, thiserror::Error)]
pub enum SigError {
    #[error("negative value for {0}")]
    NegativeField(&'static str),

    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(#[from] alloy_primitives::hex::FromHexError),

    #[error(transparent)]
    InvalidSignature(#[from] alloy_primitives::SignatureError),
}
