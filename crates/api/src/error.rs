use alloy_primitives::{Address, B256};
use jsonrpsee::{
    core::RegisterMethodError,
    types::{error::CALL_EXECUTION_FAILED_CODE, ErrorObject, ErrorObjectOwned},
};
use pbs_proposer::{BidBackendError, ProposalError, RelayError};
use pbs_types::{SigError, TxDecodeError};
use tonic::Status;

/// Rejection of a builder bid. Variants are ordered the way the checks run.
#[derive(Debug, thiserror::Error)]
pub enum BidError {
    #[error("builder is not enabled")]
    BuilderDisabled,

    #[error("missing block number")]
    MissingBlockNumber,

    #[error("missing parent hash")]
    MissingParentHash,

    #[error("missing gas limit")]
    MissingGasLimit,

    #[error("missing gas value")]
    MissingGasValue,

    #[error("invalid builder fee")]
    InvalidBuilderFee,

    #[error("gas value is lower than builder fee")]
    GasValueBelowFee,

    #[error("missing builder address")]
    MissingBuilderAddress,

    #[error("wrong builder address format")]
    InvalidBuilderAddress,

    #[error("invalid block height, bid block: {bid} current block: {current}")]
    InvalidBlockHeight { bid: i64, current: u64 },

    #[error("invalid parent hash, bid block: {bid} current block: {current}")]
    InvalidParentHash { bid: String, current: B256 },

    #[error("invalid txs: {0}")]
    InvalidTransactions(#[from] TxDecodeError),

    #[error("fail to verify signature, err: {0}")]
    Signature(#[from] SigError),

    #[error("invalid signature: signature comes from {recovered} not {declared}")]
    SignerMismatch { recovered: Address, declared: Address },

    #[error(transparent)]
    Backend(#[from] BidBackendError),
}

impl BidError {
    pub fn label(&self) -> &'static str {
        match self {
            BidError::BuilderDisabled => "disabled",
            BidError::MissingBlockNumber |
            BidError::MissingParentHash |
            BidError::MissingGasLimit |
            BidError::MissingGasValue |
            BidError::InvalidBuilderFee |
            BidError::GasValueBelowFee |
            BidError::MissingBuilderAddress |
            BidError::InvalidBuilderAddress => "invalid",
            BidError::InvalidBlockHeight { .. } |
            BidError::InvalidParentHash { .. } |
            BidError::InvalidTransactions(_) => "wrong_block",
            BidError::Signature(_) | BidError::SignerMismatch { .. } => "bad_signature",
            BidError::Backend(_) => "backend",
        }
    }
}

impl From<BidError> for ErrorObjectOwned {
    fn from(err: BidError) -> Self {
        ErrorObject::owned(CALL_EXECUTION_FAILED_CODE, err.to_string(), None::<()>)
    }
}

pub(crate) fn relay_error(err: RelayError) -> ErrorObjectOwned {
    ErrorObject::owned(CALL_EXECUTION_FAILED_CODE, err.to_string(), None::<()>)
}

/// Rejection of a block proposed by a relay over gRPC.
#[derive(Debug, thiserror::Error)]
pub enum ProposeBlockError {
    #[error("proposed block missing txs")]
    MissingTxs,

    #[error("proposed block missing blockNumber")]
    MissingBlockNumber,

    #[error(
        "proposed block contains incorrect blockNumber. proposedBlockNumber: {proposed} \
         onChainBlockNumber: {on_chain} onChainBlockHash {on_chain_hash}"
    )]
    StaleBlockNumber { proposed: u64, on_chain: u64, on_chain_hash: B256 },

    #[error(transparent)]
    InvalidTransactions(#[from] TxDecodeError),

    #[error(transparent)]
    Proposal(#[from] ProposalError),
}

impl From<ProposeBlockError> for Status {
    fn from(err: ProposeBlockError) -> Self {
        match err {
            ProposeBlockError::Proposal(_) => Status::internal(err.to_string()),
            _ => Status::invalid_argument(err.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server already running")]
    AlreadyRunning,

    #[error("rpc method registration failed: {0}")]
    RegisterMethod(#[from] RegisterMethodError),
}
