use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid relay endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("relay not found: {0}")]
    NotFound(String),

    #[error("relay rpc error: {0}")]
    Rpc(#[from] jsonrpsee::core::ClientError),

    #[error("grpc transport error: {0}")]
    GrpcTransport(#[from] tonic::transport::Error),

    #[error("grpc error: {0}")]
    Grpc(#[from] tonic::Status),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BlockSimError {
    #[error("simulation timed out")]
    Timeout,

    #[error("rpc error: {0}")]
    RpcError(String),

    #[error("simulation failed: {0}")]
    SimulationFailed(String),

    #[error("invalid simulation response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProposalError {
    #[error(
        "proposed block is too late, end of proposing window {deadline}, appeared {overshoot:?} \
         later"
    )]
    TooLate { deadline: String, overshoot: Duration },

    #[error("proposed block gasUsed {gas_used} exceeds the current block gas limit {gas_limit}")]
    GasUsedExceedsLimit { gas_used: u64, gas_limit: u64 },

    #[error(
        "proposed block gasLimit {proposed} is different than the validator gasLimit {expected}"
    )]
    GasLimitMismatch { proposed: u64, expected: u64 },

    #[error("processing and simulating proposed block failed, {0}")]
    Simulation(#[from] BlockSimError),

    #[error("failed to propose block due to context timeout")]
    DeadlineExceeded,

    #[error("block building pipeline is closed")]
    ChannelClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum BidBackendError {
    #[error("bid queue is full")]
    QueueFull,

    #[error("bid queue is closed")]
    QueueClosed,
}
