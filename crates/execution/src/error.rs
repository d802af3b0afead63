#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("rpc error: {0}")]
    Rpc(#[from] jsonrpsee::core::ClientError),

    #[error("no block returned for {0}")]
    MissingBlock(String),
}
