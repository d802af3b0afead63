mod grpc;
mod legacy;

use std::{collections::HashMap, fmt};

use async_trait::async_trait;
pub use grpc::GrpcRelayClient;
pub use legacy::LegacyRelayClient;
use pbs_types::RegistrationArgs;

use crate::{error::RelayError, registry::RegistryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    /// Generic JSON-RPC relay
    Legacy,
    /// Relay speaking the typed `proposer.Proposer` gRPC service
    Grpc,
}

impl RelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayKind::Legacy => "rpc",
            RelayKind::Grpc => "grpc",
        }
    }
}

impl fmt::Display for RelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection to a single relay. Each kind lives in its own pool of the registry.
#[async_trait]
pub trait RelayClient: Clone + Send + Sync + Sized + 'static {
    const KIND: RelayKind;

    /// Builds a client for `endpoint`. Fails if the endpoint can't be used.
    async fn dial(endpoint: &str) -> Result<Self, RelayError>;

    async fn register_validator(&self, args: &RegistrationArgs) -> Result<(), RelayError>;

    fn pool(state: &RegistryState) -> &HashMap<String, Self>;

    fn pool_mut(state: &mut RegistryState) -> &mut HashMap<String, Self>;
}
