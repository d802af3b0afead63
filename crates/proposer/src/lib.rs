pub mod chain_head;
pub mod clients;
pub mod error;
pub mod proposal;
pub mod registration;
pub mod registry;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use chain_head::ChainHead;
pub use clients::{GrpcRelayClient, LegacyRelayClient, RelayClient, RelayKind};
pub use error::*;
pub use proposal::{proposed_block_channel, ProposalConfig, ProposalOutcome, ProposalPipeline};
pub use registration::ValidatorRegistrar;
pub use registry::{RegistryState, RelayRegistry};
pub use traits::*;
