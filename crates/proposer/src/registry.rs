use std::collections::HashMap;

use parking_lot::RwLock;
use pbs_common::{metrics::RelayMetrics, ProposerConfig};
use tracing::{info, warn};

use crate::{
    clients::{GrpcRelayClient, LegacyRelayClient, RelayClient},
    error::RelayError,
};

/// Live relay pools, one map per relay kind, keyed by endpoint string.
#[derive(Default)]
pub struct RegistryState {
    pub(crate) legacy: HashMap<String, LegacyRelayClient>,
    pub(crate) grpc: HashMap<String, GrpcRelayClient>,
}

/// Thread-safe registry of the relays the validator registers with.
///
/// Readers never see the live maps: [`RelayRegistry::snapshot`] hands out an owned copy taken
/// under the read lock, so iteration is never affected by concurrent adds or removes.
#[derive(Default)]
pub struct RelayRegistry {
    state: RwLock<RegistryState>,
}

impl RelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dials every relay in `config`. Relays that fail to dial are logged and skipped.
    pub async fn from_config(config: &ProposerConfig) -> Self {
        let registry = Self::new();

        for relay in &config.relays {
            if let Err(err) = registry.add::<LegacyRelayClient>(relay).await {
                warn!(dest = %relay, %err, "failed to add relay");
            }
        }
        for relay in &config.relays_grpc {
            if let Err(err) = registry.add::<GrpcRelayClient>(relay).await {
                warn!(dest = %relay, %err, "failed to add gRPC relay");
            }
        }

        info!(
            relays = registry.count::<LegacyRelayClient>(),
            relays_grpc = registry.count::<GrpcRelayClient>(),
            "initialised relay registry"
        );

        registry
    }

    /// Dials `endpoint` and stores the client, replacing any previous one for the same endpoint.
    /// Nothing is stored when dialing fails.
    pub async fn add<C: RelayClient>(&self, endpoint: &str) -> Result<C, RelayError> {
        let client = C::dial(endpoint).await?;

        let count = {
            let mut state = self.state.write();
            let pool = C::pool_mut(&mut state);
            pool.insert(endpoint.to_string(), client.clone());
            pool.len()
        };
        RelayMetrics::relay_count(C::KIND.as_str(), count);

        Ok(client)
    }

    pub fn remove<C: RelayClient>(&self, endpoint: &str) -> Result<(), RelayError> {
        let count = {
            let mut state = self.state.write();
            let pool = C::pool_mut(&mut state);
            if pool.remove(endpoint).is_none() {
                return Err(RelayError::NotFound(endpoint.to_string()));
            }
            pool.len()
        };
        RelayMetrics::relay_count(C::KIND.as_str(), count);

        Ok(())
    }

    pub fn get<C: RelayClient>(&self, endpoint: &str) -> Option<C> {
        C::pool(&self.state.read()).get(endpoint).cloned()
    }

    /// Owned copy of the endpoint to client mapping of one pool.
    pub fn snapshot<C: RelayClient>(&self) -> HashMap<String, C> {
        C::pool(&self.state.read()).clone()
    }

    pub fn count<C: RelayClient>(&self) -> usize {
        C::pool(&self.state.read()).len()
    }
}
