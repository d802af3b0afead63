use std::sync::Arc;

use pbs_common::{metrics::RelayMetrics, task, ChainInfo, ProposerConfig};
use pbs_types::{BlockHeader, Bytes, RegistrationArgs};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    clients::{GrpcRelayClient, LegacyRelayClient, RelayClient, RelayKind},
    error::RelayError,
    registry::RelayRegistry,
};

/// Announces the validator's proposed block endpoint to every known relay.
pub struct ValidatorRegistrar {
    registry: Arc<RelayRegistry>,
    config: ProposerConfig,
    chain_info: ChainInfo,
    commit_hash: String,
}

impl ValidatorRegistrar {
    pub fn new(
        registry: Arc<RelayRegistry>,
        config: ProposerConfig,
        chain_info: ChainInfo,
        commit_hash: String,
    ) -> Self {
        Self { registry, config, chain_info, commit_hash }
    }

    pub fn registry(&self) -> &Arc<RelayRegistry> {
        &self.registry
    }

    /// Registers the validator with every relay of one pool, one task per relay.
    ///
    /// gRPC relays are used exclusively as soon as a gRPC callback uri is configured and at
    /// least one gRPC relay is known, legacy relays are skipped in that case even if
    /// registration over gRPC fails. Failures are logged per relay and never retried here, the
    /// next epoch boundary re-registers.
    pub fn register_validator(&self) -> Vec<JoinHandle<()>> {
        if !self.config.proposed_block_grpc_uri.is_empty() &&
            self.registry.count::<GrpcRelayClient>() != 0
        {
            info!("register validator via gRPC to MEV relays");
            return self.broadcast::<GrpcRelayClient>(self.registration_args(RelayKind::Grpc));
        }

        info!("register validator via RPC to MEV relays");
        self.broadcast::<LegacyRelayClient>(self.registration_args(RelayKind::Legacy))
    }

    fn broadcast<C: RelayClient>(&self, args: RegistrationArgs) -> Vec<JoinHandle<()>> {
        let args = Arc::new(args);

        self.registry
            .snapshot::<C>()
            .into_iter()
            .map(|(dest, client)| {
                let args = args.clone();
                task::spawn(file!(), line!(), async move {
                    let result = client.register_validator(&args).await;
                    RelayMetrics::registration(C::KIND.as_str(), result.is_ok());
                    if let Err(err) = result {
                        warn!(
                            %dest,
                            %err,
                            kind = %C::KIND,
                            "failed to register validator to MEV relay"
                        );
                    }
                })
            })
            .collect()
    }

    /// Adds a legacy relay and registers the validator with it, surfacing the registration
    /// error. The relay stays in the registry even if registration fails.
    pub async fn add_relay(&self, endpoint: &str) -> Result<(), RelayError> {
        self.add_and_register::<LegacyRelayClient>(endpoint).await
    }

    /// gRPC counterpart of [`Self::add_relay`].
    pub async fn add_relay_grpc(&self, endpoint: &str) -> Result<(), RelayError> {
        self.add_and_register::<GrpcRelayClient>(endpoint).await
    }

    async fn add_and_register<C: RelayClient>(&self, endpoint: &str) -> Result<(), RelayError> {
        let client = self.registry.add::<C>(endpoint).await?;

        info!(dest = %endpoint, kind = %C::KIND, "register validator to MEV relay");
        let result = client.register_validator(&self.registration_args(C::KIND)).await;
        RelayMetrics::registration(C::KIND.as_str(), result.is_ok());

        if let Err(err) = &result {
            warn!(
                dest = %endpoint,
                %err,
                kind = %C::KIND,
                "failed to register validator to MEV relay"
            );
        }
        result
    }

    pub fn remove_relay(&self, endpoint: &str) -> Result<(), RelayError> {
        self.registry.remove::<LegacyRelayClient>(endpoint)
    }

    pub fn remove_relay_grpc(&self, endpoint: &str) -> Result<(), RelayError> {
        self.registry.remove::<GrpcRelayClient>(endpoint)
    }

    fn registration_args(&self, kind: RelayKind) -> RegistrationArgs {
        let uri = match kind {
            RelayKind::Legacy => &self.config.proposed_block_uri,
            RelayKind::Grpc => &self.config.proposed_block_grpc_uri,
        };

        RegistrationArgs {
            data: Bytes::copy_from_slice(uri.as_bytes()),
            signature: self.config.register_validator_signature.clone(),
            namespace: self.config.proposed_block_namespace.clone(),
            commit_hash: self.commit_hash.clone(),
            gas_ceil: self.config.gas_ceil,
        }
    }

    /// Registers once on startup, then again whenever the head on `heads` enters a new epoch,
    /// including when it skips the boundary block itself. Returns once the feed closes.
    pub async fn run(self: Arc<Self>, mut heads: broadcast::Receiver<BlockHeader>) {
        self.register_validator();

        let mut last_number = None;
        loop {
            match heads.recv().await {
                Ok(head) => {
                    if head.crosses_epoch_boundary(last_number, self.chain_info.epoch_length) {
                        info!(
                            block_number = head.number,
                            previous = ?last_number,
                            "epoch boundary, registering validator"
                        );
                        self.register_validator();
                    }
                    last_number = Some(head.number);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "chain head feed lagged");
                }
                Err(RecvError::Closed) => {
                    info!("chain head feed closed, stopping validator registration");
                    return;
                }
            }
        }
    }
}
