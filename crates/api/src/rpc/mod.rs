
use std::{future::Future, net::SocketAddr, sync::Arc, time::Instant};

use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
    server::{Server, ServerHandle},
    RpcModule,
};
use parking_lot::Mutex;
use pbs_common::{metrics::ProposalMetrics, RpcConfig};
use pbs_proposer::{BidBackend, ChainReader, ValidatorRegistrar};
use pbs_types::BidArgs;
use tracing::info;

use crate::{
    builder::BuilderApi,
    error::{relay_error, ApiError},
};

pub const METHOD_BID: &str = "eth_bid";
pub const METHOD_ADD_RELAY: &str = "miner_addRelay";
pub const METHOD_REMOVE_RELAY: &str = "miner_removeRelay";
pub const METHOD_ADD_RELAY_GRPC: &str = "miner_addRelayGrpc";
pub const METHOD_REMOVE_RELAY_GRPC: &str = "miner_removeRelayGrpc";

/// Bid submission for builders.
#[rpc(server, client, namespace = "eth")]
pub trait BidApi {
    #[method(name = "bid")]
    async fn bid(&self, args: BidArgs) -> RpcResult<()>;
}

/// Runtime relay management for operators. Adding a relay registers the validator with it
/// right away.
#[rpc(server, client, namespace = "miner")]
pub trait RelayAdminApi {
    #[method(name = "addRelay")]
    async fn add_relay(&self, endpoint: String) -> RpcResult<()>;

    #[method(name = "removeRelay")]
    fn remove_relay(&self, endpoint: String) -> RpcResult<()>;

    #[method(name = "addRelayGrpc")]
    async fn add_relay_grpc(&self, endpoint: String) -> RpcResult<()>;

    #[method(name = "removeRelayGrpc")]
    fn remove_relay_grpc(&self, endpoint: String) -> RpcResult<()>;
}

/// Handlers behind the JSON-RPC surface: [`BidApiServer`] and [`RelayAdminApiServer`].
pub struct RpcApi<C, B> {
    builder: Arc<BuilderApi<C, B>>,
    registrar: Arc<ValidatorRegistrar>,
}

impl<C, B> Clone for RpcApi<C, B> {
    fn clone(&self) -> Self {
        Self { builder: self.builder.clone(), registrar: self.registrar.clone() }
    }
}

impl<C, B> RpcApi<C, B>
where
    C: ChainReader + 'static,
    B: BidBackend + 'static,
{
    pub fn new(builder: BuilderApi<C, B>, registrar: Arc<ValidatorRegistrar>) -> Self {
        Self { builder: Arc::new(builder), registrar }
    }

    /// Merges both namespaces into one module.
    pub fn into_rpc_module(self) -> Result<RpcModule<()>, ApiError> {
        let mut module = RpcModule::new(());
        module.merge(BidApiServer::into_rpc(self.clone()))?;
        module.merge(RelayAdminApiServer::into_rpc(self))?;
        Ok(module)
    }
}

async fn timed<T>(method: &'static str, call: impl Future<Output = T>) -> T {
    let start = Instant::now();
    let result = call.await;
    ProposalMetrics::ingress_latency(method, start.elapsed());
    result
}

#[async_trait]
impl<C, B> BidApiServer for RpcApi<C, B>
where
    C: ChainReader + 'static,
    B: BidBackend + 'static,
{
    async fn bid(&self, args: BidArgs) -> RpcResult<()> {
        Ok(timed(METHOD_BID, self.builder.bid(args)).await?)
    }
}

#[async_trait]
impl<C, B> RelayAdminApiServer for RpcApi<C, B>
where
    C: ChainReader + 'static,
    B: BidBackend + 'static,
{
    async fn add_relay(&self, endpoint: String) -> RpcResult<()> {
        timed(METHOD_ADD_RELAY, self.registrar.add_relay(&endpoint)).await.map_err(relay_error)
    }

    fn remove_relay(&self, endpoint: String) -> RpcResult<()> {
        self.registrar.remove_relay(&endpoint).map_err(relay_error)
    }

    async fn add_relay_grpc(&self, endpoint: String) -> RpcResult<()> {
        timed(METHOD_ADD_RELAY_GRPC, self.registrar.add_relay_grpc(&endpoint))
            .await
            .map_err(relay_error)
    }

    fn remove_relay_grpc(&self, endpoint: String) -> RpcResult<()> {
        self.registrar.remove_relay_grpc(&endpoint).map_err(relay_error)
    }
}

/// JSON-RPC server for [`RpcApi`], over HTTP and WebSocket on the same port.
pub struct RpcServer {
    config: RpcConfig,
    handle: Mutex<Option<ServerHandle>>,
}

impl RpcServer {
    pub fn new(config: RpcConfig) -> Self {
        Self { config, handle: Mutex::new(None) }
    }

    /// Binds the listen address and serves `api` in the background. Returns the bound address.
    pub async fn start<C, B>(&self, api: RpcApi<C, B>) -> Result<SocketAddr, ApiError>
    where
        C: ChainReader + 'static,
        B: BidBackend + 'static,
    {
        if self.handle.lock().is_some() {
            return Err(ApiError::AlreadyRunning);
        }

        let module = api.into_rpc_module()?;
        let server = Server::builder().build(self.config.listen_addr).await?;
        let local_addr = server.local_addr()?;

        info!(
            listen_addr = %local_addr,
            methods = ?module.method_names().collect::<Vec<_>>(),
            "json-rpc api server is started"
        );

        *self.handle.lock() = Some(server.start(module));
        Ok(local_addr)
    }

    /// Stops accepting connections. No-op if not running.
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            if handle.stop().is_ok() {
                info!("json-rpc api server is stopped");
            }
        }
    }
}
