mod auth;
mod proposer;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;

pub use auth::{encode_node_secret, AuthInterceptor};
use parking_lot::Mutex;
use pbs_common::{task, GrpcConfig};
use pbs_proposer::{ChainReader, ProposedBlockSimulator};
use pbs_types::grpc::proposer_server::ProposerServer;
pub use proposer::{validate_proposed_block, ProposerService};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{error, info};

use crate::error::ApiError;

const WINDOW_SIZE: u32 = 128 * 1024;

/// gRPC server relays propose blocks to.
pub struct GrpcServer {
    config: GrpcConfig,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl GrpcServer {
    pub fn new(config: GrpcConfig) -> Self {
        Self { config, shutdown: Mutex::new(None) }
    }

    /// Binds the listen address and serves `service` in the background. Returns the bound
    /// address.
    pub async fn start<C, S>(&self, service: ProposerService<C, S>) -> Result<SocketAddr, ApiError>
    where
        C: ChainReader + 'static,
        S: ProposedBlockSimulator + 'static,
    {
        if self.shutdown.lock().is_some() {
            return Err(ApiError::AlreadyRunning);
        }

        let listener = TcpListener::bind(self.config.listen_addr).await?;
        let local_addr = listener.local_addr()?;
        let interceptor = AuthInterceptor::new(&self.config.node_id, &self.config.secret);
        let (tx, rx) = oneshot::channel();

        info!(
            listen_addr = %local_addr,
            auth = interceptor.is_enabled(),
            "grpc api server is started"
        );

        let router = Server::builder()
            .initial_connection_window_size(WINDOW_SIZE)
            .tcp_nodelay(true)
            .add_service(ProposerServer::with_interceptor(service, interceptor));

        task::spawn(file!(), line!(), async move {
            let incoming = TcpListenerStream::new(listener);
            if let Err(err) = router
                .serve_with_incoming_shutdown(incoming, async {
                    rx.await.ok();
                })
                .await
            {
                error!(%err, "grpc api server failed");
            }
        });

        *self.shutdown.lock() = Some(tx);
        Ok(local_addr)
    }

    /// Stops accepting calls and lets in-flight ones finish. No-op if not running.
    pub fn stop(&self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
            info!("grpc api server is stopped");
        }
    }
}
