use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use jsonrpsee::{
    core::RpcResult,
    proc_macros::rpc,
    server::{Server, ServerHandle},
    types::{error::CALL_EXECUTION_FAILED_CODE, ErrorObject},
};
use parking_lot::Mutex;
use pbs_types::{
    grpc::{
        proposer_server::{Proposer, ProposerServer},
        ProposeBlockRequest, ProposeBlockResponse, RegisterValidatorRequest,
        RegisterValidatorResponse,
    },
    RegistrationArgs,
};
use rcgen::{generate_simple_self_signed, CertifiedKey};
use rustls::{Certificate, PrivateKey, ServerConfig};
use tokio::{
    io::{AsyncRead, AsyncWrite, ReadBuf},
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot},
};
use tokio_rustls::{server::TlsStream, TlsAcceptor};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{
    transport::{server::Connected, Server as GrpcServer},
    Request, Response, Status,
};

/// In-process gRPC relay recording every registration it receives.
#[derive(Default)]
pub struct MockGrpcRelay {
    registrations: Mutex<Vec<RegisterValidatorRequest>>,
    reject: bool,
}

impl MockGrpcRelay {
    pub fn rejecting() -> Self {
        Self { reject: true, ..Default::default() }
    }

    pub fn registrations(&self) -> Vec<RegisterValidatorRequest> {
        self.registrations.lock().clone()
    }
}

#[tonic::async_trait]
impl Proposer for MockGrpcRelay {
    async fn propose_block(
        &self,
        _request: Request<ProposeBlockRequest>,
    ) -> Result<Response<ProposeBlockResponse>, Status> {
        Err(Status::unimplemented("relay does not accept proposed blocks"))
    }

    async fn register_validator(
        &self,
        request: Request<RegisterValidatorRequest>,
    ) -> Result<Response<RegisterValidatorResponse>, Status> {
        self.registrations.lock().push(request.into_inner());
        if self.reject {
            return Err(Status::permission_denied("unknown validator"));
        }
        Ok(Response::new(RegisterValidatorResponse {}))
    }
}

struct TlsConnection(TlsStream<TcpStream>);

impl Connected for TlsConnection {
    type ConnectInfo = ();

    fn connect_info(&self) -> Self::ConnectInfo {}
}

impl AsyncRead for TlsConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_read(cx, buf)
    }
}

impl AsyncWrite for TlsConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().0).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().0).poll_shutdown(cx)
    }
}

/// Self-signed certificate for `localhost`, negotiating h2.
fn self_signed_acceptor() -> TlsAcceptor {
    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();

    let mut config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(
            vec![Certificate(cert.der().to_vec())],
            PrivateKey(key_pair.serialize_der()),
        )
        .unwrap();
    config.alpn_protocols = vec![b"h2".to_vec()];

    TlsAcceptor::from(Arc::new(config))
}

/// Serves `relay` over TLS on an ephemeral port. Returns its scheme-less `127.0.0.1:<port>`
/// endpoint and a shutdown handle.
pub async fn start_grpc_relay(relay: Arc<MockGrpcRelay>) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let acceptor = self_signed_acceptor();
    let (conn_tx, conn_rx) = mpsc::channel::<io::Result<TlsConnection>>(16);
    let (tx, rx) = oneshot::channel::<()>();

    let accept_loop = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            let conn_tx = conn_tx.clone();
            tokio::spawn(async move {
                if let Ok(stream) = acceptor.accept(stream).await {
                    let _ = conn_tx.send(Ok(TlsConnection(stream))).await;
                }
            });
        }
    });

    tokio::spawn(async move {
        GrpcServer::builder()
            .add_service(ProposerServer::from_arc(relay))
            .serve_with_incoming_shutdown(ReceiverStream::new(conn_rx), async {
                rx.await.ok();
            })
            .await
            .unwrap();
        accept_loop.abort();
    });

    (addr.to_string(), tx)
}

#[rpc(server, namespace = "eth")]
pub trait LegacyRelayApi {
    #[method(name = "registerValidator")]
    fn register_validator(&self, args: RegistrationArgs) -> RpcResult<String>;
}

/// In-process JSON-RPC relay, reachable over HTTP and WebSocket on the same port.
#[derive(Clone, Default)]
pub struct MockLegacyRelay {
    registrations: Arc<Mutex<Vec<RegistrationArgs>>>,
    reject: bool,
}

impl MockLegacyRelay {
    pub fn rejecting() -> Self {
        Self { reject: true, ..Default::default() }
    }

    pub fn registrations(&self) -> Vec<RegistrationArgs> {
        self.registrations.lock().clone()
    }
}

impl LegacyRelayApiServer for MockLegacyRelay {
    fn register_validator(&self, args: RegistrationArgs) -> RpcResult<String> {
        self.registrations.lock().push(args);
        if self.reject {
            return Err(ErrorObject::owned(
                CALL_EXECUTION_FAILED_CODE,
                "unknown validator",
                None::<()>,
            ));
        }
        Ok("ok".to_string())
    }
}

/// Serves `relay` on an ephemeral port and returns its `http://` url. The relay stops once the
/// handle is dropped.
pub async fn start_legacy_relay(relay: MockLegacyRelay) -> (String, ServerHandle) {
    let server = Server::builder().build("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.start(relay.into_rpc());
    (format!("http://{addr}"), handle)
}

/// Polls `condition` until it holds, panics after two seconds.
pub async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
