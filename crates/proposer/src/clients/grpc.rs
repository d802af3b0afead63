use std::{collections::HashMap, sync::Arc, time::SystemTime};

use async_trait::async_trait;
use hyper_rustls::HttpsConnectorBuilder;
use pbs_types::{
    grpc::{proposer_client::ProposerClient, RegisterValidatorRequest},
    RegistrationArgs,
};
use rustls::{
    client::{ServerCertVerified, ServerCertVerifier},
    Certificate, ClientConfig, ServerName,
};
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::{
    clients::{RelayClient, RelayKind},
    error::RelayError,
    registry::RegistryState,
};

/// Relay client for the `proposer.Proposer` gRPC service.
///
/// Relays are always dialed over TLS, `host:port` or `https://host:port`. They are
/// authenticated at the application layer through signatures, so the TLS connection skips
/// server certificate verification.
#[derive(Debug, Clone)]
pub struct GrpcRelayClient {
    endpoint: String,
    client: ProposerClient<Channel>,
}

impl GrpcRelayClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send_registration(
        &self,
        request: RegisterValidatorRequest,
    ) -> Result<(), RelayError> {
        // channel clones are cheap and share the underlying connection
        let mut client = self.client.clone();
        client.register_validator(request).await?;
        Ok(())
    }
}

#[async_trait]
impl RelayClient for GrpcRelayClient {
    const KIND: RelayKind = RelayKind::Grpc;

    async fn dial(endpoint: &str) -> Result<Self, RelayError> {
        let invalid = |reason: String| RelayError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let authority = match endpoint.split_once("://") {
            None => endpoint,
            Some(("https", authority)) => authority,
            Some((scheme, _)) => return Err(invalid(format!("unsupported scheme {scheme}"))),
        };

        let connector = HttpsConnectorBuilder::new()
            .with_tls_config(insecure_tls_config())
            .https_only()
            .enable_http2()
            .build();

        let channel = Endpoint::from_shared(format!("https://{authority}"))
            .map_err(|err| invalid(err.to_string()))?
            .tcp_nodelay(true)
            .connect_with_connector_lazy(connector);

        Ok(Self { endpoint: endpoint.to_string(), client: ProposerClient::new(channel) })
    }

    async fn register_validator(&self, args: &RegistrationArgs) -> Result<(), RelayError> {
        self.send_registration(args.to_proto()).await?;
        debug!(dest = %self.endpoint, "registered validator to relay");
        Ok(())
    }

    fn pool(state: &RegistryState) -> &HashMap<String, Self> {
        &state.grpc
    }

    fn pool_mut(state: &mut RegistryState) -> &mut HashMap<String, Self> {
        &mut state.grpc
    }
}

fn insecure_tls_config() -> ClientConfig {
    ClientConfig::builder()
        .with_safe_defaults()
        .with_custom_certificate_verifier(Arc::new(SkipServerVerification))
        .with_no_client_auth()
}

struct SkipServerVerification;

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}
