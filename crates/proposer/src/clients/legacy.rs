use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use jsonrpsee::{
    core::{client::ClientT, params::ArrayParams},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
    ws_client::{WsClient, WsClientBuilder},
};
use pbs_types::RegistrationArgs;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    clients::{RelayClient, RelayKind},
    error::RelayError,
    registry::RegistryState,
};

const REGISTER_VALIDATOR_METHOD: &str = "eth_registerValidator";

#[derive(Clone)]
enum Transport {
    Http(HttpClient),
    Ws(Arc<WsClient>),
}

/// JSON-RPC relay client, over HTTP(S) or WebSocket depending on the endpoint scheme.
#[derive(Clone)]
pub struct LegacyRelayClient {
    transport: Transport,
    url: Url,
}

impl fmt::Debug for LegacyRelayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyRelayClient").field("url", &self.url.as_str()).finish()
    }
}

impl LegacyRelayClient {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: ArrayParams,
    ) -> Result<R, RelayError> {
        let result = match &self.transport {
            Transport::Http(client) => client.request(method, params).await?,
            Transport::Ws(client) => client.request(method, params).await?,
        };
        Ok(result)
    }
}

#[async_trait]
impl RelayClient for LegacyRelayClient {
    const KIND: RelayKind = RelayKind::Legacy;

    /// WebSocket endpoints are connected eagerly, HTTP ones on first request.
    async fn dial(endpoint: &str) -> Result<Self, RelayError> {
        let invalid = |reason: String| RelayError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
        let transport = match url.scheme() {
            "http" | "https" => Transport::Http(
                HttpClientBuilder::default()
                    .build(url.as_str())
                    .map_err(|err| invalid(err.to_string()))?,
            ),
            "ws" | "wss" => {
                Transport::Ws(Arc::new(WsClientBuilder::default().build(url.as_str()).await?))
            }
            scheme => return Err(invalid(format!("unsupported scheme {scheme}"))),
        };

        Ok(Self { transport, url })
    }

    async fn register_validator(&self, args: &RegistrationArgs) -> Result<(), RelayError> {
        let result: Value = self.request(REGISTER_VALIDATOR_METHOD, rpc_params![args]).await?;
        debug!(dest = %self.url, %result, "registered validator to relay");
        Ok(())
    }

    fn pool(state: &RegistryState) -> &HashMap<String, Self> {
        &state.legacy
    }

    fn pool_mut(state: &mut RegistryState) -> &mut HashMap<String, Self> {
        &mut state.legacy
    }
}
