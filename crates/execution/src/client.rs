use alloy_primitives::{B256, U64};
use jsonrpsee::{
    core::{client::ClientT, params::ArrayParams},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use pbs_types::BlockHeader;
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::error::ExecutionError;

/// Header as returned by `eth_getBlockByNumber`, quantities hex encoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcHeader {
    number: U64,
    hash: B256,
    parent_hash: B256,
    timestamp: U64,
    gas_limit: U64,
}

impl From<RpcHeader> for BlockHeader {
    fn from(header: RpcHeader) -> Self {
        BlockHeader {
            number: header.number.to(),
            hash: header.hash,
            parent_hash: header.parent_hash,
            timestamp: header.timestamp.to(),
            gas_limit: header.gas_limit.to(),
        }
    }
}

/// JSON-RPC client of the local execution node.
#[derive(Clone)]
pub struct ExecutionClient {
    client: HttpClient,
    url: Url,
}

impl ExecutionClient {
    pub fn new(url: Url) -> Result<Self, ExecutionError> {
        let client = HttpClientBuilder::default().build(url.as_str())?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// An error object in the response is returned as a `Call` error.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: ArrayParams,
    ) -> Result<R, ExecutionError> {
        Ok(self.client.request(method, params).await?)
    }

    pub async fn latest_block(&self) -> Result<BlockHeader, ExecutionError> {
        let header: Option<RpcHeader> =
            self.request("eth_getBlockByNumber", rpc_params!["latest", false]).await?;
        header.map(Into::into).ok_or_else(|| ExecutionError::MissingBlock("latest".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use jsonrpsee::core::ClientError;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{start_node, MockNode};

    #[tokio::test]
    async fn test_latest_block() {
        let node = MockNode::default();
        node.set_head(json!({
            "number": "0x64",
            "hash": B256::repeat_byte(0x11),
            "parentHash": B256::repeat_byte(0x10),
            "timestamp": "0x6553f100",
            "gasLimit": "0x8583b00",
            "miner": "0x0000000000000000000000000000000000000000",
        }));
        let (url, _handle) = start_node(node.clone()).await;

        let head = ExecutionClient::new(url).unwrap().latest_block().await.unwrap();

        assert_eq!(node.block_requests(), vec![("latest".to_string(), false)]);
        assert_eq!(head.number, 100);
        assert_eq!(head.hash, B256::repeat_byte(0x11));
        assert_eq!(head.parent_hash, B256::repeat_byte(0x10));
        assert_eq!(head.timestamp, 1_700_000_000);
        assert_eq!(head.gas_limit, 140_000_000);
    }

    #[tokio::test]
    async fn test_rpc_errors() {
        let (url, _handle) = start_node(MockNode::default()).await;

        let err = ExecutionClient::new(url)
            .unwrap()
            .request::<String>("eth_blockNumber", rpc_params![])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Rpc(ClientError::Call(_))));
    }

    #[tokio::test]
    async fn test_missing_block() {
        let (url, _handle) = start_node(MockNode::default()).await;

        let err = ExecutionClient::new(url).unwrap().latest_block().await.unwrap_err();
        assert!(matches!(err, ExecutionError::MissingBlock(_)));
    }

    #[tokio::test]
    async fn test_malformed_block() {
        let node = MockNode::default();
        node.set_head(json!({ "number": "not a quantity" }));
        let (url, _handle) = start_node(node).await;

        let err = ExecutionClient::new(url).unwrap().latest_block().await.unwrap_err();
        assert!(matches!(err, ExecutionError::Rpc(ClientError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_http_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/").with_status(503).create_async().await;

        let client = ExecutionClient::new(Url::parse(&server.url()).unwrap()).unwrap();
        let err = client.latest_block().await.unwrap_err();
        assert!(matches!(err, ExecutionError::Rpc(ClientError::Transport(_))));
    }
}
