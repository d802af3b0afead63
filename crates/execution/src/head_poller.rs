use std::{sync::Arc, time::Duration};

use pbs_proposer::{ChainHead, ChainReader};
use pbs_types::{calc_gas_limit, GasLimits};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{client::ExecutionClient, error::ExecutionError};

/// Follows the execution node's latest block, keeping the shared chain head and gas limits
/// current.
pub struct ChainHeadPoller {
    client: ExecutionClient,
    chain: Arc<ChainHead>,
    gas_limits: Arc<GasLimits>,
    gas_ceil: u64,
    gas_limit_bound_divisor: u64,
    poll_interval: Duration,
}

impl ChainHeadPoller {
    pub fn new(
        client: ExecutionClient,
        chain: Arc<ChainHead>,
        gas_limits: Arc<GasLimits>,
        gas_ceil: u64,
        gas_limit_bound_divisor: u64,
        poll_interval: Duration,
    ) -> Self {
        Self { client, chain, gas_limits, gas_ceil, gas_limit_bound_divisor, poll_interval }
    }

    /// Fetches the latest block once. Returns whether the head changed.
    pub async fn poll(&self) -> Result<bool, ExecutionError> {
        let head = self.client.latest_block().await?;

        let current = calc_gas_limit(head.gas_limit, self.gas_ceil, self.gas_limit_bound_divisor);
        self.gas_limits.update(current, head.gas_limit);

        let number = head.number;
        let changed = self.chain.update(head);
        if changed {
            debug!(block_number = number, current_gas_limit = current, "new chain head");
        }
        Ok(changed)
    }

    pub async fn run(self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(err) = self.poll().await {
                warn!(
                    %err,
                    url = %self.client.url(),
                    head = self.chain.current_block().number,
                    "failed to fetch chain head"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use pbs_types::BlockHeader;
    use serde_json::{json, Value};
    use url::Url;

    use super::*;
    use crate::test_utils::{start_node, MockNode};

    fn block(number: u64, gas_limit: u64) -> Value {
        json!({
            "number": format!("{number:#x}"),
            "hash": B256::with_last_byte(number as u8),
            "parentHash": B256::with_last_byte(number as u8 - 1),
            "timestamp": "0x6553f100",
            "gasLimit": format!("{gas_limit:#x}"),
        })
    }

    fn poller(url: Url) -> ChainHeadPoller {
        ChainHeadPoller::new(
            ExecutionClient::new(url).unwrap(),
            Arc::new(ChainHead::new(BlockHeader::default())),
            Arc::new(GasLimits::default()),
            150_000_000,
            256,
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_poll_updates_head_and_gas_limits() {
        let node = MockNode::default();
        node.set_head(block(100, 140_000_000));
        let (url, _handle) = start_node(node.clone()).await;

        let poller = poller(url);
        let mut heads = poller.chain.subscribe();

        assert!(poller.poll().await.unwrap());
        let head = poller.chain.current_block();
        assert_eq!(head.number, 100);
        assert_eq!(head.gas_limit, 140_000_000);
        assert_eq!(heads.recv().await.unwrap(), head);

        assert_eq!(poller.gas_limits.previous_block(), 140_000_000);
        assert_eq!(poller.gas_limits.current(), calc_gas_limit(140_000_000, 150_000_000, 256));

        // same head again
        assert!(!poller.poll().await.unwrap());

        node.set_head(block(101, 140_000_000));
        assert!(poller.poll().await.unwrap());
        assert_eq!(heads.recv().await.unwrap().number, 101);
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_head() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/").with_status(500).create_async().await;

        let poller = poller(Url::parse(&server.url()).unwrap());
        assert!(poller.poll().await.is_err());
        assert_eq!(poller.chain.current_block(), BlockHeader::default());
        assert_eq!(poller.gas_limits.current(), 0);
    }
}
