use parking_lot::RwLock;
use pbs_types::BlockHeader;
use tokio::sync::broadcast;

use crate::traits::ChainReader;

const HEAD_FEED_CAPACITY: usize = 64;

/// Latest chain head, shared between the head poller, the ingress validators and the proposal
/// pipeline. Every update is republished on a broadcast feed.
pub struct ChainHead {
    head: RwLock<BlockHeader>,
    feed: broadcast::Sender<BlockHeader>,
}

impl ChainHead {
    pub fn new(head: BlockHeader) -> Self {
        let (feed, _) = broadcast::channel(HEAD_FEED_CAPACITY);
        Self { head: RwLock::new(head), feed }
    }

    /// Replaces the head if `head` differs from the current one. Returns whether it changed.
    pub fn update(&self, head: BlockHeader) -> bool {
        {
            let mut current = self.head.write();
            if *current == head {
                return false;
            }
            *current = head.clone();
        }

        // no receivers is fine, nobody is listening yet
        let _ = self.feed.send(head);
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BlockHeader> {
        self.feed.subscribe()
    }
}

impl ChainReader for ChainHead {
    fn current_block(&self) -> BlockHeader {
        self.head.read().clone()
    }
}
