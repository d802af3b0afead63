use async_trait::async_trait;
use pbs_proposer::{BidBackend, BidBackendError};
use pbs_types::AcceptedBid;
use tokio::sync::mpsc::{self, error::TrySendError};

pub fn bid_channel(
    builder_enabled: bool,
    capacity: usize,
) -> (ChannelBidSink, mpsc::Receiver<AcceptedBid>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelBidSink { builder_enabled, tx }, rx)
}

/// Hands accepted bids to the block-building pipeline over a bounded queue. Never waits, a full
/// queue rejects the bid.
#[derive(Clone)]
pub struct ChannelBidSink {
    builder_enabled: bool,
    tx: mpsc::Sender<AcceptedBid>,
}

#[async_trait]
impl BidBackend for ChannelBidSink {
    fn builder_enabled(&self) -> bool {
        self.builder_enabled
    }

    async fn bid(&self, bid: AcceptedBid) -> Result<(), BidBackendError> {
        self.tx.try_send(bid).map_err(|err| match err {
            TrySendError::Full(_) => BidBackendError::QueueFull,
            TrySendError::Closed(_) => BidBackendError::QueueClosed,
        })
    }
}
