mod bid_sink;
mod client;
mod error;
mod head_poller;
mod simulator;

#[cfg(test)]
mod test_utils;

pub use bid_sink::{bid_channel, ChannelBidSink};
pub use client::ExecutionClient;
pub use error::ExecutionError;
pub use head_poller::ChainHeadPoller;
pub use simulator::RpcSimulator;
