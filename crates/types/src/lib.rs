mod bid;
mod block;
mod error;
mod gas;
pub mod grpc;
mod proposal;
mod registration;
mod transaction;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bid::*;
pub use block::*;
pub use error::*;
pub use gas::*;
pub use proposal::*;
pub use registration::*;
pub use transaction::*;

pub use alloy_consensus::TxEnvelope;
pub use alloy_primitives::{Address, Bytes, B256, U256};
