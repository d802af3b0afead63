use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Snapshot of the chain head as seen by the proposer. Only the fields needed to time and
/// validate proposals are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    /// Unix timestamp in seconds
    pub timestamp: u64,
    pub gas_limit: u64,
}

impl BlockHeader {
    pub fn is_epoch_boundary(&self, epoch_length: u64) -> bool {
        epoch_length != 0 && self.number % epoch_length == 0
    }

    /// Whether an epoch boundary lies in `(previous, number]`, so a head that skips over the
    /// boundary block still counts. Falls back to [`Self::is_epoch_boundary`] without a lower
    /// previous height.
    pub fn crosses_epoch_boundary(&self, previous: Option<u64>, epoch_length: u64) -> bool {
        match previous {
            Some(previous) if epoch_length != 0 && previous < self.number => {
                previous / epoch_length != self.number / epoch_length
            }
            _ => self.is_epoch_boundary(epoch_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_boundary() {
        let header = BlockHeader { number: 400, ..Default::default() };
        assert!(header.is_epoch_boundary(200));
        assert!(!header.is_epoch_boundary(300));
        assert!(!header.is_epoch_boundary(0));

        let genesis = BlockHeader::default();
        assert!(genesis.is_epoch_boundary(200));
    }

    #[test]
    fn test_crosses_epoch_boundary() {
        let header = |number| BlockHeader { number, ..Default::default() };

        assert!(header(400).crosses_epoch_boundary(Some(399), 200));
        assert!(header(401).crosses_epoch_boundary(Some(399), 200));
        assert!(!header(401).crosses_epoch_boundary(Some(400), 200));
        assert!(!header(399).crosses_epoch_boundary(Some(201), 200));
        assert!(!header(401).crosses_epoch_boundary(Some(399), 0));

        // first head or a reorg to a lower height only checks the head itself
        assert!(header(400).crosses_epoch_boundary(None, 200));
        assert!(!header(401).crosses_epoch_boundary(None, 200));
        assert!(header(400).crosses_epoch_boundary(Some(405), 200));
        assert!(!header(399).crosses_epoch_boundary(Some(405), 200));
    }
}
