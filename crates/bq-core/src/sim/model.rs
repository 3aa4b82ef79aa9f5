//! Core data model: transactions, blocks, and mempool snapshots.

use serde::Serialize;

/// Identifier for a `Transaction`, unique within a single simulation run.
pub type TxId = u64;

/// Identifier for a `Block`, unique within a single simulation run.
pub type BlockId = u64;

/// A transaction moving through arrival, selection, and mining.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    /// Unique id within this run.
    pub id: TxId,
    /// Fee offered by the transaction (0 when fees are disabled).
    pub fee: f64,
    /// Time the transaction arrived in the mempool.
    pub arrival: f64,
    /// Time the transaction was placed into a block, if it has been.
    pub selection: Option<f64>,
    /// Time the containing block was mined, if it has been.
    pub mining: Option<f64>,
}

/// A block formed at a `selection` event and completed at the matching
/// `mining` event.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// Unique id within this run.
    pub id: BlockId,
    /// Time the block's transactions were selected.
    pub selection: f64,
    /// Number of transactions selected into the block.
    pub size: usize,
    /// Time the block was mined, if it has been.
    pub mining: Option<f64>,
}

/// A mempool-size sample taken immediately after a recorded arrival or
/// selection event.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoomState {
    /// Time of the sample.
    pub t: f64,
    /// Mempool size at that time.
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_serializes_to_json() {
        let tx = Transaction {
            id: 1,
            fee: 2.5,
            arrival: 0.1,
            selection: Some(0.4),
            mining: None,
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"mining\":null"));
        assert!(json.contains("\"fee\":2.5"));
    }
}
