//! Summary statistics computed from a `SimulationOutput`, the Rust-native
//! replacement for the original's `numpy`/`scipy`-driven `stats.py`.

use std::fmt;

use crate::sim::SimulationOutput;

/// Aggregated measures over a single run's recorded transactions, blocks
/// and mempool samples. Any ratio or mean computed over zero eligible
/// samples is `None` rather than `NaN` or a panic.
#[derive(Debug, Clone)]
pub struct SimulationStats {
    pub transaction_count: usize,
    pub block_count: usize,
    pub pct_never_selected: f64,
    pub pct_never_mined: f64,
    pub mean_sojourn: Option<f64>,
    pub mean_waiting: Option<f64>,
    pub mean_service: Option<f64>,
    pub mean_interarrival: Option<f64>,
    pub mean_interblock: Option<f64>,
    pub mean_block_size: Option<f64>,
    pub mean_mempool_size: Option<f64>,
}

fn nanmean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn successive_diffs(mut times: Vec<f64>) -> Vec<f64> {
    times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    times.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Computes the full stats report from a finished run's recorded output.
pub fn compute_stats(output: &SimulationOutput) -> SimulationStats {
    let n = output.transactions.len();

    let never_selected = output
        .transactions
        .iter()
        .filter(|tx| tx.selection.is_none())
        .count();
    let never_mined = output
        .transactions
        .iter()
        .filter(|tx| tx.mining.is_none())
        .count();

    let pct_never_selected = if n == 0 {
        0.0
    } else {
        100.0 * never_selected as f64 / n as f64
    };
    let pct_never_mined = if n == 0 {
        0.0
    } else {
        100.0 * never_mined as f64 / n as f64
    };

    let mean_sojourn = nanmean(
        output
            .transactions
            .iter()
            .filter_map(|tx| tx.mining.map(|m| m - tx.arrival)),
    );
    let mean_waiting = nanmean(
        output
            .transactions
            .iter()
            .filter_map(|tx| tx.selection.map(|s| s - tx.arrival)),
    );
    let mean_service = nanmean(output.transactions.iter().filter_map(|tx| {
        match (tx.selection, tx.mining) {
            (Some(s), Some(m)) => Some(m - s),
            _ => None,
        }
    }));

    let arrivals: Vec<f64> = output.transactions.iter().map(|tx| tx.arrival).collect();
    let mean_interarrival = nanmean(successive_diffs(arrivals).into_iter());

    let selections: Vec<f64> = output.blocks.iter().map(|b| b.selection).collect();
    let mean_interblock = nanmean(successive_diffs(selections).into_iter());

    let mean_block_size = nanmean(output.blocks.iter().map(|b| b.size as f64));
    let mean_mempool_size = nanmean(output.room_states.iter().map(|r| r.size as f64));

    SimulationStats {
        transaction_count: n,
        block_count: output.blocks.len(),
        pct_never_selected,
        pct_never_mined,
        mean_sojourn,
        mean_waiting,
        mean_service,
        mean_interarrival,
        mean_interblock,
        mean_block_size,
        mean_mempool_size,
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "transactions recorded : {}", self.transaction_count)?;
        writeln!(f, "blocks recorded        : {}", self.block_count)?;
        writeln!(f, "never selected         : {:.2}%", self.pct_never_selected)?;
        writeln!(f, "never mined            : {:.2}%", self.pct_never_mined)?;
        writeln!(f, "mean sojourn           : {}", fmt_opt(self.mean_sojourn))?;
        writeln!(f, "mean waiting           : {}", fmt_opt(self.mean_waiting))?;
        writeln!(f, "mean service           : {}", fmt_opt(self.mean_service))?;
        writeln!(
            f,
            "mean inter-arrival     : {}",
            fmt_opt(self.mean_interarrival)
        )?;
        writeln!(
            f,
            "mean inter-block       : {}",
            fmt_opt(self.mean_interblock)
        )?;
        writeln!(
            f,
            "mean block size        : {}",
            fmt_opt(self.mean_block_size)
        )?;
        write!(
            f,
            "mean mempool size      : {}",
            fmt_opt(self.mean_mempool_size)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Block, RoomState, Transaction};

    fn output_with(transactions: Vec<Transaction>, blocks: Vec<Block>) -> SimulationOutput {
        SimulationOutput {
            transactions,
            blocks,
            room_states: vec![RoomState { t: 0.0, size: 3 }],
        }
    }

    #[test]
    fn empty_output_has_none_means_and_zero_percents() {
        let stats = compute_stats(&output_with(vec![], vec![]));
        assert_eq!(stats.transaction_count, 0);
        assert_eq!(stats.pct_never_selected, 0.0);
        assert!(stats.mean_sojourn.is_none());
    }

    #[test]
    fn fully_processed_transaction_contributes_to_all_means() {
        let tx = Transaction {
            id: 0,
            fee: 0.0,
            arrival: 1.0,
            selection: Some(2.0),
            mining: Some(5.0),
        };
        let stats = compute_stats(&output_with(vec![tx], vec![]));
        assert_eq!(stats.pct_never_selected, 0.0);
        assert_eq!(stats.pct_never_mined, 0.0);
        assert_eq!(stats.mean_sojourn, Some(4.0));
        assert_eq!(stats.mean_waiting, Some(1.0));
        assert_eq!(stats.mean_service, Some(3.0));
    }
}
