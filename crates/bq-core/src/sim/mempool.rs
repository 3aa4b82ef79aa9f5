//! The mempool: either FIFO-with-random-selection, or fee-ordered.

use std::collections::{BTreeSet, HashMap, VecDeque};

use ordered_float::OrderedFloat;

use crate::rng::RngFacade;

use super::model::{Transaction, TxId};

/// Pending transactions waiting to be selected into a block.
///
/// `Random` tolerates any internal ordering and draws a uniform random
/// subset at selection time; `FeeOrdered` keeps transactions sorted by
/// fee ascending so the highest-fee entries are always at the tail,
/// mirroring `qc-06-mempool`'s `by_price` priority index.
pub enum Mempool {
    Random(VecDeque<TxId>),
    FeeOrdered(BTreeSet<(OrderedFloat<f64>, TxId)>),
}

impl Mempool {
    /// Creates an empty mempool in the mode implied by `fees`.
    pub fn new(fees: bool) -> Self {
        if fees {
            Mempool::FeeOrdered(BTreeSet::new())
        } else {
            Mempool::Random(VecDeque::new())
        }
    }

    /// Number of transactions currently pending.
    pub fn len(&self) -> usize {
        match self {
            Mempool::Random(q) => q.len(),
            Mempool::FeeOrdered(s) => s.len(),
        }
    }

    /// Whether the mempool has no pending transactions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a freshly-arrived transaction.
    pub fn insert(&mut self, tx: &Transaction) {
        match self {
            Mempool::Random(q) => q.push_back(tx.id),
            Mempool::FeeOrdered(s) => {
                s.insert((OrderedFloat(tx.fee), tx.id));
            }
        }
    }

    /// Removes and returns up to `b` transactions for the next block.
    ///
    /// When the pool has `b` or fewer entries, the whole pool is taken
    /// without reordering (fee-priority mode relies on the set already
    /// being sorted). Otherwise: fee-ordered mode takes the `b`
    /// highest-fee entries; random mode shuffles first, then takes the
    /// first `b`.
    pub fn select(&mut self, b: usize, rng: &mut RngFacade) -> Vec<TxId> {
        match self {
            Mempool::Random(q) => {
                if q.len() <= b {
                    q.drain(..).collect()
                } else {
                    let mut all: Vec<TxId> = q.drain(..).collect();
                    rng.shuffle(&mut all);
                    let rest = all.split_off(b);
                    *q = rest.into();
                    all
                }
            }
            Mempool::FeeOrdered(s) => {
                if s.len() <= b {
                    std::mem::take(s).into_iter().map(|(_, id)| id).collect()
                } else {
                    let batch_keys: Vec<(OrderedFloat<f64>, TxId)> =
                        s.iter().rev().take(b).cloned().collect();
                    for key in &batch_keys {
                        s.remove(key);
                    }
                    batch_keys.into_iter().map(|(_, id)| id).collect()
                }
            }
        }
    }

    /// Highest fee currently pending, if any.
    pub fn max_fee(&self, arena: &HashMap<TxId, Transaction>) -> Option<f64> {
        match self {
            Mempool::Random(q) => q
                .iter()
                .filter_map(|id| arena.get(id))
                .map(|tx| tx.fee)
                .fold(None, |acc, fee| Some(acc.map_or(fee, |a: f64| a.max(fee)))),
            Mempool::FeeOrdered(s) => s.iter().next_back().map(|(fee, _)| fee.into_inner()),
        }
    }
}
