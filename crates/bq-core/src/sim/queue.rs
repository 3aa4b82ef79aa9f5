//! The queue simulator: consumes events from a scheduler, maintains the
//! mempool, forms blocks, and records measures within `[sigma, tau)`.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::rng::RngFacade;
use crate::scheduler::{Event, Scheduler};

use super::fees::FeeSource;
use super::mempool::Mempool;
use super::model::{Block, BlockId, RoomState, Transaction, TxId};

/// Configuration for a single simulation run.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum transactions per block.
    pub b: usize,
    /// Warm-up threshold: new records begin at this time.
    pub sigma: f64,
    /// End of new-measure recording.
    pub tau: f64,
    /// Extra cool-down after `tau` so blocks selected just before it can
    /// still have their mining recorded.
    pub upsilon: f64,
    /// Whether transactions carry fees and are selected in fee order.
    pub fees: bool,
}

/// The recorded output of a run: transactions, blocks and mempool
/// samples observed within the recording window.
pub struct SimulationOutput {
    pub transactions: Vec<Transaction>,
    pub blocks: Vec<Block>,
    pub room_states: Vec<RoomState>,
}

/// Drives `scheduler` through a full run, maintaining the mempool and
/// recording measures in `[sigma, tau)`.
pub struct QueueSimulator<S: Scheduler> {
    scheduler: S,
    config: QueueConfig,
    rng: RngFacade,
    fee_source: Option<FeeSource>,

    tx_arena: HashMap<TxId, Transaction>,
    next_tx_id: TxId,
    block_arena: HashMap<BlockId, Block>,
    next_block_id: BlockId,

    mempool: Mempool,
    current_batch: Vec<TxId>,
    current_block_id: Option<BlockId>,

    recorded_tx: Vec<TxId>,
    recorded_blocks: Vec<BlockId>,
    recorded_rooms: Vec<RoomState>,
}

impl<S: Scheduler> QueueSimulator<S> {
    /// Builds a simulator. `rng` is the simulator's own stream, used for
    /// shuffling random-mode selections and sampling fees; it must be
    /// distinct from every stream owned by `scheduler`.
    pub fn new(
        scheduler: S,
        config: QueueConfig,
        rng: RngFacade,
        fee_source: Option<FeeSource>,
    ) -> Self {
        let mempool = Mempool::new(config.fees);
        Self {
            scheduler,
            config,
            rng,
            fee_source,
            tx_arena: HashMap::new(),
            next_tx_id: 0,
            block_arena: HashMap::new(),
            next_block_id: 0,
            mempool,
            current_batch: Vec::new(),
            current_block_id: None,
            recorded_tx: Vec::new(),
            recorded_blocks: Vec::new(),
            recorded_rooms: Vec::new(),
        }
    }

    fn in_window(&self, t: f64) -> bool {
        self.config.sigma <= t && t < self.config.tau
    }

    fn on_arrival(&mut self) {
        let t = self.scheduler.t();
        let fee = if self.config.fees {
            self.fee_source
                .as_ref()
                .map(|source| source.sample(&mut self.rng))
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let id = self.next_tx_id;
        self.next_tx_id += 1;
        let tx = Transaction {
            id,
            fee,
            arrival: t,
            selection: None,
            mining: None,
        };
        self.mempool.insert(&tx);
        self.tx_arena.insert(id, tx);

        if self.in_window(t) {
            self.recorded_tx.push(id);
            self.recorded_rooms.push(RoomState {
                t,
                size: self.mempool.len(),
            });
        }
        debug!(t, mempool_size = self.mempool.len(), "arrival");
    }

    fn on_selection(&mut self) {
        let t = self.scheduler.t();
        let batch = self.mempool.select(self.config.b, &mut self.rng);

        for id in &batch {
            if let Some(tx) = self.tx_arena.get_mut(id) {
                tx.selection = Some(t);
            }
        }

        let block_id = self.next_block_id;
        self.next_block_id += 1;
        self.block_arena.insert(
            block_id,
            Block {
                id: block_id,
                selection: t,
                size: batch.len(),
                mining: None,
            },
        );
        self.current_block_id = Some(block_id);
        self.current_batch = batch;

        if self.in_window(t) {
            self.recorded_blocks.push(block_id);
            self.recorded_rooms.push(RoomState {
                t,
                size: self.mempool.len(),
            });
        }
        info!(t, size = self.current_batch.len(), "selection");
    }

    fn on_mining(&mut self) {
        let t = self.scheduler.t();
        if let Some(block_id) = self.current_block_id {
            if let Some(block) = self.block_arena.get_mut(&block_id) {
                block.mining = Some(t);
            }
        }
        for id in &self.current_batch {
            if let Some(tx) = self.tx_arena.get_mut(id) {
                tx.mining = Some(t);
            }
        }
        info!(t, "mining");
    }

    /// Runs until `scheduler.t() >= tau + upsilon`, then returns the
    /// recorded measures.
    pub fn run(mut self) -> Result<SimulationOutput> {
        let end = self.config.tau + self.config.upsilon;
        while self.scheduler.t() < end {
            match self.scheduler.next()? {
                Event::Arrival => self.on_arrival(),
                Event::Selection => self.on_selection(),
                Event::Mining => self.on_mining(),
            }
        }

        let unmined = self
            .recorded_tx
            .iter()
            .filter(|id| self.tx_arena[id].mining.is_none())
            .count();
        if unmined > 0 {
            warn!(
                unmined,
                "recorded transactions never reached mining before the cool-down elapsed"
            );
        }

        let transactions = self
            .recorded_tx
            .iter()
            .map(|id| self.tx_arena[id].clone())
            .collect();
        let blocks = self
            .recorded_blocks
            .iter()
            .map(|id| self.block_arena[id].clone())
            .collect();

        Ok(SimulationOutput {
            transactions,
            blocks,
            room_states: self.recorded_rooms,
        })
    }
}
