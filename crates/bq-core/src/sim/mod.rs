//! The simulation domain: the data model, the mempool, fee sampling, and
//! the queue simulator that ties them to a scheduler.

pub mod fees;
pub mod mempool;
pub mod model;
pub mod queue;

pub use fees::FeeSource;
pub use mempool::Mempool;
pub use model::{Block, BlockId, RoomState, Transaction, TxId};
pub use queue::{QueueConfig, QueueSimulator, SimulationOutput};
