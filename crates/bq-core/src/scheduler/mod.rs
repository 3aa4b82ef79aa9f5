//! Event schedulers: the MAP+double-PH scheduler and its M+double-M
//! exponential analogue.

pub mod m_m;
pub mod map_ph;

pub use m_m::MmScheduler;
pub use map_ph::MapPhScheduler;

use crate::error::Result;

/// The three externally visible events a scheduler can realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A transaction arrived.
    Arrival,
    /// The server finished choosing a block's worth of transactions.
    Selection,
    /// The server finished mining the selected block.
    Mining,
}

/// Common interface driven by the queue simulator.
pub trait Scheduler {
    /// Current simulated time.
    fn t(&self) -> f64;

    /// Advances time until the next externally visible event and returns it.
    fn next(&mut self) -> Result<Event>;
}
