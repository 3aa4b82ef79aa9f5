//! Discrete-event simulation core for a proof-of-work blockchain modeled
//! as a single-server batch-service queue, under M/M/1 and MAP/PH/1
//! disciplines.
//!
//! This crate has no I/O of its own: parameter loading reads from a
//! directory, and the simulation itself hands its recorded output back
//! in memory for a caller (the `bq-sim` binary) to format and print.

pub mod error;
pub mod params;
pub mod process;
pub mod rng;
pub mod scheduler;
pub mod sim;
pub mod stats;

pub use error::{Result, SimError};
