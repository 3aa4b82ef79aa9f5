//! Stateful processes: the base abstraction shared by the MAP and the two
//! PH processes.

pub mod map;
pub mod ph;
pub mod stateful;

pub use map::Map;
pub use ph::{Ph, PhLabel};
pub use stateful::Stateful;
