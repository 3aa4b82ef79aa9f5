//! Stateful process: the common base of `Map` and `Ph`.

use crate::error::{Result, SimError};
use crate::rng::RngFacade;

/// Tolerance applied when checking that a stationary vector sums to 1.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// A process with a discrete state drawn from a stationary distribution.
///
/// The state is just an index into `distribution`; `Map` and `Ph` attach
/// the matrices that give that index meaning.
#[derive(Debug, Clone)]
pub struct Stateful {
    distribution: Vec<f64>,
    state: usize,
}

impl Stateful {
    /// Builds a process whose initial state is sampled from `distribution`.
    ///
    /// Fails with `InvalidDistribution` if `distribution` does not sum to
    /// 1 within `DISTRIBUTION_TOLERANCE`.
    pub fn new(rng: &mut RngFacade, distribution: Vec<f64>) -> Result<Self> {
        let sum: f64 = distribution.iter().sum();
        if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(SimError::InvalidDistribution {
                sum,
                tolerance: DISTRIBUTION_TOLERANCE,
            });
        }
        let state = rng.choice(&distribution);
        Ok(Self { distribution, state })
    }

    /// Current state.
    pub fn state(&self) -> usize {
        self.state
    }

    /// Overwrites the current state (used by hidden-transition steps).
    pub fn set_state(&mut self, state: usize) {
        self.state = state;
    }

    /// Number of possible states.
    pub fn dim(&self) -> usize {
        self.distribution.len()
    }

    /// Re-samples the state from the stationary distribution.
    pub fn reset_state(&mut self, rng: &mut RngFacade) {
        self.state = rng.choice(&self.distribution);
    }
}
