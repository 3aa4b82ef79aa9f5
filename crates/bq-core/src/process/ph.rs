//! Phase-Type (PH) processes: the selection and mining service phases.

use crate::error::{Result, SimError};
use crate::rng::RngFacade;

use super::stateful::Stateful;

/// Which service phase a `Ph` represents. Only one `Ph` is active at a
/// time; absorption of the active one emits the matching event and swaps
/// it out for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhLabel {
    /// "Choose up to b transactions" phase — absorption emits `selection`.
    Selection,
    /// Mining phase — absorption emits `mining`.
    Mining,
}

/// A PH process: a Stateful process with sub-generator `M` and a
/// precomputed absorption-rate vector (`-rowsum(M)` per state).
#[derive(Debug, Clone)]
pub struct Ph {
    stateful: Stateful,
    m: Vec<Vec<f64>>,
    absorb: Vec<f64>,
    pub label: PhLabel,
}

impl Ph {
    /// Builds a PH process from sub-generator `m` and stationary vector `v`.
    pub fn new(rng: &mut RngFacade, m: Vec<Vec<f64>>, v: Vec<f64>, label: PhLabel) -> Result<Self> {
        let dim = m.len();
        if v.len() != dim {
            return Err(SimError::DimensionMismatch {
                context: format!("{label:?} sub-generator and stationary vector"),
                a: dim,
                b: v.len(),
            });
        }
        for row in &m {
            if row.len() != dim {
                return Err(SimError::DimensionMismatch {
                    context: format!("{label:?} sub-generator row length"),
                    a: dim,
                    b: row.len(),
                });
            }
        }

        let absorb: Vec<f64> = m.iter().map(|row| -row.iter().sum::<f64>()).collect();
        let stateful = Stateful::new(rng, v)?;
        Ok(Self {
            stateful,
            m,
            absorb,
            label,
        })
    }

    /// Current phase.
    pub fn state(&self) -> usize {
        self.stateful.state()
    }

    /// Overwrites the current phase.
    pub fn set_state(&mut self, state: usize) {
        self.stateful.set_state(state);
    }

    /// Number of transient phases, `m`.
    pub fn dim(&self) -> usize {
        self.stateful.dim()
    }

    /// Row `state` of `M`.
    pub fn m_row(&self, state: usize) -> &[f64] {
        &self.m[state]
    }

    /// Absorption rate at `state`.
    pub fn absorb_at(&self, state: usize) -> f64 {
        self.absorb[state]
    }

    /// `-M[state][state]`, the PH's contribution to the combined diagonal rate.
    pub fn diag_at(&self, state: usize) -> f64 {
        -self.m[state][state]
    }

    /// Re-samples the phase from the stationary vector (absorption).
    pub fn reset_state(&mut self, rng: &mut RngFacade) {
        self.stateful.reset_state(rng);
    }
}
