//! The Markovian Arrival Process (MAP).

use crate::error::{Result, SimError};
use crate::rng::RngFacade;

use super::stateful::Stateful;

/// A MAP: a Stateful process carrying the hidden-transition matrix `C` and
/// the arrival-emitting matrix `D`. `C + D` is the generator of an
/// irreducible CTMC; `D`'s transitions are the ones that emit `arrival`.
#[derive(Debug, Clone)]
pub struct Map {
    stateful: Stateful,
    c: Vec<Vec<f64>>,
    d: Vec<Vec<f64>>,
}

impl Map {
    /// Builds a MAP from `C`, `D` and the stationary vector `omega`.
    pub fn new(
        rng: &mut RngFacade,
        c: Vec<Vec<f64>>,
        d: Vec<Vec<f64>>,
        omega: Vec<f64>,
    ) -> Result<Self> {
        let n = c.len();
        if d.len() != n || omega.len() != n {
            return Err(SimError::DimensionMismatch {
                context: "C, D and omega must share a dimension".to_string(),
                a: n,
                b: d.len().max(omega.len()),
            });
        }
        for row in c.iter().chain(d.iter()) {
            if row.len() != n {
                return Err(SimError::DimensionMismatch {
                    context: "C/D row length".to_string(),
                    a: n,
                    b: row.len(),
                });
            }
        }

        let stateful = Stateful::new(rng, omega)?;
        Ok(Self { stateful, c, d })
    }

    /// Current MAP phase.
    pub fn state(&self) -> usize {
        self.stateful.state()
    }

    /// Overwrites the current phase.
    pub fn set_state(&mut self, state: usize) {
        self.stateful.set_state(state);
    }

    /// Number of phases, `n`.
    pub fn dim(&self) -> usize {
        self.stateful.dim()
    }

    /// Row `state` of `C`.
    pub fn c_row(&self, state: usize) -> &[f64] {
        &self.c[state]
    }

    /// Row `state` of `D`.
    pub fn d_row(&self, state: usize) -> &[f64] {
        &self.d[state]
    }

    /// `-C[state][state]`, the MAP's contribution to the combined diagonal rate.
    pub fn diag_at(&self, state: usize) -> f64 {
        -self.c[state][state]
    }
}
