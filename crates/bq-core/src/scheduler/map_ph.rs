//! The MAP+double-PH scheduler — the hard core of the simulation.
//!
//! Realizes the joint CTMC on `{MAP phase} x {active PH phase}` states
//! using the standard competing-exponential construction: the next jump
//! time is `Exponential(1 / combined diagonal rate)`, and the next jump
//! target has probability proportional to its off-diagonal (or
//! absorption) rate. Hidden transitions (MAP phase changes that don't
//! emit an arrival, PH phase changes that don't absorb) are looped over
//! internally so the externally observable clock only ticks at
//! `arrival`/`selection`/`mining`.

use std::collections::HashMap;

use crate::error::{Result, SimError};
use crate::process::{Map, Ph, PhLabel};
use crate::rng::RngFacade;

use super::{Event, Scheduler};

/// Scheduler state: the MAP, the two PH processes (exactly one active at
/// a time), and the scheduler's own RNG stream for holding times and
/// competing-risk selection.
pub struct MapPhScheduler {
    t: f64,
    map: Map,
    active: Ph,
    inactive: Ph,
    rng: RngFacade,
    // One normalized-weight-vector cache per PH label, keyed by (map
    // state, active PH state). Safe to keep forever: the weights depend
    // only on those two coordinates and the (immutable) matrices, so a
    // swap never invalidates either cache.
    selection_cache: HashMap<(usize, usize), Vec<f64>>,
    mining_cache: HashMap<(usize, usize), Vec<f64>>,
}

impl MapPhScheduler {
    /// Builds a scheduler with `selection` active and `mining` inactive,
    /// per the invariant that the simulation begins in the selection phase.
    pub fn new(map: Map, selection: Ph, mining: Ph, rng: RngFacade) -> Self {
        debug_assert_eq!(selection.label, PhLabel::Selection);
        debug_assert_eq!(mining.label, PhLabel::Mining);
        Self {
            t: 0.0,
            map,
            active: selection,
            inactive: mining,
            rng,
            selection_cache: HashMap::new(),
            mining_cache: HashMap::new(),
        }
    }

    fn cache_for(&mut self, label: PhLabel) -> &mut HashMap<(usize, usize), Vec<f64>> {
        match label {
            PhLabel::Selection => &mut self.selection_cache,
            PhLabel::Mining => &mut self.mining_cache,
        }
    }

    /// Builds (or fetches from cache) the normalized competing-risk
    /// weight vector for `(map_state, ph_state)` under the currently
    /// active PH: the concatenation of row `map_state` of `C`, row
    /// `map_state` of `D`, row `ph_state` of the active `M`, and the
    /// active PH's absorption rate at `ph_state`, with negative entries
    /// (the two diagonal self-transitions) clamped to zero and the whole
    /// vector normalized to sum to 1.
    fn weight_vector(&mut self, map_state: usize, ph_state: usize) -> Result<Vec<f64>> {
        let label = self.active.label;
        let key = (map_state, ph_state);
        if let Some(cached) = self.cache_for(label).get(&key) {
            return Ok(cached.clone());
        }

        let n = self.map.dim();
        let m = self.active.dim();
        let mut weights = Vec::with_capacity(2 * n + m + 1);
        weights.extend_from_slice(self.map.c_row(map_state));
        weights.extend_from_slice(self.map.d_row(map_state));
        weights.extend_from_slice(self.active.m_row(ph_state));
        weights.push(self.active.absorb_at(ph_state));

        for w in weights.iter_mut() {
            if *w < 0.0 {
                *w = 0.0;
            }
        }

        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(SimError::DegenerateGenerator);
        }
        for w in weights.iter_mut() {
            *w /= sum;
        }

        self.cache_for(label).insert(key, weights.clone());
        Ok(weights)
    }

    #[cfg(test)]
    fn weight_vector_for_test(&mut self, map_state: usize, ph_state: usize) -> Result<Vec<f64>> {
        self.weight_vector(map_state, ph_state)
    }
}

impl Scheduler for MapPhScheduler {
    fn t(&self) -> f64 {
        self.t
    }

    fn next(&mut self) -> Result<Event> {
        loop {
            let i = self.map.state();
            let k = self.active.state();
            let lambda = self.map.diag_at(i) + self.active.diag_at(k);
            if lambda <= 0.0 {
                return Err(SimError::ZeroRate);
            }

            let dt = self.rng.exponential(1.0 / lambda);
            self.t += dt;

            let weights = self.weight_vector(i, k)?;
            let j = self.rng.choice(&weights);

            let n = self.map.dim();
            let m = self.active.dim();

            if j < n {
                // MAP hidden transition: no externally visible event.
                self.map.set_state(j);
            } else if j < 2 * n {
                self.map.set_state(j - n);
                return Ok(Event::Arrival);
            } else if j < 2 * n + m {
                // PH hidden transition: no externally visible event.
                self.active.set_state(j - 2 * n);
            } else {
                let label = self.active.label;
                // The swap happens after the label is captured, so the
                // next call begins in the other PH's freshly re-sampled
                // initial phase while this one starts its cool-down.
                self.active.reset_state(&mut self.rng);
                std::mem::swap(&mut self.active, &mut self.inactive);
                return Ok(match label {
                    PhLabel::Selection => Event::Selection,
                    PhLabel::Mining => Event::Mining,
                });
            }
        }
    }
}
