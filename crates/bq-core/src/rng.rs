//! RNG facade and stream pool.
//!
//! Wraps `rand_pcg::Pcg64`, a counter-based generator whose `(state,
//! stream)` constructor gives distinct streams non-overlapping sequences —
//! the Rust analogue of the original implementation's
//! `numpy.random.SeedSequence(...).spawn(n)` over `SFC64`. Every scheduler
//! and the simulator itself owns one stream exclusively (see
//! `StreamPool::stream`); streams are never shared across components.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_pcg::Pcg64;

/// A single independent uniform/exponential/categorical source.
pub struct RngFacade {
    inner: Pcg64,
}

impl RngFacade {
    /// Builds a stream from a root seed and a stream index. Two facades
    /// built from the same seed but different indices draw from
    /// non-overlapping sequences.
    pub fn new(seed: u64, stream: u64) -> Self {
        // PCG requires an odd stream selector to guarantee a full-period,
        // non-overlapping sequence per index.
        let stream_selector = (u128::from(stream) << 1) | 1;
        Self {
            inner: Pcg64::new(u128::from(seed), stream_selector),
        }
    }

    /// Draws U ~ Uniform(0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen_range(0.0..1.0)
    }

    /// Draws Exp(mean) via inverse transform: `-mean * ln(U)`.
    ///
    /// `mean` is the *mean* of the distribution, not the rate — several
    /// call sites in the original source passed the rate by mistake while
    /// a comment insisted it was the mean; this facade always takes the
    /// mean, and callers are responsible for inverting a rate before
    /// calling it.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        -mean * self.uniform().ln()
    }

    /// Samples an index `i` with probability proportional to `weights[i]`.
    ///
    /// Treats `weights` as unnormalized; tolerates a sum that is only
    /// approximately 1 (or any positive value) by dividing through
    /// implicitly. Degenerate (all-zero) vectors are a business-logic
    /// error the caller must detect before calling this — see
    /// `scheduler::map_ph` — so this always returns a valid index.
    pub fn choice(&mut self, weights: &[f64]) -> usize {
        let sum: f64 = weights.iter().sum();
        let u = self.uniform() * sum;
        let mut acc = 0.0;
        for (i, w) in weights.iter().enumerate() {
            acc += w;
            if u < acc {
                return i;
            }
        }
        weights.len() - 1
    }

    /// Shuffles `slice` into a uniformly random permutation in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}

/// Spawns named, independent RNG streams from a single root seed.
///
/// Stream indices are consumed in a fixed, documented order so that a run
/// with a fixed seed is reproducible regardless of which scheduler is
/// selected:
///
/// - `0`: MAP's initial-phase sampling stream.
/// - `1`: selection PH's initial-phase sampling stream.
/// - `2`: mining PH's initial-phase sampling stream.
/// - `3`: MAP+PH scheduler's own holding-time/choice stream.
/// - `4`: M/M/1 arrival clock stream.
/// - `5`: M/M/1 selection clock stream.
/// - `6`: M/M/1 mining clock stream.
/// - `7`: the M/M/1 queue simulator's shuffle/fee-sampling stream.
/// - `8`: the MAP/PH/1 queue simulator's shuffle/fee-sampling stream.
///
/// M/M/1 and MAP/PH/1 get distinct simulator streams (`7` and `8`) so that
/// a single invocation running both modes never hands them the same
/// sequence of shuffle/fee draws — each run needs its own independent
/// stream set, not just its own scheduler streams.
pub struct StreamPool {
    seed: u64,
}

impl StreamPool {
    /// Creates a pool rooted at `seed`.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Returns the independent stream for `index`.
    pub fn stream(&self, index: u64) -> RngFacade {
        RngFacade::new(self.seed, index)
    }
}

pub mod stream_index {
    //! Documented stream index constants (see `StreamPool`).
    pub const MAP_INIT: u64 = 0;
    pub const SELECTION_PH_INIT: u64 = 1;
    pub const MINING_PH_INIT: u64 = 2;
    pub const MAP_PH_SCHEDULER: u64 = 3;
    pub const MM_ARRIVAL: u64 = 4;
    pub const MM_SELECTION: u64 = 5;
    pub const MM_MINING: u64 = 6;
    pub const MM1_SIMULATOR: u64 = 7;
    pub const MAPPH1_SIMULATOR: u64 = 8;
}
