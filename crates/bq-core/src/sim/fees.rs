//! Fee sampling: either a discrete set of ratios, or a truncated normal
//! distribution, matching `bq_core::params::FeeSourceParams`.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::rng::RngFacade;

/// A source of per-transaction fee values.
#[derive(Debug, Clone)]
pub enum FeeSource {
    /// A small discrete set of fee values, sampled uniformly.
    Discrete(Vec<f64>),
    /// A truncated normal distribution over `[min, max]`.
    TruncatedNormal {
        min: f64,
        loc: f64,
        max: f64,
        scale: f64,
    },
}

impl FeeSource {
    /// Draws a single fee value.
    pub fn sample(&self, rng: &mut RngFacade) -> f64 {
        match self {
            FeeSource::Discrete(values) => {
                let uniform_weights = vec![1.0; values.len()];
                let idx = rng.choice(&uniform_weights);
                values[idx]
            }
            FeeSource::TruncatedNormal {
                min,
                loc,
                max,
                scale,
            } => {
                let normal = Normal::new(*loc, *scale).expect(
                    "loc/scale validated by SimulationParameters::from_raw before reaching here",
                );
                let lo = normal.cdf(*min);
                let hi = normal.cdf(*max);
                let u = lo + rng.uniform() * (hi - lo);
                normal.inverse_cdf(u)
            }
        }
    }
}
