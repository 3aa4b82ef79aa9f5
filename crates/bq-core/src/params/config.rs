//! `SimulationParameters`: the validated, typed configuration a run is
//! built from, plus the validation pass that replaces the original's
//! reflection-based `Parameters` class (spec.md design note).

use std::collections::HashSet;

use crate::error::{Result, SimError};
use crate::sim::FeeSource;

use super::csv_loader::RawParameterSet;

const REQUIRED_CORE: &[&str] = &[
    "b", "tau", "sigma", "upsilon", "lambda", "mu1", "mu2", "C", "D", "omega", "S", "beta", "T",
    "alpha",
];

const DISCRETE_FEE_NAMES: &[&str] = &["ratios"];
const TRUNCNORM_FEE_NAMES: &[&str] = &["fee_min", "fee_loc", "fee_max", "fee_scale"];

/// Which fee model a parameter set specifies. Mutually exclusive with
/// its counterpart: supplying both, or neither, is a validation error.
#[derive(Debug, Clone)]
pub enum FeeSourceParams {
    Discrete(Vec<f64>),
    TruncatedNormal {
        min: f64,
        loc: f64,
        max: f64,
        scale: f64,
    },
}

impl FeeSourceParams {
    pub fn into_source(self) -> FeeSource {
        match self {
            FeeSourceParams::Discrete(values) => FeeSource::Discrete(values),
            FeeSourceParams::TruncatedNormal {
                min,
                loc,
                max,
                scale,
            } => FeeSource::TruncatedNormal {
                min,
                loc,
                max,
                scale,
            },
        }
    }
}

/// Fully validated simulation configuration, ready to build schedulers
/// and a `QueueConfig` from.
#[derive(Debug, Clone)]
pub struct SimulationParameters {
    pub b: usize,
    pub tau: f64,
    pub sigma: f64,
    pub upsilon: f64,
    pub lambda: f64,
    pub mu1: f64,
    pub mu2: f64,
    pub c: Vec<Vec<f64>>,
    pub d: Vec<Vec<f64>>,
    pub omega: Vec<f64>,
    pub s: Vec<Vec<f64>>,
    pub beta: Vec<f64>,
    pub t: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    /// Always present: `from_raw` rejects a parameter set with neither fee
    /// model, per spec.md §6's required-name list.
    pub fees: FeeSourceParams,
}

impl SimulationParameters {
    /// Validates `raw` against the exact rule set in spec.md §6, failing
    /// fast on the first violation encountered below.
    pub fn from_raw(raw: RawParameterSet) -> Result<Self> {
        let present: HashSet<&str> = raw.keys().map(String::as_str).collect();

        let missing: Vec<String> = REQUIRED_CORE
            .iter()
            .filter(|name| !present.contains(*name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SimError::MissingParameter(missing));
        }

        let has_discrete = DISCRETE_FEE_NAMES.iter().all(|n| present.contains(n));
        let has_truncnorm = TRUNCNORM_FEE_NAMES.iter().all(|n| present.contains(n));
        let has_any_discrete = DISCRETE_FEE_NAMES.iter().any(|n| present.contains(n));
        let has_any_truncnorm = TRUNCNORM_FEE_NAMES.iter().any(|n| present.contains(n));

        if has_discrete && has_truncnorm {
            return Err(SimError::ExtraneousParameter(
                TRUNCNORM_FEE_NAMES.iter().map(|s| s.to_string()).collect(),
            ));
        }
        if has_any_discrete && !has_discrete {
            return Err(SimError::MissingParameter(
                DISCRETE_FEE_NAMES.iter().map(|s| s.to_string()).collect(),
            ));
        }
        if has_any_truncnorm && !has_truncnorm {
            return Err(SimError::MissingParameter(
                TRUNCNORM_FEE_NAMES.iter().map(|s| s.to_string()).collect(),
            ));
        }
        if !has_discrete && !has_truncnorm {
            return Err(SimError::MissingParameter(vec![
                "ratios (or fee_min, fee_loc, fee_max, fee_scale)".to_string(),
            ]));
        }

        let mut recognized: HashSet<&str> = REQUIRED_CORE.iter().copied().collect();
        if has_discrete {
            recognized.extend(DISCRETE_FEE_NAMES.iter().copied());
        }
        if has_truncnorm {
            recognized.extend(TRUNCNORM_FEE_NAMES.iter().copied());
        }
        let extraneous: Vec<String> = present
            .iter()
            .filter(|name| !recognized.contains(*name))
            .map(|name| name.to_string())
            .collect();
        if !extraneous.is_empty() {
            return Err(SimError::ExtraneousParameter(extraneous));
        }

        let b_raw = raw["b"].as_scalar("b")?;
        let b_int = b_raw as i64;
        if b_int <= 0 || (b_int as f64 - b_raw).abs() > f64::EPSILON {
            return Err(SimError::InvalidBlockCapacity(b_int));
        }
        let b = b_int as usize;

        let tau = raw["tau"].as_scalar("tau")?;
        let mut sigma = raw["sigma"].as_scalar("sigma")?;
        let mut upsilon = raw["upsilon"].as_scalar("upsilon")?;
        if (0.0..1.0).contains(&sigma) {
            sigma *= tau;
        }
        if (0.0..1.0).contains(&upsilon) {
            upsilon *= tau;
        }
        if !(0.0 <= sigma && sigma < tau) {
            return Err(SimError::InvalidWindow(format!(
                "sigma must satisfy 0 <= sigma < tau, got sigma={sigma}, tau={tau}"
            )));
        }
        if upsilon <= 0.0 {
            return Err(SimError::InvalidWindow(format!(
                "upsilon must be strictly positive, got {upsilon}"
            )));
        }

        let lambda = positive_rate(&raw, "lambda")?;
        let mu1 = positive_rate(&raw, "mu1")?;
        let mu2 = positive_rate(&raw, "mu2")?;

        let c = raw["C"].as_matrix("C")?;
        let d = raw["D"].as_matrix("D")?;
        let omega = raw["omega"].as_vector("omega")?;
        require_equal_dims("C, D, omega", &[c.len(), d.len(), omega.len()])?;

        let s = raw["S"].as_matrix("S")?;
        let beta = raw["beta"].as_vector("beta")?;
        require_equal_dims("S, beta", &[s.len(), beta.len()])?;

        let t = raw["T"].as_matrix("T")?;
        let alpha = raw["alpha"].as_vector("alpha")?;
        require_equal_dims("T, alpha", &[t.len(), alpha.len()])?;

        let fees = if has_discrete {
            FeeSourceParams::Discrete(raw["ratios"].as_vector("ratios")?)
        } else {
            let min = raw["fee_min"].as_scalar("fee_min")?;
            let loc = raw["fee_loc"].as_scalar("fee_loc")?;
            let max = raw["fee_max"].as_scalar("fee_max")?;
            let scale = raw["fee_scale"].as_scalar("fee_scale")?;
            if scale <= 0.0 {
                return Err(SimError::InvalidFeeDistribution(format!(
                    "fee_scale must be strictly positive, got {scale}"
                )));
            }
            if !(min < max) {
                return Err(SimError::InvalidFeeDistribution(format!(
                    "fee_min must be less than fee_max, got fee_min={min}, fee_max={max}"
                )));
            }
            FeeSourceParams::TruncatedNormal {
                min,
                loc,
                max,
                scale,
            }
        };

        Ok(Self {
            b,
            tau,
            sigma,
            upsilon,
            lambda,
            mu1,
            mu2,
            c,
            d,
            omega,
            s,
            beta,
            t,
            alpha,
            fees,
        })
    }
}

fn positive_rate(raw: &RawParameterSet, name: &str) -> Result<f64> {
    let value = raw[name].as_scalar(name)?;
    if value <= 0.0 {
        return Err(SimError::InvalidRate {
            name: name.to_string(),
            value,
        });
    }
    Ok(value)
}

fn require_equal_dims(context: &str, dims: &[usize]) -> Result<()> {
    let first = dims[0];
    for &d in &dims[1..] {
        if d != first {
            return Err(SimError::DimensionMismatch {
                context: context.to_string(),
                a: first,
                b: d,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::csv_loader::CsvValue;

    fn base_set() -> RawParameterSet {
        let mut raw = RawParameterSet::new();
        raw.insert("b".into(), CsvValue::Scalar(1000.0));
        raw.insert("tau".into(), CsvValue::Scalar(600000.0));
        raw.insert("sigma".into(), CsvValue::Scalar(0.0));
        raw.insert("upsilon".into(), CsvValue::Scalar(600.0));
        raw.insert("lambda".into(), CsvValue::Scalar(0.7));
        raw.insert("mu1".into(), CsvValue::Scalar(10.0));
        raw.insert("mu2".into(), CsvValue::Scalar(590.0));
        raw.insert(
            "C".into(),
            CsvValue::Matrix(vec![vec![-1.3, 0.3], vec![0.5, -1.5]]),
        );
        raw.insert(
            "D".into(),
            CsvValue::Matrix(vec![vec![0.05, 0.95], vec![0.15, 0.85]]),
        );
        raw.insert("omega".into(), CsvValue::Vector(vec![0.5, 0.5]));
        raw.insert(
            "S".into(),
            CsvValue::Matrix(vec![vec![-0.1, 0.08], vec![0.06, -0.1]]),
        );
        raw.insert("beta".into(), CsvValue::Vector(vec![0.5, 0.5]));
        raw.insert(
            "T".into(),
            CsvValue::Matrix(vec![vec![-0.2, 0.1], vec![0.1, -0.2]]),
        );
        raw.insert("alpha".into(), CsvValue::Vector(vec![0.5, 0.5]));
        raw.insert("ratios".into(), CsvValue::Vector(vec![1.0, 2.0, 5.0]));
        raw
    }

    #[test]
    fn missing_core_parameter_is_rejected() {
        let mut raw = base_set();
        raw.remove("tau");
        let err = SimulationParameters::from_raw(raw).unwrap_err();
        assert!(matches!(err, SimError::MissingParameter(_)));
    }

    #[test]
    fn both_fee_models_is_rejected() {
        let mut raw = base_set();
        raw.insert("fee_min".into(), CsvValue::Scalar(0.0));
        raw.insert("fee_loc".into(), CsvValue::Scalar(1.0));
        raw.insert("fee_max".into(), CsvValue::Scalar(2.0));
        raw.insert("fee_scale".into(), CsvValue::Scalar(1.0));
        let err = SimulationParameters::from_raw(raw).unwrap_err();
        assert!(matches!(err, SimError::ExtraneousParameter(_)));
    }

    #[test]
    fn neither_fee_model_is_rejected() {
        let mut raw = base_set();
        raw.remove("ratios");
        let err = SimulationParameters::from_raw(raw).unwrap_err();
        assert!(matches!(err, SimError::MissingParameter(_)));
    }

    #[test]
    fn sigma_as_fraction_of_tau_is_converted() {
        let mut raw = base_set();
        raw.insert("sigma".into(), CsvValue::Scalar(0.5));
        let params = SimulationParameters::from_raw(raw).unwrap();
        assert!((params.sigma - 300000.0).abs() < 1e-9);
    }

    #[test]
    fn discrete_fee_model_loads_its_ratios() {
        let params = SimulationParameters::from_raw(base_set()).unwrap();
        assert!(matches!(params.fees, FeeSourceParams::Discrete(_)));
    }

    #[test]
    fn truncated_normal_with_nonpositive_scale_is_rejected() {
        let mut raw = base_set();
        raw.remove("ratios");
        raw.insert("fee_min".into(), CsvValue::Scalar(0.0));
        raw.insert("fee_loc".into(), CsvValue::Scalar(1.0));
        raw.insert("fee_max".into(), CsvValue::Scalar(2.0));
        raw.insert("fee_scale".into(), CsvValue::Scalar(0.0));
        let err = SimulationParameters::from_raw(raw).unwrap_err();
        assert!(matches!(err, SimError::InvalidFeeDistribution(_)));
    }

    #[test]
    fn truncated_normal_with_min_not_below_max_is_rejected() {
        let mut raw = base_set();
        raw.remove("ratios");
        raw.insert("fee_min".into(), CsvValue::Scalar(2.0));
        raw.insert("fee_loc".into(), CsvValue::Scalar(1.0));
        raw.insert("fee_max".into(), CsvValue::Scalar(2.0));
        raw.insert("fee_scale".into(), CsvValue::Scalar(1.0));
        let err = SimulationParameters::from_raw(raw).unwrap_err();
        assert!(matches!(err, SimError::InvalidFeeDistribution(_)));
    }

    #[test]
    fn dimension_mismatch_between_c_and_omega_is_rejected() {
        let mut raw = base_set();
        raw.insert("omega".into(), CsvValue::Vector(vec![1.0, 0.0, 0.0]));
        let err = SimulationParameters::from_raw(raw).unwrap_err();
        assert!(matches!(err, SimError::DimensionMismatch { .. }));
    }
}
