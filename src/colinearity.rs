//! Cross-validation of two independently fitted line sets.
//!
//! Set A comes from the contrast-processed image, set B from the rectangle
//! mask. Their top-N lines are compared in a fixed order and the first
//! failing test rejects:
//!
//! 1. mean ρ of A vs. mean ρ of B (`dro`);
//! 2. θ spread within A (`theta_thresh`);
//! 3. θ spread within B (`theta_thresh`);
//! 4. mean of the rank-paired θ differences (`line_set_thresh`).
//!
//! Ranks missing from a set (fewer than N lines) count as ρ = θ = 0.
use crate::hough::LineSet;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Thresholds of the four tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColinearityThresholds {
    /// Number of top-ranked lines compared from each set.
    pub top_n: usize,
    /// Maximum distance between the mean ρ of the two sets, in pixels.
    pub dro: f64,
    /// Maximum θ spread within one set, in radians.
    pub theta_thresh: f64,
    /// Maximum mean θ difference between the sets, in radians.
    pub line_set_thresh: f64,
}

impl Default for ColinearityThresholds {
    fn default() -> Self {
        Self {
            top_n: 3,
            dro: 25.0,
            theta_thresh: 0.15,
            line_set_thresh: 0.15,
        }
    }
}

/// The test that rejected a pair of sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColinearityTest {
    RhoMean,
    SpreadA,
    SpreadB,
    SetAngle,
}

impl fmt::Display for ColinearityTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColinearityTest::RhoMean => "rho test",
            ColinearityTest::SpreadA => "processed image theta test",
            ColinearityTest::SpreadB => "rectangle mask theta test",
            ColinearityTest::SetAngle => "line set theta test",
        };
        f.write_str(name)
    }
}

/// Quantities the tests were evaluated on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColinearityMetrics {
    pub rho_a: Vec<f64>,
    pub rho_b: Vec<f64>,
    pub theta_a: Vec<f64>,
    pub theta_b: Vec<f64>,
    pub rho_mean_diff: f64,
    pub spread_a: f64,
    pub spread_b: f64,
    pub mean_theta_diff: f64,
}

/// Result of a comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum ColinearityVerdict {
    Accepted {
        metrics: ColinearityMetrics,
    },
    Rejected {
        failed: ColinearityTest,
        metrics: ColinearityMetrics,
    },
}

impl ColinearityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ColinearityVerdict::Accepted { .. })
    }

    pub fn metrics(&self) -> &ColinearityMetrics {
        match self {
            ColinearityVerdict::Accepted { metrics } => metrics,
            ColinearityVerdict::Rejected { metrics, .. } => metrics,
        }
    }
}

/// Compares line sets against fixed thresholds.
#[derive(Clone, Debug, Default)]
pub struct ColinearityValidator {
    thresholds: ColinearityThresholds,
    verbose: bool,
}

fn padded(set: &LineSet, n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rho = vec![0.0; n];
    let mut theta = vec![0.0; n];
    for (i, line) in set.top(n).iter().enumerate() {
        rho[i] = line.rho;
        theta[i] = line.theta;
    }
    (rho, theta)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn spread(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if values.is_empty() {
        0.0
    } else {
        max - min
    }
}

impl ColinearityValidator {
    pub fn new(thresholds: ColinearityThresholds) -> Self {
        Self {
            thresholds,
            verbose: false,
        }
    }

    /// Log measurements at `info` level instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn thresholds(&self) -> &ColinearityThresholds {
        &self.thresholds
    }

    pub fn validate(&self, a: &LineSet, b: &LineSet) -> ColinearityVerdict {
        let t = &self.thresholds;
        let (rho_a, theta_a) = padded(a, t.top_n);
        let (rho_b, theta_b) = padded(b, t.top_n);
        let diffs: Vec<f64> = theta_a.iter().zip(&theta_b).map(|(x, y)| x - y).collect();

        let metrics = ColinearityMetrics {
            rho_mean_diff: (mean(&rho_a) - mean(&rho_b)).abs(),
            spread_a: spread(&theta_a),
            spread_b: spread(&theta_b),
            mean_theta_diff: mean(&diffs).abs(),
            rho_a,
            rho_b,
            theta_a,
            theta_b,
        };

        let failed = if metrics.rho_mean_diff > t.dro {
            Some(ColinearityTest::RhoMean)
        } else if metrics.spread_a > t.theta_thresh {
            Some(ColinearityTest::SpreadA)
        } else if metrics.spread_b > t.theta_thresh {
            Some(ColinearityTest::SpreadB)
        } else if metrics.mean_theta_diff > t.line_set_thresh {
            Some(ColinearityTest::SetAngle)
        } else {
            None
        };

        let summary = format!(
            "rho A {:?} B {:?} |Δmean| {:.3} (dro {}); theta A {:?} spread {:.3}, B {:?} spread {:.3} (thresh {}); |mean Δθ| {:.3} (thresh {})",
            metrics.rho_a,
            metrics.rho_b,
            metrics.rho_mean_diff,
            t.dro,
            metrics.theta_a,
            metrics.spread_a,
            metrics.theta_b,
            metrics.spread_b,
            t.theta_thresh,
            metrics.mean_theta_diff,
            t.line_set_thresh
        );
        let outcome = match failed {
            Some(test) => format!("{test} failed"),
            None => "all tests passed".to_string(),
        };
        if self.verbose {
            info!("colinearity: {summary}: {outcome}");
        } else {
            debug!("colinearity: {summary}: {outcome}");
        }

        match failed {
            Some(failed) => ColinearityVerdict::Rejected { failed, metrics },
            None => ColinearityVerdict::Accepted { metrics },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(dro: f64) -> ColinearityValidator {
        ColinearityValidator::new(ColinearityThresholds {
            top_n: 2,
            dro,
            theta_thresh: 0.15,
            line_set_thresh: 0.15,
        })
    }

    fn failed(v: &ColinearityVerdict) -> Option<ColinearityTest> {
        match v {
            ColinearityVerdict::Accepted { .. } => None,
            ColinearityVerdict::Rejected { failed, .. } => Some(*failed),
        }
    }

    #[test]
    fn identical_sets_are_accepted() {
        let a = LineSet::from_pairs(&[(100.0, 0.1), (101.0, 0.1)]);
        let b = LineSet::from_pairs(&[(100.0, 0.1), (101.0, 0.1)]);
        let v = validator(20.0).validate(&a, &b);
        assert!(v.is_accepted());
        assert_eq!(v.metrics().rho_mean_diff, 0.0);
    }

    #[test]
    fn wide_spread_in_a_rejects_whatever_b_holds() {
        let a = LineSet::from_pairs(&[(100.0, 0.0), (100.0, 0.30)]);
        for b in [
            LineSet::from_pairs(&[(100.0, 0.0), (100.0, 0.30)]),
            LineSet::from_pairs(&[(100.0, 0.1), (100.0, 0.1)]),
            LineSet::default(),
        ] {
            let v = validator(1e9).validate(&a, &b);
            assert!(!v.is_accepted());
        }
        let b = LineSet::from_pairs(&[(100.0, 0.1), (100.0, 0.1)]);
        assert_eq!(failed(&validator(1e9).validate(&a, &b)), Some(ColinearityTest::SpreadA));
    }

    #[test]
    fn wide_spread_in_b_rejects() {
        let a = LineSet::from_pairs(&[(50.0, 1.0), (50.0, 1.0)]);
        let b = LineSet::from_pairs(&[(50.0, 1.0), (50.0, 1.2)]);
        assert_eq!(failed(&validator(20.0).validate(&a, &b)), Some(ColinearityTest::SpreadB));
    }

    #[test]
    fn distant_rho_rejects_first() {
        let a = LineSet::from_pairs(&[(10.0, 0.0), (10.0, 0.5)]);
        let b = LineSet::from_pairs(&[(60.0, 0.0), (60.0, 0.0)]);
        assert_eq!(failed(&validator(20.0).validate(&a, &b)), Some(ColinearityTest::RhoMean));
    }

    #[test]
    fn parallel_but_rotated_sets_reject_on_set_angle() {
        let a = LineSet::from_pairs(&[(50.0, 1.0), (50.0, 1.0)]);
        let b = LineSet::from_pairs(&[(50.0, 1.25), (50.0, 1.25)]);
        assert_eq!(failed(&validator(20.0).validate(&a, &b)), Some(ColinearityTest::SetAngle));
    }

    #[test]
    fn missing_ranks_count_as_zero() {
        let v = ColinearityValidator::new(ColinearityThresholds {
            top_n: 3,
            ..ColinearityThresholds::default()
        });
        let a = LineSet::from_pairs(&[(90.0, 0.5)]);
        let b = LineSet::from_pairs(&[(90.0, 0.5)]);
        let verdict = v.validate(&a, &b);
        assert_eq!(verdict.metrics().theta_a, vec![0.5, 0.0, 0.0]);
        assert_eq!(failed(&verdict), Some(ColinearityTest::SpreadA));

        let empty = v.validate(&LineSet::default(), &LineSet::default());
        assert!(empty.is_accepted());
    }
}
