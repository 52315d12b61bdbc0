//! Hough-space line fitting.
//!
//! [`LineFitter`] is a thin transform: every nonzero pixel votes, local
//! maxima above the vote threshold are returned strongest first. It does not
//! interpret the lines it finds.

pub mod accumulator;

pub use accumulator::{HoughAccumulator, Peak, Votes};

use crate::image::ImageU8;
use crate::types::LineEndpoints;
use log::warn;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Accumulator resolution and vote floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoughOptions {
    /// Distance resolution in pixels.
    pub rho_resolution: f64,
    /// Angle resolution in radians.
    pub theta_resolution: f64,
    /// Peaks need strictly more votes than this.
    pub vote_threshold: Votes,
}

impl Default for HoughOptions {
    fn default() -> Self {
        Self {
            rho_resolution: 20.0,
            theta_resolution: PI / 180.0,
            vote_threshold: 1,
        }
    }
}

/// A line `x·cosθ + y·sinθ = ρ` and its votes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineCandidate {
    pub rho: f64,
    pub theta: f64,
    pub votes: Votes,
}

impl LineCandidate {
    pub fn new(rho: f64, theta: f64, votes: Votes) -> Self {
        Self { rho, theta, votes }
    }
}

/// Vote-ranked lines, strongest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineSet {
    lines: Vec<LineCandidate>,
}

impl LineSet {
    /// Build a set from lines already in rank order.
    pub fn from_ranked(lines: Vec<LineCandidate>) -> Self {
        Self { lines }
    }

    /// Build a set from `(rho, theta)` pairs in rank order, without votes.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::from_ranked(pairs.iter().map(|&(r, t)| LineCandidate::new(r, t, 0)).collect())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn first(&self) -> Option<&LineCandidate> {
        self.lines.first()
    }

    /// The first `n` lines, or all of them if there are fewer.
    pub fn top(&self, n: usize) -> &[LineCandidate] {
        &self.lines[..n.min(self.lines.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineCandidate> {
        self.lines.iter()
    }
}

/// Hough line transform with fixed options.
#[derive(Clone, Debug, Default)]
pub struct LineFitter {
    opts: HoughOptions,
}

impl LineFitter {
    pub fn new(opts: HoughOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &HoughOptions {
        &self.opts
    }

    pub fn fit(&self, image: &ImageU8) -> LineSet {
        let Some(mut acc) = HoughAccumulator::new(
            image.w,
            image.h,
            self.opts.rho_resolution,
            self.opts.theta_resolution,
        ) else {
            warn!(
                "invalid Hough resolution rho={} theta={}",
                self.opts.rho_resolution, self.opts.theta_resolution
            );
            return LineSet::default();
        };
        acc.accumulate(image);
        let lines = acc
            .peaks(self.opts.vote_threshold)
            .into_iter()
            .map(|p| LineCandidate::new(acc.rho_of(p.rho_idx), acc.theta_of(p.theta_idx), p.votes))
            .collect();
        LineSet::from_ranked(lines)
    }
}

/// Two far points on `line`, each `width + height` pixels from the foot of
/// the perpendicular from the origin, truncated toward zero.
pub fn project_endpoints(line: &LineCandidate, width: usize, height: usize) -> LineEndpoints {
    let (sin, cos) = line.theta.sin_cos();
    let x0 = cos * line.rho;
    let y0 = sin * line.rho;
    let d = (width + height) as f64;
    LineEndpoints {
        x1: (x0 - d * sin) as i64,
        y1: (y0 + d * cos) as i64,
        x2: (x0 + d * sin) as i64,
        y2: (y0 - d * cos) as i64,
    }
}
