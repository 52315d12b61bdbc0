//! Standard Hough accumulator over every nonzero pixel of an 8-bit image.
//!
//! Layout is `(theta + 1) * (rho_bins + 2) + rho + 1` with a one-cell zero
//! border around the vote grid so the peak test never leaves the buffer.
use std::f64::consts::PI;

use crate::image::{ImageU8, ImageView};

pub type Votes = u32;

pub struct HoughAccumulator {
    pub data: Vec<Votes>,
    pub rho_bins: usize,
    pub theta_bins: usize,
    pub rho_step: f64,
    pub theta_step: f64,
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
}

/// One accumulator cell that passed the peak test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    pub rho_idx: usize,
    pub theta_idx: usize,
    pub votes: Votes,
}

impl HoughAccumulator {
    /// Accumulator sized for a `width × height` image.
    ///
    /// Returns `None` when the resolutions are not positive and finite.
    pub fn new(width: usize, height: usize, rho_step: f64, theta_step: f64) -> Option<Self> {
        if !(rho_step.is_finite() && rho_step > 0.0 && theta_step.is_finite() && theta_step > 0.0) {
            return None;
        }
        let theta_bins = ((PI / theta_step).round_ties_even() as usize).max(1);
        let rho_bins = ((((width + height) * 2 + 1) as f64 / rho_step).round_ties_even() as usize).max(1);

        let inv_rho = 1.0 / rho_step;
        let (cos_table, sin_table) = (0..theta_bins)
            .map(|n| {
                let ang = n as f64 * theta_step;
                (ang.cos() * inv_rho, ang.sin() * inv_rho)
            })
            .unzip();

        Some(Self {
            data: vec![0; (rho_bins + 2) * (theta_bins + 2)],
            rho_bins,
            theta_bins,
            rho_step,
            theta_step,
            cos_table,
            sin_table,
        })
    }

    #[inline]
    fn cell(&self, rho_idx: usize, theta_idx: usize) -> usize {
        (theta_idx + 1) * (self.rho_bins + 2) + rho_idx + 1
    }

    pub fn votes(&self, rho_idx: usize, theta_idx: usize) -> Votes {
        self.data[self.cell(rho_idx, theta_idx)]
    }

    /// Cast one vote per angle for every nonzero pixel of `image`.
    pub fn accumulate(&mut self, image: &ImageU8) {
        let offset = (self.rho_bins as i64 - 1) / 2;
        let stride = self.rho_bins + 2;
        for y in 0..image.h {
            let row = image.row(y);
            for (x, &v) in row.iter().enumerate() {
                if v == 0 {
                    continue;
                }
                let (xf, yf) = (x as f64, y as f64);
                for n in 0..self.theta_bins {
                    let r = (xf * self.cos_table[n] + yf * self.sin_table[n]).round_ties_even() as i64
                        + offset;
                    if r < 0 || r >= self.rho_bins as i64 {
                        continue;
                    }
                    self.data[(n + 1) * stride + r as usize + 1] += 1;
                }
            }
        }
    }

    /// Local maxima with more than `threshold` votes, strongest first.
    ///
    /// A cell must beat its lower rho and theta neighbours strictly and be
    /// no smaller than the upper ones. Ties in votes keep accumulator order.
    pub fn peaks(&self, threshold: Votes) -> Vec<Peak> {
        let stride = self.rho_bins + 2;
        let mut peaks = Vec::new();
        for n in 0..self.theta_bins {
            for r in 0..self.rho_bins {
                let base = self.cell(r, n);
                let v = self.data[base];
                if v > threshold
                    && v > self.data[base - 1]
                    && v >= self.data[base + 1]
                    && v > self.data[base - stride]
                    && v >= self.data[base + stride]
                {
                    peaks.push(Peak {
                        rho_idx: r,
                        theta_idx: n,
                        votes: v,
                    });
                }
            }
        }
        peaks.sort_by(|a, b| b.votes.cmp(&a.votes));
        peaks
    }

    /// Signed distance from the origin of the line in `rho_idx`.
    pub fn rho_of(&self, rho_idx: usize) -> f64 {
        (rho_idx as f64 - (self.rho_bins as f64 - 1.0) * 0.5) * self.rho_step
    }

    pub fn theta_of(&self, theta_idx: usize) -> f64 {
        theta_idx as f64 * self.theta_step
    }
}
