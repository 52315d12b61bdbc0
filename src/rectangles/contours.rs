//! Contour extraction over a binary edge map.
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::image::ImageU8;

/// Which borders are returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContourMode {
    /// Every outer and hole border, no hierarchy.
    #[default]
    List,
    /// Only outermost borders.
    External,
}

/// How contour points are stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContourMethod {
    /// Every border pixel.
    #[default]
    None,
    /// Straight horizontal, vertical and diagonal runs reduced to their end points.
    Simple,
}

/// Closed pixel contour.
pub type Contour = Vec<Point<i32>>;

/// Trace the borders of the nonzero regions of `edges`.
pub fn extract_contours(edges: &ImageU8, mode: ContourMode, method: ContourMethod) -> Vec<Contour> {
    let gray = edges.to_gray_image();
    find_contours::<i32>(&gray)
        .into_iter()
        .filter(|c| match mode {
            ContourMode::List => true,
            ContourMode::External => c.border_type == BorderType::Outer && c.parent.is_none(),
        })
        .map(|c| match method {
            ContourMethod::None => c.points,
            ContourMethod::Simple => compress_runs(&c.points),
        })
        .filter(|points| !points.is_empty())
        .collect()
}

/// Drop points that continue the step direction of their predecessor.
fn compress_runs(points: &[Point<i32>]) -> Contour {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let step = |a: Point<i32>, b: Point<i32>| (b.x - a.x, b.y - a.y);
    points
        .iter()
        .enumerate()
        .filter(|&(i, &p)| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, p) != step(p, next)
        })
        .map(|(_, &p)| p)
        .collect()
}
