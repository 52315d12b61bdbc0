//! Rectangle candidates: edge map → contours → minimum-area rectangles →
//! filled mask of the elongated ones.
//!
//! The fitter is a pure function of its input image and options, so two
//! calls on the same image yield identical masks.

pub mod contours;
pub mod min_area_rect;

pub use contours::{extract_contours, Contour, ContourMethod, ContourMode};
pub use min_area_rect::{fill_convex_polygon, min_area_rect, RotatedRect};

use crate::edges::detect_edges;
use crate::image::ImageU8;
use log::trace;
use serde::{Deserialize, Serialize};

/// Options of the rectangle stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectangleOptions {
    /// Minimum long/short side ratio (exclusive).
    pub lw_thresh: f64,
    /// Minimum length of both sides, in pixels (exclusive).
    pub min_len: f64,
    pub contour_mode: ContourMode,
    pub contour_method: ContourMethod,
    /// Hysteresis thresholds of the edge detector.
    pub edge_low: f32,
    pub edge_high: f32,
}

impl Default for RectangleOptions {
    fn default() -> Self {
        Self {
            lw_thresh: 5.0,
            min_len: 1.0,
            contour_mode: ContourMode::List,
            contour_method: ContourMethod::None,
            edge_low: 0.0,
            edge_high: 255.0,
        }
    }
}

/// An accepted rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleCandidate {
    pub rect: RotatedRect,
    pub long_side: f64,
    pub short_side: f64,
}

impl RectangleCandidate {
    /// Classify `rect` and keep it only if it is long and thin enough.
    pub fn classify(rect: RotatedRect, opts: &RectangleOptions) -> Option<Self> {
        let (long_side, short_side) = rect.sides();
        let accepted = long_side > opts.min_len
            && short_side > opts.min_len
            && long_side / short_side > opts.lw_thresh;
        accepted.then_some(Self {
            rect,
            long_side,
            short_side,
        })
    }
}

/// Outcome of one rectangle fit.
#[derive(Clone, Debug)]
pub struct RectangleFit {
    /// Number of contours examined.
    pub contours: usize,
    pub rectangles: Vec<RectangleCandidate>,
    /// Union of all accepted rectangles, 255 inside.
    pub mask: ImageU8,
}

impl RectangleFit {
    pub fn detected(&self) -> bool {
        !self.rectangles.is_empty()
    }
}

/// Finds elongated rectangles in an 8-bit image.
#[derive(Clone, Debug, Default)]
pub struct RectangleFitter {
    opts: RectangleOptions,
}

impl RectangleFitter {
    pub fn new(opts: RectangleOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &RectangleOptions {
        &self.opts
    }

    pub fn fit(&self, image: &ImageU8) -> RectangleFit {
        let edges = detect_edges(image, self.opts.edge_low, self.opts.edge_high);
        let contours = extract_contours(&edges, self.opts.contour_mode, self.opts.contour_method);

        let mut mask = ImageU8::new(image.w, image.h);
        let mut rectangles = Vec::new();
        for contour in &contours {
            let Some(rect) = min_area_rect(contour) else {
                continue;
            };
            match RectangleCandidate::classify(rect, &self.opts) {
                Some(candidate) => {
                    fill_convex_polygon(&mut mask, &rect.corners(), 255);
                    rectangles.push(candidate);
                }
                None => trace!(
                    "rectangle {:.1}x{:.1} at ({:.1}, {:.1}) rejected",
                    rect.width,
                    rect.height,
                    rect.center.x,
                    rect.center.y
                ),
            }
        }

        RectangleFit {
            contours: contours.len(),
            rectangles,
            mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn bar(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> ImageU8 {
        let mut img = ImageU8::new(w, h);
        for y in y0..y1 {
            for x in x0..x1 {
                img.set(x, y, 255);
            }
        }
        img
    }

    #[test]
    fn elongated_bar_is_detected() {
        let img = bar(100, 60, 10, 28, 90, 34);
        let fit = RectangleFitter::default().fit(&img);
        assert!(fit.detected());
        assert!(fit.contours >= 1);
        assert_eq!(fit.mask.get(50, 30), 255);
        assert_eq!(fit.mask.get(50, 10), 0);
        for r in &fit.rectangles {
            assert!(r.long_side / r.short_side > 5.0);
        }
    }

    #[test]
    fn square_blob_is_rejected() {
        let img = bar(60, 60, 20, 20, 40, 40);
        let fit = RectangleFitter::default().fit(&img);
        assert!(!fit.detected());
        assert!(fit.mask.is_blank());
    }

    #[test]
    fn blank_image_yields_nothing() {
        let fit = RectangleFitter::default().fit(&ImageU8::new(32, 32));
        assert!(!fit.detected());
        assert_eq!(fit.contours, 0);
        assert!(fit.mask.is_blank());
    }

    #[test]
    fn fitting_is_deterministic() {
        let mut img = bar(128, 128, 5, 60, 120, 66);
        for i in 0..40 {
            img.set(20 + i * 2, 10 + i, 200);
            img.set(21 + i * 2, 10 + i, 200);
        }
        let fitter = RectangleFitter::default();
        let a = fitter.fit(&img);
        let b = fitter.fit(&img);
        assert_eq!(a.mask, b.mask);
        assert_eq!(a.rectangles, b.rectangles);
    }

    #[test]
    fn classification_thresholds_are_exclusive() {
        let opts = RectangleOptions::default();
        let rect = |w: f64, h: f64| RotatedRect {
            center: Point2::new(0.0, 0.0),
            width: w,
            height: h,
            angle: 0.0,
        };
        assert!(RectangleCandidate::classify(rect(10.0, 2.0), &opts).is_none());
        assert!(RectangleCandidate::classify(rect(2.0, 10.5), &opts).is_some());
        assert!(RectangleCandidate::classify(rect(30.0, 1.0), &opts).is_none());
    }
}
