//! Edge extraction: Sobel gradients, direction-aligned non-maximum
//! suppression and hysteresis thresholding.
//!
//! The output is a binary edge map (255 on edges, 0 elsewhere) of the same
//! size as the input. The detector is deterministic: the same image and
//! thresholds always produce the same map.

pub mod grad;
pub mod nms;

pub use grad::{sobel_gradients, Grad};
pub use nms::{run_nms, EdgeClass};

use crate::image::ImageU8;

/// Edge map of `image`.
///
/// Pixels whose suppressed L1 gradient magnitude exceeds `high` seed the
/// edges; pixels above `low` join when 8-connected to a seed.
pub fn detect_edges(image: &ImageU8, low: f32, high: f32) -> ImageU8 {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let grad = sobel_gradients(image);
    let classes = run_nms(&grad, low, high);
    hysteresis(image.w, image.h, &classes)
}

fn hysteresis(w: usize, h: usize, classes: &[EdgeClass]) -> ImageU8 {
    let mut out = ImageU8::new(w, h);
    let mut stack: Vec<usize> = classes
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == EdgeClass::Strong)
        .map(|(i, _)| i)
        .collect();
    for &i in &stack {
        out.data[i] = 255;
    }

    while let Some(i) = stack.pop() {
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if out.data[j] == 0 && classes[j] == EdgeClass::Weak {
                    out.data[j] = 255;
                    stack.push(j);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_box(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> ImageU8 {
        let mut img = ImageU8::new(w, h);
        for y in y0..y1 {
            for x in x0..x1 {
                img.set(x, y, 255);
            }
        }
        img
    }

    #[test]
    fn step_edge_yields_one_pixel_wide_line() {
        let img = filled_box(32, 32, 16, 0, 32, 32);
        let edges = detect_edges(&img, 0.0, 255.0);
        for y in 1..31 {
            let on: Vec<usize> = (0..32).filter(|&x| edges.get(x, y) != 0).collect();
            assert_eq!(on, vec![15], "row {y}");
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = filled_box(16, 16, 0, 0, 16, 16);
        assert!(detect_edges(&img, 0.0, 255.0).is_blank());
        assert!(detect_edges(&ImageU8::new(16, 16), 0.0, 255.0).is_blank());
    }

    #[test]
    fn box_outline_is_closed() {
        let img = filled_box(40, 40, 10, 12, 30, 20);
        let edges = detect_edges(&img, 0.0, 255.0);
        assert!(edges.count_nonzero() > 40);
        assert!(edges.get(20, 16) == 0, "interior must stay empty");
        assert_eq!(detect_edges(&img, 0.0, 255.0), edges);
    }
}
