//! Non-maximum suppression on gradient magnitude with direction alignment.
//!
//! Each pixel is compared with its two neighbours along the gradient
//! direction quantized to 0°, 45°, 90° or 135°. On the horizontal and
//! vertical axes the pixel must be strictly greater than the preceding
//! neighbour and not smaller than the following one, so a two-pixel-wide
//! ridge of equal magnitude keeps exactly one pixel. On the diagonals both
//! comparisons are strict.
//!
//! The outermost 1-pixel frame is never an edge candidate.
use crate::edges::grad::Grad;
use crate::image::ImageView;

const TAN_22_5_DEG: f32 = 0.414_213_57;

/// Candidate classification after suppression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeClass {
    None,
    Weak,
    Strong,
}

/// Suppress non-maxima and classify the survivors against `low`/`high`.
///
/// Magnitudes `<= low` are discarded, `> high` are strong.
pub fn run_nms(grad: &Grad, low: f32, high: f32) -> Vec<EdgeClass> {
    let w = grad.gx.w;
    let h = grad.gx.h;
    let mut classes = vec![EdgeClass::None; w * h];
    if w < 3 || h < 3 {
        return classes;
    }

    for y in 1..h - 1 {
        let mag_prev = grad.mag.row(y - 1);
        let mag_row = grad.mag.row(y);
        let mag_next = grad.mag.row(y + 1);
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);

        for x in 1..w - 1 {
            let mag = mag_row[x];
            if mag <= low {
                continue;
            }

            let gx = gx_row[x];
            let gy = gy_row[x];
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);

            let is_max = if abs_gy <= abs_gx * TAN_22_5_DEG {
                mag > mag_row[x - 1] && mag >= mag_row[x + 1]
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                mag > mag_prev[x] && mag >= mag_next[x]
            } else if same_sign {
                mag > mag_prev[x - 1] && mag > mag_next[x + 1]
            } else {
                mag > mag_prev[x + 1] && mag > mag_next[x - 1]
            };

            if is_max {
                classes[y * w + x] = if mag > high {
                    EdgeClass::Strong
                } else {
                    EdgeClass::Weak
                };
            }
        }
    }

    classes
}
