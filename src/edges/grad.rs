//! Sobel image gradients with border clamping.
//!
//! - Convolves the 3×3 Sobel pair with replicated borders.
//! - Outputs per-pixel `gx`, `gy` and the L1 magnitude `|gx| + |gy|` used by
//!   the hysteresis thresholds of the edge detector.
use crate::image::{ImageF32, ImageU8, ImageView, ImageViewMut};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: ImageF32,
    /// L1 magnitude per pixel: `|gx| + |gy|`
    pub mag: ImageF32,
}

/// Compute Sobel gradients of an 8-bit image.
pub fn sobel_gradients(l: &ImageU8) -> Grad {
    let w = l.w;
    let h = l.h;
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);

    if w == 0 || h == 0 {
        return Grad { gx, gy, mag };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        let out_mag = mag.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, yy_row) in rows.iter().enumerate() {
                let kx_row = &SOBEL_KERNEL_X[ky];
                let ky_row = &SOBEL_KERNEL_Y[ky];
                let s = [
                    yy_row[x_idx[0]] as f32,
                    yy_row[x_idx[1]] as f32,
                    yy_row[x_idx[2]] as f32,
                ];
                sum_x += s[0] * kx_row[0] + s[1] * kx_row[1] + s[2] * kx_row[2];
                sum_y += s[0] * ky_row[0] + s[1] * ky_row[1] + s[2] * ky_row[2];
            }

            out_gx[x] = sum_x;
            out_gy[x] = sum_y;
            out_mag[x] = sum_x.abs() + sum_y.abs();
        }
    }

    Grad { gx, gy, mag }
}
