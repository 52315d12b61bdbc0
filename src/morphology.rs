//! Grey-level dilation and erosion with rectangular structuring elements.
//!
//! The anchor of a `w × h` element sits at `(w / 2, h / 2)`, so even-sized
//! elements reach one pixel further to the left/top than to the right/bottom.
//! Samples outside the frame do not take part in the max/min. Rectangles are
//! separable, so both operations run as a horizontal then a vertical pass.
use crate::image::{ImageU8, ImageView, ImageViewMut};
use serde::{Deserialize, Serialize};

/// Rectangular structuring element of ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Kernel {
    pub width: usize,
    pub height: usize,
}

impl Kernel {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// Reach of the element on each side of the anchor, as `(before, after)`.
    fn reach(len: usize) -> (usize, usize) {
        let len = len.max(1);
        let before = len / 2;
        (before, len - 1 - before)
    }
}

impl From<[usize; 2]> for Kernel {
    fn from(v: [usize; 2]) -> Self {
        Kernel::new(v[0], v[1])
    }
}

impl From<Kernel> for [usize; 2] {
    fn from(k: Kernel) -> Self {
        [k.width, k.height]
    }
}

#[derive(Clone, Copy)]
enum Op {
    Max,
    Min,
}

impl Op {
    #[inline]
    fn combine(self, a: u8, b: u8) -> u8 {
        match self {
            Op::Max => a.max(b),
            Op::Min => a.min(b),
        }
    }
}

/// Dilation (local maximum) with `kernel`.
pub fn dilate(image: &ImageU8, kernel: Kernel) -> ImageU8 {
    morph(image, kernel, Op::Max)
}

/// Erosion (local minimum) with `kernel`.
pub fn erode(image: &ImageU8, kernel: Kernel) -> ImageU8 {
    morph(image, kernel, Op::Min)
}

/// Erosion followed by dilation.
pub fn open(image: &ImageU8, erode_kernel: Kernel, dilate_kernel: Kernel) -> ImageU8 {
    dilate(&erode(image, erode_kernel), dilate_kernel)
}

fn morph(image: &ImageU8, kernel: Kernel, op: Op) -> ImageU8 {
    let (w, h) = (image.w, image.h);
    if w == 0 || h == 0 {
        return image.clone();
    }

    let (left, right) = Kernel::reach(kernel.width);
    let mut horizontal = ImageU8::new(w, h);
    for y in 0..h {
        let src = image.row(y);
        let dst = horizontal.row_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            let lo = x.saturating_sub(left);
            let hi = (x + right).min(w - 1);
            *out = src[lo..=hi]
                .iter()
                .copied()
                .reduce(|a, b| op.combine(a, b))
                .unwrap_or(src[x]);
        }
    }

    let (top, bottom) = Kernel::reach(kernel.height);
    let mut out = ImageU8::new(w, h);
    for y in 0..h {
        let lo = y.saturating_sub(top);
        let hi = (y + bottom).min(h - 1);
        let dst = out.row_mut(y);
        dst.copy_from_slice(horizontal.row(lo));
        for yy in lo + 1..=hi {
            for (d, &s) in dst.iter_mut().zip(horizontal.row(yy)) {
                *d = op.combine(*d, s);
            }
        }
    }
    out
}
