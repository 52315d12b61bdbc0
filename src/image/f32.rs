//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Holds raw survey intensities. Masking and contrast preprocessing mutate
//! the buffer in place, so whoever owns an `ImageF32` owns the only working
//! copy of that frame.
use super::traits::{ImageView, ImageViewMut};

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` on a size mismatch.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    /// Widen an 8-bit image to float intensities.
    pub fn from_u8(src: &super::ImageU8) -> Self {
        let mut out = Self::new(src.w, src.h);
        for y in 0..src.h {
            for (d, &s) in out.row_mut(y).iter_mut().zip(src.row(y)) {
                *d = s as f32;
            }
        }
        out
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Set every pixel of the half-open box `[x0, x1) × [y0, y1)` to `v`.
    ///
    /// Bounds are clipped to the frame; an empty or fully outside box is a no-op.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, v: f32) {
        let clip = |lo: i64, hi: i64, max: usize| -> (usize, usize) {
            let lo = lo.clamp(0, max as i64) as usize;
            let hi = hi.clamp(0, max as i64) as usize;
            (lo, hi.max(lo))
        };
        let (x0, x1) = clip(x0, x1, self.w);
        let (y0, y1) = clip(y0, y1, self.h);
        for y in y0..y1 {
            self.row_mut(y)[x0..x1].fill(v);
        }
    }

    /// Mirror the image about its horizontal axis (first row becomes last).
    pub fn flip_vertical(&mut self) {
        let (w, h) = (self.w, self.h);
        for y in 0..h / 2 {
            let (top, bottom) = self.data.split_at_mut((h - 1 - y) * self.stride);
            top[y * self.stride..y * self.stride + w].swap_with_slice(&mut bottom[..w]);
        }
    }

    /// Apply `f` to every pixel.
    pub fn map_in_place(&mut self, mut f: impl FnMut(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> ImageF32 {
        let data = (0..w * h).map(|i| i as f32).collect();
        ImageF32::from_vec(w, h, data).unwrap()
    }

    #[test]
    fn flip_vertical_reverses_rows() {
        let mut img = ramp(3, 3);
        img.flip_vertical();
        assert_eq!(img.row(0), &[6.0, 7.0, 8.0]);
        assert_eq!(img.row(1), &[3.0, 4.0, 5.0]);
        assert_eq!(img.row(2), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn flip_vertical_twice_is_identity() {
        let original = ramp(4, 5);
        let mut img = original.clone();
        img.flip_vertical();
        img.flip_vertical();
        assert_eq!(img, original);
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut img = ramp(4, 4);
        img.fill_rect(-2, -2, 2, 1, 0.0);
        assert_eq!(img.row(0), &[0.0, 0.0, 2.0, 3.0]);
        assert_eq!(img.row(1), &[4.0, 5.0, 6.0, 7.0]);

        let before = img.clone();
        img.fill_rect(10, 10, 20, 20, 0.0);
        assert_eq!(img, before);
    }

    #[test]
    fn from_vec_rejects_size_mismatch() {
        assert!(ImageF32::from_vec(2, 2, vec![0.0; 3]).is_none());
    }
}
