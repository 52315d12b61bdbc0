//! Owned 8-bit single-channel image, the working format of the detection
//! passes after contrast normalization.
use super::traits::{ImageView, ImageViewMut};
use image::GrayImage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageU8 {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: Vec<u8>,
}

impl ImageU8 {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0; w * h],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.stride + x] = v;
    }

    /// True when no pixel is set.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Number of non-zero pixels.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Copy into an `image::GrayImage` for encoders and `imageproc` routines.
    pub fn to_gray_image(&self) -> GrayImage {
        let mut out = GrayImage::new(self.w as u32, self.h as u32);
        for (y, row) in self.rows().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                out.put_pixel(x as u32, y as u32, image::Luma([v]));
            }
        }
        out
    }

    pub fn from_gray_image(img: &GrayImage) -> Self {
        Self {
            w: img.width() as usize,
            h: img.height() as usize,
            stride: img.width() as usize,
            data: img.as_raw().clone(),
        }
    }
}

impl ImageView for ImageU8 {
    type Pixel = u8;

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
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for ImageU8 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}
