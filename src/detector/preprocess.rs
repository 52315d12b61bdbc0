//! Pass-specific preprocessing: float image → equalized 8-bit image →
//! morphology.
use crate::contrast::{clip_negative, equalize_histogram, floor_and_boost, to_u8_saturating};
use crate::image::{ImageF32, ImageU8};
use crate::morphology::{dilate, open, Kernel};
use crate::types::PassKind;

/// Preprocessing strategy of a pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Preprocessor {
    /// Clip negatives, equalize, dilate.
    Bright { dilate_kernel: Kernel },
    /// Zero everything below `min_flux`, lift the rest by `add_flux`,
    /// equalize, then open (erode followed by dilate).
    Dim {
        min_flux: f32,
        add_flux: f32,
        erode_kernel: Kernel,
        dilate_kernel: Kernel,
    },
}

impl Preprocessor {
    pub fn bright() -> Self {
        Preprocessor::Bright {
            dilate_kernel: Kernel::square(4),
        }
    }

    pub fn dim() -> Self {
        Preprocessor::Dim {
            min_flux: 0.02,
            add_flux: 0.5,
            erode_kernel: Kernel::square(3),
            dilate_kernel: Kernel::square(9),
        }
    }

    pub fn kind(&self) -> PassKind {
        match self {
            Preprocessor::Bright { .. } => PassKind::Bright,
            Preprocessor::Dim { .. } => PassKind::Dim,
        }
    }

    /// Intensity transform, 8-bit conversion and histogram equalization.
    pub fn normalize(&self, mut image: ImageF32) -> ImageU8 {
        match *self {
            Preprocessor::Bright { .. } => clip_negative(&mut image),
            Preprocessor::Dim {
                min_flux, add_flux, ..
            } => floor_and_boost(&mut image, min_flux, add_flux),
        }
        equalize_histogram(&to_u8_saturating(&image))
    }

    pub fn morphology(&self, image: &ImageU8) -> ImageU8 {
        match *self {
            Preprocessor::Bright { dilate_kernel } => dilate(image, dilate_kernel),
            Preprocessor::Dim {
                erode_kernel,
                dilate_kernel,
                ..
            } => open(image, erode_kernel, dilate_kernel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bright_ignores_negative_flux() {
        let mut img = ImageF32::new(8, 8);
        img.set(1, 1, -40.0);
        img.set(4, 4, 200.0);
        let out = Preprocessor::bright().normalize(img);
        assert_eq!(out.get(1, 1), 0);
        assert_eq!(out.get(4, 4), 255);
        assert_eq!(out.count_nonzero(), 1);
    }

    #[test]
    fn dim_floor_removes_faint_pixels() {
        let mut img = ImageF32::new(8, 8);
        img.set(2, 2, 0.01);
        img.set(5, 5, 0.25);
        let out = Preprocessor::dim().normalize(img);
        assert_eq!(out.get(2, 2), 0);
        assert_eq!(out.get(5, 5), 255);
    }

    #[test]
    fn dim_opening_drops_isolated_pixels() {
        let mut img = ImageU8::new(20, 20);
        img.set(10, 10, 255);
        assert!(Preprocessor::dim().morphology(&img).is_blank());
        assert_eq!(Preprocessor::bright().morphology(&img).count_nonzero(), 16);
    }
}
