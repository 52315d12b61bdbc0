//! Intensity preprocessing: flux clipping, 8-bit conversion and histogram
//! equalization.
//!
//! The conversion to 8 bit takes the absolute value, rounds to the nearest
//! integer (ties to even) and saturates to `0..=255`; no rescaling by the
//! image range takes place. Equalization maps the lowest populated grey level
//! to 0 so an empty background stays empty.
use crate::image::{ImageF32, ImageU8};

/// Replace negative intensities by zero.
pub fn clip_negative(image: &mut ImageF32) {
    image.map_in_place(|v| if v < 0.0 { 0.0 } else { v });
}

/// Zero every intensity below `min_flux`, then add `add_flux` to what stays positive.
pub fn floor_and_boost(image: &mut ImageF32, min_flux: f32, add_flux: f32) {
    image.map_in_place(|v| {
        let v = if v < min_flux { 0.0 } else { v };
        if v > 0.0 {
            v + add_flux
        } else {
            v
        }
    });
}

/// Saturating absolute-value conversion to 8 bit.
pub fn to_u8_saturating(image: &ImageF32) -> ImageU8 {
    let data = image
        .data
        .iter()
        .map(|v| v.abs().round_ties_even() as u8)
        .collect();
    ImageU8 {
        w: image.w,
        h: image.h,
        stride: image.w,
        data,
    }
}

/// Histogram equalization over 256 grey levels.
pub fn equalize_histogram(image: &ImageU8) -> ImageU8 {
    let total = image.data.len();
    let mut out = image.clone();
    if total == 0 {
        return out;
    }

    let mut hist = [0usize; 256];
    for &v in &image.data {
        hist[v as usize] += 1;
    }

    let Some(first) = hist.iter().position(|&c| c > 0) else {
        return out;
    };
    if hist[first] == total {
        return out;
    }

    let scale = 255.0 / (total - hist[first]) as f64;
    let mut lut = [0u8; 256];
    let mut sum = 0usize;
    for level in first + 1..256 {
        sum += hist[level];
        lut[level] = (sum as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }

    for v in &mut out.data {
        *v = lut[*v as usize];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_and_boost_only_touches_surviving_pixels() {
        let mut img = ImageF32::from_vec(4, 1, vec![-1.0, 0.125, 0.25, 1.0]).unwrap();
        floor_and_boost(&mut img, 0.25, 0.5);
        assert_eq!(img.data, vec![0.0, 0.0, 0.75, 1.5]);
    }

    #[test]
    fn conversion_saturates_and_rounds() {
        let img = ImageF32::from_vec(5, 1, vec![-3.4, 0.5, 1.5, 254.6, 1e6]).unwrap();
        let out = to_u8_saturating(&img);
        assert_eq!(out.data, vec![3, 0, 2, 255, 255]);
    }

    #[test]
    fn equalization_keeps_background_at_zero() {
        let mut data = vec![0u8; 100];
        data[10] = 7;
        data[11] = 7;
        data[12] = 40;
        let img = ImageU8 {
            w: 10,
            h: 10,
            stride: 10,
            data,
        };
        let eq = equalize_histogram(&img);
        assert_eq!(eq.get(0, 0), 0);
        assert_eq!(eq.get(2, 1), 255);
        assert_eq!(eq.get(0, 1), 170);
    }

    #[test]
    fn equalization_of_flat_image_is_identity() {
        let img = ImageU8 {
            w: 3,
            h: 3,
            stride: 3,
            data: vec![9; 9],
        };
        assert_eq!(equalize_histogram(&img), img);
    }
}
