//! Debug dumps of intermediate pass images.
//!
//! Failures to write are logged and otherwise ignored; dumping never changes
//! the outcome of a pass.
use crate::detector::DebugConfig;
use crate::diagnostics::PassReport;
use crate::hough::{project_endpoints, LineSet};
use crate::image::io::{save_grayscale_u8, save_rgb, write_json_file};
use crate::image::ImageU8;
use crate::types::PassKind;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use log::warn;
use std::path::PathBuf;

pub(crate) const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub(crate) const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

pub(crate) struct DebugSink {
    dir: Option<PathBuf>,
    pass: PassKind,
}

impl DebugSink {
    pub(crate) fn new(config: &DebugConfig, pass: PassKind, tag: Option<&str>) -> Self {
        let dir = config.enabled.then(|| match tag {
            Some(tag) => config.output_dir.join(tag),
            None => config.output_dir.clone(),
        });
        Self { dir, pass }
    }

    fn path(&self, name: &str, ext: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|d| d.join(format!("{}-{}.{}", self.pass, name, ext)))
    }

    pub(crate) fn image(&self, name: &str, image: &ImageU8) {
        if let Some(path) = self.path(name, "png") {
            if let Err(err) = save_grayscale_u8(image, &path) {
                warn!("debug dump {} failed: {err}", path.display());
            }
        }
    }

    /// Draw the first `n` lines of `lines` over `image`.
    pub(crate) fn overlay(&self, name: &str, image: &ImageU8, lines: &LineSet, n: usize, color: Rgb<u8>) {
        let Some(path) = self.path(name, "png") else {
            return;
        };
        let gray = image.to_gray_image();
        let mut canvas = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y)[0];
            Rgb([v, v, v])
        });
        for line in lines.top(n) {
            let e = project_endpoints(line, image.w, image.h);
            draw_line_segment_mut(
                &mut canvas,
                (e.x1 as f32, e.y1 as f32),
                (e.x2 as f32, e.y2 as f32),
                color,
            );
        }
        if let Err(err) = save_rgb(&canvas, &path) {
            warn!("debug overlay {} failed: {err}", path.display());
        }
    }

    pub(crate) fn report(&self, report: &PassReport) {
        if let Some(path) = self.path("report", "json") {
            if let Err(err) = write_json_file(&path, report) {
                warn!("debug report {} failed: {err}", path.display());
            }
        }
    }
}
