use trail_detector::image::ImageF32;
use trail_detector::PipelineConfig;

/// Route library logs through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Endpoints of the trail painted by [`trail_frame`].
pub const TRAIL_START: (f64, f64) = (40.0, 150.0);
pub const TRAIL_END: (f64, f64) = (470.0, 350.0);

/// 512×512 frame with a straight bright band between [`TRAIL_START`] and
/// [`TRAIL_END`], `half_width` pixels either side of the centre line.
pub fn trail_frame(flux: f32, half_width: f64) -> ImageF32 {
    let size = 512usize;
    let mut img = ImageF32::new(size, size);
    let (x0, y0) = TRAIL_START;
    let (dx, dy) = (TRAIL_END.0 - x0, TRAIL_END.1 - y0);
    let len2 = dx * dx + dy * dy;
    let len = len2.sqrt();
    for y in 0..size {
        for x in 0..size {
            let (px, py) = (x as f64 - x0, y as f64 - y0);
            let along = (px * dx + py * dy) / len2;
            let across = (px * dy - py * dx).abs() / len;
            if (0.0..=1.0).contains(&along) && across <= half_width {
                img.set(x, y, flux);
            }
        }
    }
    img
}

/// [`trail_frame`] upside down, as written to disk. The field orchestrator
/// flips frames on load, so detection runs on the `trail_frame` orientation.
pub fn stored_trail_frame(flux: f32, half_width: f64) -> ImageF32 {
    let mut img = trail_frame(flux, half_width);
    img.flip_vertical();
    img
}

/// `base` with finer rho bins and looser angle limits, so a single synthetic
/// trail is accepted regardless of where it falls on the rho grid.
pub fn permissive(mut base: PipelineConfig) -> PipelineConfig {
    base.hough.rho_resolution = 5.0;
    base.colinearity.theta_thresh = 0.3;
    base.colinearity.line_set_thresh = 0.3;
    base
}

/// Frame with sky background only.
pub fn blank_frame() -> ImageF32 {
    ImageF32::new(512, 512)
}

/// Perpendicular distance of `p` from the infinite line through `a` and `b`.
pub fn distance_to_line(p: (f64, f64), a: (i64, i64), b: (i64, i64)) -> f64 {
    let (ax, ay) = (a.0 as f64, a.1 as f64);
    let (dx, dy) = (b.0 as f64 - ax, b.1 as f64 - ay);
    let cross = (p.0 - ax) * dy - (p.1 - ay) * dx;
    cross.abs() / (dx * dx + dy * dy).sqrt()
}
