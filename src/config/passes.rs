//! Option surfaces of the bright pass, the dim pass and the object masker.
use crate::colinearity::ColinearityThresholds;
use crate::detector::{DebugConfig, PipelineConfig, Preprocessor};
use crate::hough::HoughOptions;
use crate::masking::MaskingParams;
use crate::morphology::Kernel;
use crate::rectangles::{ContourMethod, ContourMode, RectangleOptions};
use crate::types::BandValues;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Options shared by both passes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonPassConfig {
    pub lw_thresh: f64,
    pub theta_thresh: f64,
    pub contour_mode: ContourMode,
    pub contour_method: ContourMethod,
    pub min_area_rect_min_len: f64,
    pub hough_rho_resolution: f64,
    pub hough_theta_resolution: f64,
    pub hough_vote_threshold: u32,
    #[serde(rename = "topNLines")]
    pub top_n_lines: usize,
    pub line_set_thresh: f64,
    pub debug: bool,
}

impl Default for CommonPassConfig {
    fn default() -> Self {
        Self {
            lw_thresh: 5.0,
            theta_thresh: 0.15,
            contour_mode: ContourMode::List,
            contour_method: ContourMethod::None,
            min_area_rect_min_len: 1.0,
            hough_rho_resolution: 20.0,
            hough_theta_resolution: PI / 180.0,
            hough_vote_threshold: 1,
            top_n_lines: 3,
            line_set_thresh: 0.15,
            debug: false,
        }
    }
}

impl CommonPassConfig {
    /// Reject values the Hough accumulator and the validator cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.top_n_lines == 0 {
            return Err("topNLines must be at least 1".to_string());
        }
        positive("houghRhoResolution", self.hough_rho_resolution)?;
        positive("houghThetaResolution", self.hough_theta_resolution)
    }

    fn to_pipeline_config(
        &self,
        preprocessor: Preprocessor,
        dro: f64,
        debug: &DebugConfig,
    ) -> PipelineConfig {
        PipelineConfig {
            preprocessor,
            rectangles: RectangleOptions {
                lw_thresh: self.lw_thresh,
                min_len: self.min_area_rect_min_len,
                contour_mode: self.contour_mode,
                contour_method: self.contour_method,
                ..RectangleOptions::default()
            },
            hough: HoughOptions {
                rho_resolution: self.hough_rho_resolution,
                theta_resolution: self.hough_theta_resolution,
                vote_threshold: self.hough_vote_threshold,
            },
            colinearity: ColinearityThresholds {
                top_n: self.top_n_lines,
                dro,
                theta_thresh: self.theta_thresh,
                line_set_thresh: self.line_set_thresh,
            },
            debug: DebugConfig {
                enabled: self.debug || debug.enabled,
                output_dir: debug.output_dir.clone(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrightConfig {
    pub dilate_kernel: Kernel,
    pub dro: f64,
    #[serde(flatten)]
    pub common: CommonPassConfig,
}

impl Default for BrightConfig {
    fn default() -> Self {
        Self {
            dilate_kernel: Kernel::square(4),
            dro: 25.0,
            common: CommonPassConfig::default(),
        }
    }
}

impl BrightConfig {
    pub fn to_pipeline_config(&self, debug: &DebugConfig) -> PipelineConfig {
        let pre = Preprocessor::Bright {
            dilate_kernel: self.dilate_kernel,
        };
        self.common.to_pipeline_config(pre, self.dro, debug)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimConfig {
    pub min_flux: f32,
    pub add_flux: f32,
    pub erode_kernel: Kernel,
    pub dilate_kernel: Kernel,
    pub dro: f64,
    #[serde(flatten)]
    pub common: CommonPassConfig,
}

impl Default for DimConfig {
    fn default() -> Self {
        Self {
            min_flux: 0.02,
            add_flux: 0.5,
            erode_kernel: Kernel::square(3),
            dilate_kernel: Kernel::square(9),
            dro: 20.0,
            common: CommonPassConfig::default(),
        }
    }
}

impl DimConfig {
    pub fn to_pipeline_config(&self, debug: &DebugConfig) -> PipelineConfig {
        let pre = Preprocessor::Dim {
            min_flux: self.min_flux,
            add_flux: self.add_flux,
            erode_kernel: self.erode_kernel,
            dilate_kernel: self.dilate_kernel,
        };
        self.common.to_pipeline_config(pre, self.dro, debug)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskingConfig {
    pub default_half_width: i64,
    pub max_half_width: i64,
    pub per_band_magnitude_cap: BandValues<f64>,
    pub pixel_scale: f64,
    pub max_mag_count: usize,
    pub max_mag_diff: f64,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        let p = MaskingParams::default();
        Self {
            default_half_width: p.default_half_width,
            max_half_width: p.max_half_width,
            per_band_magnitude_cap: p.magnitude_caps,
            pixel_scale: p.pixel_scale,
            max_mag_count: p.max_mag_count,
            max_mag_diff: p.max_mag_diff,
        }
    }
}

impl MaskingConfig {
    pub fn validate(&self) -> Result<(), String> {
        positive("pixelScale", self.pixel_scale)
    }

    pub fn to_masking_params(&self) -> MaskingParams {
        MaskingParams {
            default_half_width: self.default_half_width,
            max_half_width: self.max_half_width,
            magnitude_caps: self.per_band_magnitude_cap,
            pixel_scale: self.pixel_scale,
            max_mag_count: self.max_mag_count,
            max_mag_diff: self.max_mag_diff,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be a positive number, got {value}"))
    }
}
