use crate::colinearity::ColinearityThresholds;
use crate::detector::Preprocessor;
use crate::hough::HoughOptions;
use crate::rectangles::RectangleOptions;
use crate::types::PassKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where intermediate images and reports of a pass are written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from("debug"),
        }
    }
}

/// Every tunable of one detection pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub preprocessor: Preprocessor,
    pub rectangles: RectangleOptions,
    pub hough: HoughOptions,
    pub colinearity: ColinearityThresholds,
    pub debug: DebugConfig,
}

impl PipelineConfig {
    pub fn bright() -> Self {
        Self {
            preprocessor: Preprocessor::bright(),
            rectangles: RectangleOptions::default(),
            hough: HoughOptions::default(),
            colinearity: ColinearityThresholds::default(),
            debug: DebugConfig::default(),
        }
    }

    pub fn dim() -> Self {
        Self {
            preprocessor: Preprocessor::dim(),
            colinearity: ColinearityThresholds {
                dro: 20.0,
                ..ColinearityThresholds::default()
            },
            ..Self::bright()
        }
    }

    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }

    pub fn kind(&self) -> PassKind {
        self.preprocessor.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_differs_from_bright_only_in_preprocessing_and_dro() {
        let bright = PipelineConfig::bright();
        let dim = PipelineConfig::dim();
        assert_eq!(bright.kind(), PassKind::Bright);
        assert_eq!(dim.kind(), PassKind::Dim);
        assert_eq!(bright.colinearity.dro, 25.0);
        assert_eq!(dim.colinearity.dro, 20.0);
        assert_eq!(bright.rectangles, dim.rectangles);
        assert_eq!(bright.hough, dim.hough);
        assert!(!dim.debug.enabled);
    }
}
