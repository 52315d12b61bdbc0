use super::{load_config, BrightConfig, ConfigError, DimConfig};
use crate::detector::DebugConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration of the `detect_image` tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectImageConfig {
    /// Grayscale PNG/JPEG/TIFF image.
    pub input: PathBuf,
    /// JSON file receiving both pass reports.
    pub report: PathBuf,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub bright: BrightConfig,
    #[serde(default)]
    pub dim: DimConfig,
}

impl DetectImageConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = load_config(path)?;
        let checks = [
            ("bright", cfg.bright.common.validate()),
            ("dim", cfg.dim.common.validate()),
        ];
        for (section, check) in checks {
            if let Err(reason) = check {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason: format!("{section}: {reason}"),
                });
            }
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_theta_resolution_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.json");
        std::fs::write(
            &path,
            r#"{"input": "frame.png", "report": "report.json",
                "dim": {"houghThetaResolution": 0}}"#,
        )
        .unwrap();
        assert!(matches!(
            DetectImageConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
