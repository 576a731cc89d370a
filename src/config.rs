use crate::error::{Result, ResultExt as _, SweeperError};
use crate::io::FileFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_CHART_HEIGHT: f32 = 240.0;

/// User preferences. The GUI persists these through eframe's storage; the
/// CLI can read them from a JSON file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Rows shown in each file's head preview.
    pub preview_rows: usize,
    /// Conversion choice preselected for newly uploaded files.
    pub default_format: FileFormat,
    /// Height of the bar chart in points.
    pub chart_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            default_format: FileFormat::Csv,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// The file cannot be read, is not valid JSON, or fails [`Self::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// # Errors
    ///
    /// [`SweeperError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.preview_rows == 0 {
            return Err(SweeperError::Config(
                "preview_rows must be at least 1".to_owned(),
            ));
        }
        if !(self.chart_height.is_finite() && self.chart_height > 0.0) {
            return Err(SweeperError::Config(format!(
                "chart_height must be positive, got {}",
                self.chart_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let settings: Settings = serde_json::from_str(r#"{"preview_rows": 10}"#)?;
        assert_eq!(settings.preview_rows, 10);
        assert_eq!(settings.default_format, FileFormat::Csv);
        assert_eq!(settings.chart_height, DEFAULT_CHART_HEIGHT);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_zero_preview() {
        let settings = Settings {
            preview_rows: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SweeperError::Config(_))));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"default_format": "Excel", "chart_height": 300.0}}"#)?;

        let settings = Settings::load(file.path())?;
        assert_eq!(settings.default_format, FileFormat::Excel);
        assert_eq!(settings.preview_rows, DEFAULT_PREVIEW_ROWS);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("/definitely/not/here.json"))
            .expect_err("file does not exist");
        assert!(err.to_string().contains("Failed to read settings file"));
    }
}
