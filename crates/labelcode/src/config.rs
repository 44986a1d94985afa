use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::{MissingMarkers, CONFIG_FILE, DEFAULT_MISSING_MARKERS};

/// Settings read from `labelcode.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encoder: EncoderSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Leave missing values unmapped instead of encoding them as 0.
    pub ignore_nan: bool,
    /// Raw strings read as missing values.
    pub missing_markers: Vec<String>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ignore_nan: false,
            missing_markers: DEFAULT_MISSING_MARKERS
                .iter()
                .map(|x| x.to_string())
                .collect(),
        }
    }
}

impl EncoderSettings {
    pub fn markers(&self) -> MissingMarkers {
        MissingMarkers::new(self.missing_markers.iter().cloned())
    }

    /// Missing-value handling for a fit: an explicit `flag` wins, then the
    /// setting stored with a seed mapping, then `ignore_nan` from the file.
    pub fn ignore_nan_for(&self, flag: Option<bool>, seed: Option<bool>) -> bool {
        flag.or(seed).unwrap_or(self.ignore_nan)
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads `path` if given, otherwise `labelcode.toml` in the working
    /// directory when it exists. Falls back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(CONFIG_FILE).exists() => Path::new(CONFIG_FILE),
            None => return Ok(Self::default()),
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config {path:?}"))?;
        Self::from_toml(&contents).with_context(|| format!("Unable to parse config {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let config = Config::from_toml("")?;
        assert!(!config.encoder.ignore_nan);
        assert!(config.encoder.markers().is_missing("NaN"));
        Ok(())
    }

    #[test]
    fn test_partial_config() -> anyhow::Result<()> {
        let config = Config::from_toml(
            r#"
            [encoder]
            missing_markers = ["?"]
            "#,
        )?;

        assert!(!config.encoder.ignore_nan);
        let markers = config.encoder.markers();
        assert!(markers.is_missing("?"));
        assert!(!markers.is_missing("NaN"));
        Ok(())
    }

    #[test]
    fn test_ignore_nan_precedence() -> anyhow::Result<()> {
        let config = Config::from_toml("[encoder]\nignore_nan = true")?;
        let settings = &config.encoder;

        assert!(settings.ignore_nan_for(None, None));
        assert!(!settings.ignore_nan_for(None, Some(false)));
        assert!(settings.ignore_nan_for(Some(true), Some(false)));
        assert!(!settings.ignore_nan_for(Some(false), Some(true)));

        let defaults = EncoderSettings::default();
        assert!(!defaults.ignore_nan_for(None, None));
        assert!(defaults.ignore_nan_for(None, Some(true)));
        Ok(())
    }

    #[test]
    fn test_bad_flag_type() {
        assert!(Config::from_toml("[encoder]\nignore_nan = \"sometimes\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let path = std::env::temp_dir().join("labelcode_missing_config.toml");
        assert!(Config::load(Some(path.as_path())).is_err());
    }
}
