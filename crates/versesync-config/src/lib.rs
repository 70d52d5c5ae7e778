use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use versesync_engine::SegmentationOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Extra paragraph styles and surface-only embeds, added to the engine defaults
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub para_styles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotation_embeds: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub texts_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<SegmentationConfig>,
}

impl Config {
    pub fn new(texts_path: impl Into<PathBuf>) -> Self {
        Self {
            texts_path: texts_path.into(),
            segmentation: None,
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.texts_path = Self::expand_path(&config.texts_path).unwrap_or(config.texts_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/versesync");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Engine options: the defaults plus anything listed under `[segmentation]`
    pub fn segmentation_options(&self) -> SegmentationOptions {
        let mut options = SegmentationOptions::default();
        if let Some(segmentation) = &self.segmentation {
            options
                .para_styles
                .extend(segmentation.para_styles.iter().cloned());
            options
                .annotation_embeds
                .extend(segmentation.annotation_embeds.iter().cloned());
        }
        options
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
