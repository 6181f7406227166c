//! Demo configuration

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use dl_tensor::MemoryRegion;
use inference_engine::{ModelLocation, StorageConfig};
use serde::{Deserialize, Serialize};

use crate::demo::DemoSettings;
use crate::input::{INPUT_DIMS, INPUT_EXPONENT, INPUT_NAME};

/// Config file looked up next to the binary (any format `config` supports)
pub const DEFAULT_CONFIG_FILE: &str = "gesture-demo";

/// Prefix of environment overrides, e.g. `GESTURE_INPUT_EXPONENT=-6`
pub const ENV_PREFIX: &str = "GESTURE";

/// Which inference backend runs the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// ONNX model through tract
    #[default]
    Tract,
    /// Fixed scores, no model file needed
    Mock,
}

/// Demo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Model name in storage
    pub model_identifier: String,
    pub model_location: ModelLocation,
    pub storage: StorageConfig,
    pub backend: BackendKind,

    /// Input slot name declared by the model
    pub input_name: String,
    /// Exponent the input image was quantized with
    pub input_exponent: i32,
    pub input_region: MemoryRegion,
    /// Abort if the model declares a different input exponent
    pub check_input_exponent: bool,

    /// Quantize this image at startup instead of using the embedded one
    pub input_image: Option<PathBuf>,
    /// Write the dequantized input back out as a PNG
    pub dump_input: Option<PathBuf>,

    /// Scores returned by the mock backend
    pub mock_scores: Vec<i8>,
    pub mock_exponent: i32,

    /// Maximum log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            model_identifier: "model".to_string(),
            model_location: ModelLocation::FlashPartition,
            storage: StorageConfig::default(),
            backend: BackendKind::Tract,
            input_name: INPUT_NAME.to_string(),
            input_exponent: INPUT_EXPONENT,
            input_region: MemoryRegion::External,
            check_input_exponent: false,
            input_image: None,
            dump_input: None,
            mock_scores: vec![10, -5, 3, 0, 0, 0, 0, 0],
            mock_exponent: -7,
            log_level: "info".to_string(),
        }
    }
}

impl DemoConfig {
    /// Load from the default config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from `path` (optional) layered under environment overrides
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Demo settings for running on `input`
    pub fn settings<'a>(&'a self, input: &'a [i8]) -> DemoSettings<'a> {
        DemoSettings {
            model_identifier: &self.model_identifier,
            location: self.model_location,
            input_name: &self.input_name,
            input,
            input_dims: &INPUT_DIMS,
            input_exponent: self.input_exponent,
            region: self.input_region,
            check_input_exponent: self.check_input_exponent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TEST_IMAGE;

    #[test]
    fn test_defaults_match_deployment() {
        let config = DemoConfig::default();
        let settings = config.settings(&TEST_IMAGE);
        let embedded = DemoSettings::embedded();

        assert_eq!(settings.model_identifier, embedded.model_identifier);
        assert_eq!(settings.location, embedded.location);
        assert_eq!(settings.input_name, embedded.input_name);
        assert_eq!(settings.input_dims, embedded.input_dims);
        assert_eq!(settings.input_exponent, embedded.input_exponent);
        assert_eq!(settings.region, embedded.region);
        assert!(!settings.check_input_exponent);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = DemoConfig::load_from("/nonexistent/gesture-demo.toml").unwrap();
        assert_eq!(config.model_identifier, "model");
        assert_eq!(config.backend, BackendKind::Tract);
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("GESTURE_MOCK_EXPONENT", "-5");
        std::env::set_var("GESTURE_LOG_LEVEL", "debug");

        let config = DemoConfig::load_from("/nonexistent/gesture-demo.toml");

        std::env::remove_var("GESTURE_MOCK_EXPONENT");
        std::env::remove_var("GESTURE_LOG_LEVEL");

        let config = config.unwrap();
        assert_eq!(config.mock_exponent, -5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_toml_file() {
        let dir = std::env::temp_dir().join(format!("gesture-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("demo.toml");
        std::fs::write(
            &path,
            r#"
backend = "mock"
model_location = "sd_card"
input_exponent = -6
check_input_exponent = true
mock_scores = [1, 2, 3, 4, 5, 6, 7, 8]

[storage]
sdcard_dir = "/mnt/sd"
"#,
        )
        .unwrap();

        let config = DemoConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.model_location, ModelLocation::SdCard);
        assert_eq!(config.input_exponent, -6);
        assert!(config.check_input_exponent);
        assert_eq!(config.mock_scores, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(config.storage.sdcard_dir, PathBuf::from("/mnt/sd"));
        // Untouched keys keep their defaults
        assert_eq!(config.storage.partition_dir, PathBuf::from("partitions/model"));
        assert_eq!(config.input_region, MemoryRegion::External);
    }
}
