//! Settings storage
//!
//! Loads application settings from `settings.json` in the data directory. The
//! file is optional and read-only from the app's point of view: the sidebar
//! sliders only change the running session.

use crate::inference::{EngineConfig, GeneratorConfig};
use crate::storage::{get_data_dir, StorageError};
use crate::types::config::{
    clamp_max_tokens, clamp_temperature, ModelOptions, DEFAULT_CONTEXT_WINDOW,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL_PATH, DEFAULT_TEMPERATURE, DEFAULT_THREADS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_CONTEXT_SIZE: u32 = 1024;
const MAX_CONTEXT_SIZE: u32 = 131072;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// GGUF model file, relative paths resolve against the working directory
    pub model_path: PathBuf,
    /// Context window size
    pub context_size: u32,
    /// CPU threads for inference
    pub threads: u32,
    /// Number of GPU layers to offload (0 = CPU only)
    pub gpu_layers: u32,
    /// Initial value of the creativity slider (0.1 - 1.0)
    pub temperature: f32,
    /// Initial value of the response length slider (100 - 500)
    pub max_tokens: u32,
    /// Top-p (nucleus sampling) parameter (0.0 - 1.0)
    pub top_p: f32,
    /// Top-k sampling parameter
    pub top_k: u32,
    /// Fixed sampler seed for reproducible answers
    pub seed: Option<u32>,
    /// Give up on a generation after this many seconds
    pub generation_timeout_secs: Option<u64>,
    /// Generations allowed to queue behind the running one
    pub max_queued_requests: usize,
    /// Delay between words of the typing animation (0 disables it)
    pub typing_delay_ms: u64,
    /// Let llama.cpp print its own logs
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            context_size: DEFAULT_CONTEXT_WINDOW,
            threads: DEFAULT_THREADS,
            gpu_layers: 0,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: 0.9,
            top_k: 40,
            seed: None,
            generation_timeout_secs: None,
            max_queued_requests: 4,
            typing_delay_ms: 50,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// Validate settings values
    ///
    /// Ensures all parameters are within acceptable ranges.
    pub fn validate(&mut self) {
        self.temperature = clamp_temperature(self.temperature);
        self.max_tokens = clamp_max_tokens(self.max_tokens);
        self.top_p = if self.top_p.is_nan() { 0.9 } else { self.top_p.clamp(0.0, 1.0) };

        if self.top_k == 0 {
            self.top_k = 40;
        }

        if self.threads == 0 {
            self.threads = DEFAULT_THREADS;
        }

        if !(MIN_CONTEXT_SIZE..=MAX_CONTEXT_SIZE).contains(&self.context_size) {
            let capped = self.context_size.clamp(MIN_CONTEXT_SIZE, MAX_CONTEXT_SIZE);
            tracing::warn!(
                "Context size {} out of range, using {}",
                self.context_size,
                capped
            );
            self.context_size = capped;
        }

        if self.model_path.as_os_str().is_empty() {
            self.model_path = PathBuf::from(DEFAULT_MODEL_PATH);
        }

        if self.generation_timeout_secs == Some(0) {
            self.generation_timeout_secs = None;
        }

        self.max_queued_requests = self.max_queued_requests.clamp(1, 64);
        self.typing_delay_ms = self.typing_delay_ms.min(1000);
    }

    /// Options the model session loads the model with
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions::new(&self.model_path)
            .with_context_window(self.context_size)
            .with_threads(self.threads)
            .with_acceleration_layers(self.gpu_layers)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            top_p: self.top_p,
            top_k: self.top_k,
            seed: self.seed,
            deadline: self.generation_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            queue_depth: self.max_queued_requests,
            verbose: self.verbose,
        }
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from disk
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> AppSettings {
    match get_settings_path().and_then(|path| load_settings_from(&path)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    }
}

/// Loads and validates settings from a specific file
pub fn load_settings_from(path: &Path) -> Result<AppSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(AppSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: AppSettings = serde_json::from_str(&json)?;

    // Validate loaded settings
    settings.validate();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.max_tokens, 300);
        assert_eq!(settings.top_p, 0.9);
        assert_eq!(settings.context_size, 2048);
        assert_eq!(settings.threads, 4);
        assert_eq!(settings.gpu_layers, 0);
        assert_eq!(settings.model_options(), ModelOptions::default());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = AppSettings::default();

        settings.temperature = 5.0;
        settings.max_tokens = 4096;
        settings.validate();
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.max_tokens, 500);

        settings.top_p = 2.0;
        settings.top_k = 0;
        settings.threads = 0;
        settings.validate();
        assert_eq!(settings.top_p, 1.0);
        assert_eq!(settings.top_k, 40);
        assert_eq!(settings.threads, 4);

        settings.context_size = 16;
        settings.generation_timeout_secs = Some(0);
        settings.max_queued_requests = 0;
        settings.validate();
        assert_eq!(settings.context_size, 1024);
        assert_eq!(settings.generation_timeout_secs, None);
        assert_eq!(settings.max_queued_requests, 1);
    }

    #[test]
    fn test_derived_configs() {
        let settings = AppSettings {
            seed: Some(42),
            generation_timeout_secs: Some(90),
            gpu_layers: 33,
            max_queued_requests: 2,
            ..AppSettings::default()
        };

        let generator = settings.generator_config();
        assert_eq!(generator.seed, Some(42));
        assert_eq!(generator.deadline, Some(Duration::from_secs(90)));

        assert_eq!(settings.model_options().acceleration_layers, 33);
        assert_eq!(settings.engine_config().queue_depth, 2);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"model_path": "models/invincix.gguf", "threads": 8, "temperature": 9.0}"#,
        )
        .unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("models/invincix.gguf"));
        assert_eq!(settings.threads, 8);
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.max_tokens, 300);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_settings_from(&path), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let mut loaded: AppSettings = serde_json::from_str(&json).unwrap();
        loaded.validate();

        assert_eq!(settings, loaded);
    }
}
