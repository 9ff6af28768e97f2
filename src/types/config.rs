//! Configuration types
//!
//! Model loading options and per-message generation requests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Model file looked up in the working directory when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "Llama-3.2-1B.Q4_K_M.gguf";
pub const DEFAULT_CONTEXT_WINDOW: u32 = 2048;
pub const DEFAULT_THREADS: u32 = 4;

pub const TEMPERATURE_MIN: f32 = 0.1;
pub const TEMPERATURE_MAX: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const MAX_TOKENS_MIN: u32 = 100;
pub const MAX_TOKENS_MAX: u32 = 500;
pub const MAX_TOKENS_STEP: u32 = 50;
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Parameters a model is loaded with. Two loads with equal options share one handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Path to the GGUF file
    pub path: PathBuf,
    /// Context window in tokens (prompt + generated)
    pub context_window: u32,
    /// CPU threads used for generation and prompt processing
    pub threads: u32,
    /// Layers offloaded to the GPU (0 = CPU only)
    pub acceleration_layers: u32,
}

impl ModelOptions {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            threads: DEFAULT_THREADS,
            acceleration_layers: 0,
        }
    }

    pub fn with_context_window(mut self, context_window: u32) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_acceleration_layers(mut self, layers: u32) -> Self {
        self.acceleration_layers = layers;
        self
    }

    /// Rejects options llama.cpp cannot work with
    pub fn check(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("model path is empty".to_string());
        }
        if self.context_window == 0 {
            return Err("context window must be positive".to_string());
        }
        if self.threads == 0 {
            return Err("thread count must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

/// One user submission with the slider values at the time it was sent
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub user_message: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Builds a request, clamping the sampling values into their slider ranges
    pub fn new(user_message: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            user_message: user_message.into(),
            temperature: clamp_temperature(temperature),
            max_tokens: clamp_max_tokens(max_tokens),
        }
    }
}

pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() {
        return DEFAULT_TEMPERATURE;
    }
    temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)
}

pub fn clamp_max_tokens(max_tokens: u32) -> u32 {
    max_tokens.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX)
}
