//! Root Dioxus application component
//!
//! This module contains the application-lifetime state and the App component
//! that serves as the root of the UI tree.

use crate::inference::generator::apology;
use crate::inference::{
    GenerationResult, LlamaLoader, LlamaSession, LoadedModelInfo, ResponseGenerator,
};
use crate::storage::settings::{load_settings, AppSettings};
use crate::types::config::GenerationRequest;
use crate::types::message::Transcript;
use crate::ui::Layout;
use dioxus::prelude::*;
use std::sync::Arc;

/// What the sidebar shows about the loaded model
#[derive(Clone, PartialEq, Debug)]
pub struct ModelSummary {
    pub path: String,
    pub param_count: u64,
    pub size_bytes: u64,
    pub gpu_layers: u32,
}

impl ModelSummary {
    fn new(info: &LoadedModelInfo, gpu_layers: u32) -> Self {
        Self {
            path: info.path.clone(),
            param_count: info.param_count,
            size_bytes: info.size_bytes,
            gpu_layers,
        }
    }
}

/// Represents the current state of the model
#[derive(Clone, PartialEq, Debug)]
pub enum ModelState {
    NotLoaded,
    Loading,
    Loaded(ModelSummary),
    Error(String),
}

/// Global application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<LlamaSession>,
    pub generator: Arc<ResponseGenerator>,
    pub settings: Signal<AppSettings>,
    /// Creativity slider value
    pub temperature: Signal<f32>,
    /// Response length slider value
    pub max_tokens: Signal<u32>,
    pub transcript: Signal<Transcript>,
    pub model_state: Signal<ModelState>,
    /// True while a reply is being generated or typed out
    pub is_generating: Signal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        let settings = load_settings();
        tracing::info!("AppState initialized (model {})", settings.model_path.display());

        Self {
            session: Arc::new(LlamaSession::new(LlamaLoader::new(settings.engine_config()))),
            generator: Arc::new(ResponseGenerator::new(settings.generator_config())),
            temperature: Signal::new(settings.temperature),
            max_tokens: Signal::new(settings.max_tokens),
            settings: Signal::new(settings),
            transcript: Signal::new(Transcript::with_greeting()),
            model_state: Signal::new(ModelState::NotLoaded),
            is_generating: Signal::new(false),
        }
    }

    /// Loads the configured model on the blocking pool
    pub async fn load_model(&mut self) {
        self.model_state.set(ModelState::Loading);

        let session = Arc::clone(&self.session);
        let options = self.settings.read().model_options();
        let gpu_layers = options.acceleration_layers;

        let result = tokio::task::spawn_blocking(move || {
            session
                .load(&options)
                .map(|model| ModelSummary::new(model.info(), gpu_layers))
        })
        .await;

        let state = match result {
            Ok(Ok(summary)) => {
                tracing::info!("Chatbot model ready: {}", summary.path);
                ModelState::Loaded(summary)
            }
            Ok(Err(e)) => ModelState::Error(e.to_string()),
            Err(e) => ModelState::Error(format!("model loader stopped unexpectedly: {e}")),
        };
        self.model_state.set(state);
    }

    /// Generates the reply to one request; always yields displayable text
    pub async fn respond(&self, request: GenerationRequest) -> GenerationResult {
        let session = Arc::clone(&self.session);
        let generator = Arc::clone(&self.generator);
        let options = self.settings.read().model_options();

        let result = tokio::task::spawn_blocking(move || match session.load(&options) {
            Ok(model) => generator.generate(&*model, &request),
            Err(e) => {
                let detail = e.to_string();
                GenerationResult {
                    text: apology(&detail),
                    error: Some(detail),
                }
            }
        })
        .await;

        result.unwrap_or_else(|e| {
            tracing::error!("Generation task failed: {}", e);
            let detail = e.to_string();
            GenerationResult {
                text: apology(&detail),
                error: Some(detail),
            }
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn App() -> Element {
    let app_state = use_context_provider(AppState::new);

    use_hook(move || {
        let mut app_state = app_state.clone();
        spawn(async move {
            app_state.load_model().await;
        });
    });

    rsx! {
        Layout {}
    }
}
