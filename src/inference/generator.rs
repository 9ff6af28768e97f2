//! Response generator
//!
//! Wraps a user message in the assistant's instruction template, runs one
//! completion and cleans the result up for display. Every path returns text:
//! completion failures turn into an apology the UI can show as-is.

use std::time::Duration;

use crate::inference::engine::{CompletionModel, CompletionRequest};
use crate::inference::stop::truncate_at_stop;
use crate::types::config::GenerationRequest;

/// Instruction section of the prompt
pub const INSTRUCTION: &str = "You are a helpful and empathetic assistant for INVINCIX, a software engineering and product development company. Respond to the customer's inquiry with warmth, professionalism, and accurate information about INVINCIX's services, products, and values. Keep your response concise and engaging.";

const PREAMBLE: &str = "Below is an instruction that describes a task, paired with an input that provides further context. Write a response that appropriately completes the request as an INVINCIX chatbot assistant.";

/// Marker the model answers after; echoed copies are cut off the output
pub const RESPONSE_MARKER: &str = "### Response:";

/// Generation halts on any of these
pub const STOP_SEQUENCES: [&str; 4] = ["###", "\n\n\n\n", "### Input:", "### Instruction:"];

pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TOP_K: u32 = 40;

/// Shown when the model produced nothing usable
pub const EMPTY_REPLY: &str =
    "I'm sorry, I couldn't come up with an answer to that. Could you rephrase your question?";

/// Text for the UI plus the failure detail, if there was one
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub text: String,
    pub error: Option<String>,
}

/// Fixed sampling settings shared by every request
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub top_p: f32,
    pub top_k: u32,
    pub seed: Option<u32>,
    pub deadline: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            seed: None,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseGenerator {
    config: GeneratorConfig,
    stops: Vec<String>,
}

impl ResponseGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            stops: STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds the completion call for a request
    pub fn completion_request(&self, request: &GenerationRequest) -> CompletionRequest {
        CompletionRequest {
            prompt: build_prompt(&request.user_message),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_k: self.config.top_k,
            top_p: self.config.top_p,
            stop: self.stops.clone(),
            seed: self.config.seed,
            deadline: self.config.deadline,
        }
    }

    /// Produces the assistant's reply to one user message
    pub fn generate(
        &self,
        model: &dyn CompletionModel,
        request: &GenerationRequest,
    ) -> GenerationResult {
        let completion_request = self.completion_request(request);

        match model.complete(&completion_request) {
            Ok(completion) => {
                tracing::debug!(
                    "Completion finished after {} tokens ({:?})",
                    completion.tokens_generated,
                    completion.finish
                );
                let text = self.clean_completion(&completion.text);
                if text.is_empty() {
                    tracing::warn!("Model returned an empty answer");
                    return GenerationResult {
                        text: EMPTY_REPLY.to_string(),
                        error: None,
                    };
                }
                GenerationResult { text, error: None }
            }
            Err(e) => {
                let detail = e.to_string();
                tracing::error!("Generation failed: {}", detail);
                GenerationResult {
                    text: apology(&detail),
                    error: Some(detail),
                }
            }
        }
    }

    /// Trims the completion, drops an echoed template and any leaked stop sequence
    pub fn clean_completion(&self, raw: &str) -> String {
        let mut answer = raw.trim();
        if let Some(pos) = answer.rfind(RESPONSE_MARKER) {
            answer = answer[pos + RESPONSE_MARKER.len()..].trim();
        }
        truncate_at_stop(answer, &self.stops).trim().to_string()
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// The apology shown in place of an answer when generation fails
pub fn apology(detail: &str) -> String {
    format!("I apologize, but I encountered an error: {detail}. Please try again.")
}

/// Fills the instruction template with a sanitized user message
pub fn build_prompt(user_message: &str) -> String {
    let input = sanitize_user_message(user_message);
    format!(
        "{PREAMBLE}\n\n### Instruction:\n{INSTRUCTION}\n\n### Input:\n{input}\n\n{RESPONSE_MARKER}\n"
    )
}

/// Caps runs of `#` at two so user text can never open a template section
pub fn sanitize_user_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut run = 0usize;
    for ch in message.chars() {
        if ch == '#' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(ch);
    }
    if out.len() != message.len() {
        tracing::debug!("Collapsed section markers in user message");
    }
    out
}
