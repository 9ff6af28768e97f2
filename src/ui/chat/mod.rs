//! Chat interface components
//!
//! Contains the main chat view, message display, and input components.

pub mod input;
pub mod message;
pub mod typing;

use crate::app::{AppState, ModelState};
use crate::types::config::GenerationRequest;
use crate::types::message::Role;
use crate::ui::sidebar::company;
use dioxus::prelude::*;
use input::ChatInput;
use message::{MessageBubble, ThinkingBubble};
use std::time::Duration;
use typing::typing_frames;

#[component]
pub fn ChatView() -> Element {
    let app_state = use_context::<AppState>();
    let transcript = app_state.transcript;
    let model_state = app_state.model_state;
    let is_generating = app_state.is_generating;

    // Partially typed reply, None while the model is still thinking
    let typing = use_signal(|| None::<String>);

    let handle_send = {
        let app_state = app_state.clone();
        move |text: String| {
            let app_state = app_state.clone();
            let mut transcript = app_state.transcript;
            let mut is_generating = app_state.is_generating;
            let mut typing = typing;

            if let Err(e) = transcript.write().push(Role::User, text.clone()) {
                tracing::warn!("Ignoring message: {}", e);
                return;
            }
            is_generating.set(true);

            let request = GenerationRequest::new(
                text,
                *app_state.temperature.read(),
                *app_state.max_tokens.read(),
            );
            let delay = Duration::from_millis(app_state.settings.read().typing_delay_ms);

            spawn(async move {
                let result = app_state.respond(request).await;
                if let Some(error) = &result.error {
                    tracing::warn!("Reply fell back to an apology: {}", error);
                }

                if !delay.is_zero() {
                    for frame in typing_frames(&result.text) {
                        typing.set(Some(frame));
                        tokio::time::sleep(delay).await;
                    }
                }
                typing.set(None);

                if let Err(e) = transcript.write().push(Role::Assistant, result.text) {
                    tracing::warn!("Dropping reply: {}", e);
                }
                is_generating.set(false);
            });
        }
    };

    let ready = matches!(*model_state.read(), ModelState::Loaded(_));
    let failed = matches!(*model_state.read(), ModelState::Error(_));

    rsx! {
        div { class: "main",
            Banner {}
            ModelStatus {}

            div { class: "transcript",
                for message in transcript.read().messages().iter() {
                    MessageBubble {
                        key: "{message.id}",
                        role: message.role,
                        content: message.content.clone(),
                    }
                }

                if is_generating() {
                    {pending_reply(typing())}
                }
            }

            // Input stays off until the model is ready
            if !failed {
                ChatInput {
                    on_send: handle_send,
                    disabled: !ready || is_generating(),
                }
            }

            Footer {}
        }
    }
}

fn pending_reply(frame: Option<String>) -> Element {
    match frame {
        Some(frame) => rsx! {
            MessageBubble { role: Role::Assistant, content: frame }
        },
        None => rsx! {
            ThinkingBubble {}
        },
    }
}

#[component]
fn Banner() -> Element {
    let title = company::BANNER_TITLE;
    let tagline = company::TAGLINE;

    rsx! {
        header { class: "banner",
            h1 { "{title}" }
            p { "\"{tagline}\"" }
        }
    }
}

#[component]
fn ModelStatus() -> Element {
    let app_state = use_context::<AppState>();
    let state = app_state.model_state.read().clone();
    let path = app_state.settings.read().model_path.display().to_string();

    match state {
        ModelState::NotLoaded | ModelState::Loading => rsx! {
            div { class: "status status-loading",
                div { class: "spinner" }
                span { "🔄 Loading INVINCIX chatbot model..." }
            }
        },
        ModelState::Loaded(_) => rsx! {
            div { class: "status status-success", "✅ Chatbot loaded successfully!" }
        },
        ModelState::Error(error) => rsx! {
            div { class: "status status-error",
                p {
                    strong { "❌ Error loading model: " }
                    "{error}"
                }
                h3 { "Troubleshooting:" }
                ol {
                    li { "Make sure the GGUF model file exists at the configured path" }
                    li { "Set \"model_path\" in settings.json if the model lives elsewhere" }
                    li { "Check if the model file is corrupted" }
                }
                p {
                    strong { "Model Path Expected: " }
                    code { "{path}" }
                }
            }
        },
    }
}

#[component]
fn Footer() -> Element {
    rsx! {
        footer { class: "footer",
            p {
                "💡 "
                strong { "Tip" }
                ": Try asking about our services, products, company culture, or how we can help your business!"
            }
            p {
                "Powered by fine-tuned AI | Built for INVINCIX | "
                em { "\"We keep our feet grounded to ensure your head is in the cloud\"" }
            }
        }
    }
}
