//! Sidebar: company information, generation settings and model details

pub mod company;

use crate::app::{AppState, ModelState, ModelSummary};
use crate::types::config::{
    clamp_max_tokens, clamp_temperature, MAX_TOKENS_MAX, MAX_TOKENS_MIN, MAX_TOKENS_STEP,
    TEMPERATURE_MAX, TEMPERATURE_MIN, TEMPERATURE_STEP,
};
use crate::ui::markdown::MarkdownContent;
use dioxus::prelude::*;

#[component]
pub fn Sidebar() -> Element {
    let title = company::TITLE;
    let tagline = company::TAGLINE;

    rsx! {
        aside { class: "sidebar",
            h2 { "🚀 {title}" }
            p { class: "sidebar-tagline", "{tagline}" }

            for (heading, body) in company::SECTIONS {
                section { class: "sidebar-section",
                    h3 { "{heading}" }
                    MarkdownContent { content: body.to_string() }
                }
            }

            GenerationSettings {}
            ModelInfo {}
        }
    }
}

/// Creativity and response length sliders plus the clear button
#[component]
fn GenerationSettings() -> Element {
    let app_state = use_context::<AppState>();
    let mut temperature = app_state.temperature;
    let mut max_tokens = app_state.max_tokens;
    let mut transcript = app_state.transcript;
    let is_generating = app_state.is_generating;

    let temperature_value = temperature();
    let max_tokens_value = max_tokens();

    rsx! {
        section { class: "sidebar-section",
            h3 { "⚙️ Settings" }

            div { class: "slider",
                div { class: "slider-header",
                    label { "Response Creativity" }
                    span { "{temperature_value:.1}" }
                }
                input {
                    r#type: "range",
                    min: "{TEMPERATURE_MIN}",
                    max: "{TEMPERATURE_MAX}",
                    step: "{TEMPERATURE_STEP}",
                    value: "{temperature_value}",
                    oninput: move |e| {
                        if let Ok(value) = e.value().parse::<f32>() {
                            temperature.set(clamp_temperature(value));
                        }
                    },
                }
                p { class: "slider-help", "Lower = more consistent, Higher = more creative" }
            }

            div { class: "slider",
                div { class: "slider-header",
                    label { "Response Length" }
                    span { "{max_tokens_value}" }
                }
                input {
                    r#type: "range",
                    min: "{MAX_TOKENS_MIN}",
                    max: "{MAX_TOKENS_MAX}",
                    step: "{MAX_TOKENS_STEP}",
                    value: "{max_tokens_value}",
                    oninput: move |e| {
                        if let Ok(value) = e.value().parse::<u32>() {
                            max_tokens.set(clamp_max_tokens(value));
                        }
                    },
                }
                p { class: "slider-help", "Maximum words in response" }
            }

            button {
                class: "button",
                disabled: is_generating(),
                onclick: move |_| {
                    transcript.write().clear();
                    tracing::info!("Chat history cleared");
                },
                "🗑️ Clear Chat History"
            }
        }
    }
}

#[component]
fn ModelInfo() -> Element {
    let app_state = use_context::<AppState>();
    let state = app_state.model_state.read().clone();
    let path = app_state.settings.read().model_path.display().to_string();

    let (status, summary) = match state {
        ModelState::NotLoaded => ("Not loaded".to_string(), None),
        ModelState::Loading => ("Loading...".to_string(), None),
        ModelState::Loaded(summary) => ("Ready".to_string(), Some(summary)),
        ModelState::Error(e) => (format!("Failed: {e}"), None),
    };

    rsx! {
        section { class: "sidebar-section",
            details { class: "model-info",
                summary { "ℹ️ Model Information" }
                dl {
                    dt { "File" }
                    dd { "{path}" }
                    dt { "Status" }
                    dd { "{status}" }
                    {summary.as_ref().map(model_details)}
                }
            }
        }
    }
}

fn model_details(summary: &ModelSummary) -> Element {
    let params = format_params(summary.param_count);
    let size = format_size(summary.size_bytes);
    let acceleration = if summary.gpu_layers == 0 {
        "CPU only".to_string()
    } else {
        format!("{} GPU layers", summary.gpu_layers)
    };

    rsx! {
        dt { "Parameters" }
        dd { "{params}" }
        dt { "Size" }
        dd { "{size}" }
        dt { "Acceleration" }
        dd { "{acceleration}" }
    }
}

fn format_params(count: u64) -> String {
    if count >= 1_000_000_000 {
        format!("{:.1}B", count as f64 / 1e9)
    } else {
        format!("{:.0}M", count as f64 / 1e6)
    }
}

fn format_size(bytes: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= GIB {
        format!("{:.2} GB", bytes / GIB)
    } else {
        format!("{:.0} MB", bytes / MIB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_params() {
        assert_eq!(format_params(1_235_814_432), "1.2B");
        assert_eq!(format_params(135_000_000), "135M");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(807_694_464), "770 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.00 GB");
    }
}
