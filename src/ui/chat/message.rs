//! Message display component

use crate::types::message::Role;
use crate::ui::markdown::MarkdownContent;
use dioxus::prelude::*;

#[component]
pub fn MessageBubble(role: Role, content: String) -> Element {
    match role {
        // User text is shown as typed
        Role::User => rsx! {
            div { class: "message message-user",
                div { class: "avatar", "👤" }
                div { class: "bubble", "{content}" }
            }
        },
        Role::Assistant => rsx! {
            div { class: "message message-assistant",
                div { class: "avatar", "🤖" }
                div { class: "bubble",
                    MarkdownContent { content }
                }
            }
        },
    }
}

/// Placeholder bubble while the model is still generating
#[component]
pub fn ThinkingBubble() -> Element {
    rsx! {
        div { class: "message message-assistant",
            div { class: "avatar", "🤖" }
            div { class: "bubble thinking", "Thinking..." }
        }
    }
}
