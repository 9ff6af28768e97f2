//! UI components for the INVINCIX chatbot
//!
//! This module contains all user interface components built with Dioxus.

pub mod chat;
pub mod markdown;
pub mod sidebar;
pub mod theme;

use chat::ChatView;
use dioxus::prelude::*;
use sidebar::Sidebar;

/// Sidebar on the left, chat column on the right
#[component]
pub fn Layout() -> Element {
    rsx! {
        div { class: "layout",
            Sidebar {}
            ChatView {}
        }
    }
}
