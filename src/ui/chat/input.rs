//! Chat input component

use dioxus::prelude::*;

pub const PLACEHOLDER: &str = "Ask me anything about INVINCIX...";

#[component]
pub fn ChatInput(on_send: EventHandler<String>, disabled: bool) -> Element {
    let mut text = use_signal(String::new);

    let mut submit = move || {
        let message = text();
        if !disabled && !message.trim().is_empty() {
            on_send.call(message);
            text.set(String::new());
        }
    };

    let handle_keydown = move |evt: KeyboardEvent| {
        if evt.key() == Key::Enter {
            evt.prevent_default();
            submit();
        }
    };

    let can_send = !disabled && !text().trim().is_empty();

    rsx! {
        div { class: "chat-input",
            input {
                r#type: "text",
                placeholder: PLACEHOLDER,
                value: "{text}",
                disabled,
                oninput: move |evt| text.set(evt.value()),
                onkeydown: handle_keydown,
            }
            button {
                class: "button",
                disabled: !can_send,
                onclick: move |_| submit(),
                "Send"
            }
        }
    }
}
