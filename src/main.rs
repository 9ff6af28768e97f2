use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use invincix_chat::app::App;
use invincix_chat::ui::theme::STYLESHEET;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("invincix_chat=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting INVINCIX Chatbot v{}", env!("CARGO_PKG_VERSION"));

    let window = WindowBuilder::new()
        .with_title("INVINCIX Chatbot v1")
        .with_inner_size(LogicalSize::new(1200.0, 820.0));

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(window)
                .with_custom_head(format!("<style>{STYLESHEET}</style>")),
        )
        .launch(App);
}
