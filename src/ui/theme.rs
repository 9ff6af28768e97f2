//! Stylesheet injected into the desktop window head

pub const STYLESHEET: &str = r#"
:root {
    --brand-start: #667eea;
    --brand-end: #764ba2;
    --sidebar-bg: #2c3e50;
    --sidebar-text: #ecf0f1;
    --main-bg: #f8f9fa;
    --text-primary: #2c3e50;
    --text-secondary: #6c757d;
    --user-bubble: #e3f2fd;
    --assistant-bubble: #ffffff;
    --error: #c0392b;
    --success: #27ae60;
}

* { box-sizing: border-box; }

html, body, #main {
    margin: 0;
    height: 100%;
    font-family: -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
    color: var(--text-primary);
    background: var(--main-bg);
}

.layout { display: flex; height: 100vh; }

.sidebar {
    width: 300px;
    flex-shrink: 0;
    overflow-y: auto;
    padding: 1.25rem;
    background: var(--sidebar-bg);
    color: var(--sidebar-text);
}
.sidebar h2 { margin: 0 0 0.25rem; font-size: 1.4rem; }
.sidebar-tagline { margin: 0 0 1rem; font-size: 0.85rem; opacity: 0.8; }
.sidebar-section { margin-bottom: 1.25rem; }
.sidebar-section h3 {
    margin: 0 0 0.5rem;
    font-size: 1rem;
    border-bottom: 1px solid rgba(255, 255, 255, 0.15);
    padding-bottom: 0.25rem;
}
.sidebar a { color: #8ab4f8; }
.sidebar .markdown p { margin: 0.25rem 0; }
.sidebar .markdown ul { margin: 0.25rem 0; padding-left: 1.25rem; }

.slider { margin-bottom: 0.9rem; }
.slider-header { display: flex; justify-content: space-between; font-size: 0.9rem; }
.slider input { width: 100%; accent-color: var(--brand-start); }
.slider-help { margin: 0.2rem 0 0; font-size: 0.75rem; opacity: 0.7; }

.button {
    width: 100%;
    padding: 0.55rem;
    border: none;
    border-radius: 6px;
    cursor: pointer;
    color: #fff;
    background: linear-gradient(90deg, var(--brand-start), var(--brand-end));
}
.button:disabled { opacity: 0.5; cursor: not-allowed; }

details.model-info { font-size: 0.85rem; }
details.model-info summary { cursor: pointer; font-weight: 600; }
details.model-info dl { margin: 0.5rem 0 0; }
details.model-info dt { opacity: 0.7; }
details.model-info dd { margin: 0 0 0.4rem; word-break: break-all; }

.main { flex: 1; display: flex; flex-direction: column; min-width: 0; }

.banner {
    padding: 1.25rem 1.5rem;
    text-align: center;
    color: #fff;
    background: linear-gradient(90deg, var(--brand-start) 0%, var(--brand-end) 100%);
}
.banner h1 { margin: 0; font-size: 1.8rem; }
.banner p { margin: 0.3rem 0 0; opacity: 0.9; }

.status { margin: 0.75rem 1.5rem 0; padding: 0.75rem 1rem; border-radius: 8px; }
.status-loading { background: #eef2ff; display: flex; align-items: center; gap: 0.6rem; }
.status-success { background: #e8f8ef; color: var(--success); }
.status-error { background: #fdecea; color: var(--error); }
.status-error ol { margin: 0.5rem 0 0; }

.spinner {
    width: 16px;
    height: 16px;
    border: 2px solid var(--brand-start);
    border-top-color: transparent;
    border-radius: 50%;
    animation: spin 0.8s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }

.transcript { flex: 1; overflow-y: auto; padding: 1rem 1.5rem; }

.message { display: flex; gap: 0.6rem; margin-bottom: 0.9rem; }
.message-user { flex-direction: row-reverse; }
.avatar { font-size: 1.4rem; line-height: 1.6rem; }
.bubble {
    max-width: 75%;
    padding: 0.6rem 0.9rem;
    border-radius: 10px;
    line-height: 1.5;
    box-shadow: 0 1px 3px rgba(0, 0, 0, 0.08);
}
.message-user .bubble { background: var(--user-bubble); white-space: pre-wrap; }
.message-assistant .bubble { background: var(--assistant-bubble); }
.bubble .markdown p { margin: 0.3rem 0; }
.thinking { font-style: italic; color: var(--text-secondary); }

.md-h1 { font-size: 1.3rem; font-weight: 700; margin: 0.4rem 0; }
.md-h2 { font-size: 1.15rem; font-weight: 700; margin: 0.4rem 0; }
.md-h3 { font-size: 1rem; font-weight: 600; margin: 0.4rem 0; }
.markdown code { background: rgba(0, 0, 0, 0.06); padding: 0 0.25rem; border-radius: 4px; }

.chat-input { display: flex; gap: 0.5rem; padding: 0.75rem 1.5rem; border-top: 1px solid #e1e4e8; }
.chat-input input {
    flex: 1;
    padding: 0.65rem 0.9rem;
    border: 1px solid #ced4da;
    border-radius: 20px;
    font-size: 0.95rem;
}
.chat-input .button { width: auto; padding: 0.55rem 1.2rem; border-radius: 20px; }

.footer {
    padding: 0.6rem 1.5rem;
    text-align: center;
    font-size: 0.8rem;
    color: var(--text-secondary);
}
.footer p { margin: 0.15rem 0; }
"#;
