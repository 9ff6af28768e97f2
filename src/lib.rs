//! INVINCIX Chatbot Library
//!
//! Core library for the INVINCIX customer-support chatbot: a local GGUF model
//! loaded once per process, a response generator that wraps questions in the
//! company prompt, and the Dioxus desktop interface around them.

pub mod app;
pub mod inference;
pub mod storage;
pub mod types;
pub mod ui;
