//! LLM inference
//!
//! Model loading, the llama.cpp completion primitive and the response generator
//! that sits between the chat UI and the model.

pub mod engine;
pub mod generator;
pub mod model;
pub mod session;
pub mod stop;

// Re-export main types for convenience
pub use engine::{
    Completion, CompletionModel, CompletionRequest, EngineConfig, EngineError, FinishReason,
    LlamaEngine, LlamaModelHandle, LoadedModelInfo,
};
pub use generator::{GenerationResult, GeneratorConfig, ResponseGenerator};
pub use model::{validate_gguf, GgufHeader, ModelError, GGUF_MAGIC};
pub use session::{LlamaLoader, LlamaSession, LoadError, ModelLoader, ModelSession};
