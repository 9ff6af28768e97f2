//! Inference engine implementation
//!
//! Core logic for managing llama-cpp models and running completions.
//!
//! # Architecture
//!
//! Since llama-cpp-2 types (`LlamaBackend`, `LlamaModel`, `LlamaContext`) contain
//! raw pointers that are not `Send`, the backend and every loaded model live on a
//! dedicated worker thread. Callers talk to it over a bounded command queue, so all
//! completions run one at a time and the queue depth caps how many can be pending.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::token::LlamaToken;
use thiserror::Error;

use crate::inference::stop::StopMatcher;
use crate::types::config::ModelOptions;

/// Maximum tokens decoded per batch while processing the prompt
const PREFILL_BATCH_SIZE: usize = 512;

/// Errors that can occur during inference operations
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("Failed to initialize backend: {0}")]
    BackendInit(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Model is no longer loaded")]
    UnknownModel,

    #[error("Failed to create context: {0}")]
    ContextCreate(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Prompt needs {prompt_tokens} tokens but the context window is {context_window}")]
    ContextOverflow {
        prompt_tokens: usize,
        context_window: u32,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Too many requests in flight, try again in a moment")]
    Busy,

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation was cancelled")]
    Cancelled,

    #[error("Worker thread error: {0}")]
    WorkerError(String),
}

/// A single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fully formatted prompt text
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Temperature for sampling (below 0.01 = greedy)
    pub temperature: f32,
    /// Top-k sampling parameter (0 = disabled)
    pub top_k: u32,
    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,
    /// Generation halts before any of these would be emitted
    pub stop: Vec<String>,
    /// Fixed sampler seed, random when unset
    pub seed: Option<u32>,
    /// How long the caller waits before giving up
    pub deadline: Option<Duration>,
}

/// Why generation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// A stop sequence appeared; it is not part of the text
    StopSequence(String),
    /// The model produced an end-of-generation token
    EndOfGeneration,
    /// The token budget ran out
    Length,
}

/// Output of a completion call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_generated: u32,
    pub finish: FinishReason,
}

/// The completion primitive: prompt and sampling parameters in, generated text out
pub trait CompletionModel: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, EngineError>;
}

/// Model information after loading
#[derive(Debug, Clone)]
pub struct LoadedModelInfo {
    /// Path to the loaded model
    pub path: String,
    /// Vocabulary size
    pub vocab_size: i32,
    /// Embedding dimension
    pub embedding_dim: i32,
    /// Training context length
    pub context_length: u32,
    /// Total parameter count
    pub param_count: u64,
    /// Model size in bytes
    pub size_bytes: u64,
}

/// Engine-wide settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Completions allowed to wait in the queue before new ones are refused
    pub queue_depth: usize,
    /// Forward llama.cpp's own logging to stderr
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_depth: 4,
            verbose: false,
        }
    }
}

/// Commands sent to the worker thread
enum WorkerCommand {
    LoadModel {
        options: ModelOptions,
        response_tx: Sender<Result<(u64, LoadedModelInfo), EngineError>>,
    },
    Generate {
        model_id: u64,
        request: CompletionRequest,
        cancel: Arc<AtomicBool>,
        response_tx: Sender<Result<Completion, EngineError>>,
    },
    Shutdown,
}

/// The llama.cpp inference engine
///
/// Owns the worker thread; models loaded through it stay resident until the
/// engine is dropped.
pub struct LlamaEngine {
    /// Bounded channel to the worker thread
    command_tx: Option<SyncSender<WorkerCommand>>,
    /// Handle to the worker thread
    worker_handle: Option<JoinHandle<()>>,
}

impl LlamaEngine {
    /// Spawns the worker thread and initializes the llama.cpp backend on it
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let (command_tx, command_rx) =
            mpsc::sync_channel::<WorkerCommand>(config.queue_depth.max(1));
        let (init_tx, init_rx) = mpsc::channel::<Result<(), EngineError>>();
        let verbose = config.verbose;

        let handle = thread::Builder::new()
            .name("llama-worker".to_string())
            .spawn(move || {
                let mut backend = match LlamaBackend::init() {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::error!("Failed to init backend: {}", e);
                        let _ = init_tx.send(Err(EngineError::BackendInit(e.to_string())));
                        return;
                    }
                };
                if !verbose {
                    backend.void_logs();
                }
                let _ = init_tx.send(Ok(()));
                worker_thread_main(backend, command_rx);
            })
            .map_err(|e| EngineError::WorkerError(e.to_string()))?;

        init_rx
            .recv()
            .map_err(|e| EngineError::WorkerError(e.to_string()))??;

        tracing::info!(
            queue_depth = config.queue_depth,
            "LlamaEngine worker thread started"
        );
        Ok(Self {
            command_tx: Some(command_tx),
            worker_handle: Some(handle),
        })
    }

    /// Loads a GGUF model with the given options
    ///
    /// Every call loads a fresh copy; deduplication is the session's job.
    pub fn load_model(
        self: &Arc<Self>,
        options: &ModelOptions,
    ) -> Result<LlamaModelHandle, EngineError> {
        let command_tx = self.sender()?;
        let (response_tx, response_rx) = mpsc::channel();

        // Loads wait for queue space instead of failing with Busy
        command_tx
            .send(WorkerCommand::LoadModel {
                options: options.clone(),
                response_tx,
            })
            .map_err(|e| EngineError::WorkerError(e.to_string()))?;

        let (model_id, info) = response_rx
            .recv()
            .map_err(|e| EngineError::WorkerError(e.to_string()))??;

        Ok(LlamaModelHandle {
            engine: Arc::clone(self),
            model_id,
            options: options.clone(),
            info,
        })
    }

    fn complete(
        &self,
        model_id: u64,
        request: &CompletionRequest,
    ) -> Result<Completion, EngineError> {
        let (response_tx, response_rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let command = WorkerCommand::Generate {
            model_id,
            request: request.clone(),
            cancel: Arc::clone(&cancel),
            response_tx,
        };

        submit(self.sender()?, command, &response_rx, &cancel, request.deadline)
    }

    fn sender(&self) -> Result<&SyncSender<WorkerCommand>, EngineError> {
        self.command_tx
            .as_ref()
            .ok_or_else(|| EngineError::WorkerError("engine is shut down".to_string()))
    }
}

impl Drop for LlamaEngine {
    fn drop(&mut self) {
        // A full queue still drains; dropping the sender ends the loop afterwards
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.try_send(WorkerCommand::Shutdown);
        }
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Queues a command without blocking and waits for its reply
///
/// A full queue fails with `Busy`. When `deadline` passes first, `cancel` is
/// raised so the worker drops or stops the request, and `Timeout` is returned.
fn submit<C, R>(
    command_tx: &SyncSender<C>,
    command: C,
    response_rx: &Receiver<Result<R, EngineError>>,
    cancel: &AtomicBool,
    deadline: Option<Duration>,
) -> Result<R, EngineError> {
    command_tx.try_send(command).map_err(|e| match e {
        TrySendError::Full(_) => EngineError::Busy,
        TrySendError::Disconnected(_) => {
            EngineError::WorkerError("worker thread has exited".to_string())
        }
    })?;

    match deadline {
        Some(deadline) => match response_rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Relaxed);
                tracing::warn!("Generation exceeded deadline of {:?}", deadline);
                Err(EngineError::Timeout(deadline))
            }
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::WorkerError(
                "worker dropped the request".to_string(),
            )),
        },
        None => response_rx
            .recv()
            .map_err(|e| EngineError::WorkerError(e.to_string()))?,
    }
}

/// A model resident on the worker thread
///
/// Cloning the handle is cheap; the model stays loaded as long as the engine lives.
#[derive(Clone)]
pub struct LlamaModelHandle {
    engine: Arc<LlamaEngine>,
    model_id: u64,
    options: ModelOptions,
    info: LoadedModelInfo,
}

impl LlamaModelHandle {
    pub fn info(&self) -> &LoadedModelInfo {
        &self.info
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }
}

impl std::fmt::Debug for LlamaModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlamaModelHandle")
            .field("model_id", &self.model_id)
            .field("options", &self.options)
            .finish()
    }
}

impl CompletionModel for LlamaModelHandle {
    fn complete(&self, request: &CompletionRequest) -> Result<Completion, EngineError> {
        self.engine.complete(self.model_id, request)
    }
}

/// A model plus the options it was loaded with
struct WorkerModel {
    model: LlamaModel,
    options: ModelOptions,
}

/// Worker thread main loop
///
/// Owns the LlamaBackend and all loaded models, processes commands in order.
fn worker_thread_main(backend: LlamaBackend, command_rx: Receiver<WorkerCommand>) {
    let mut models: HashMap<u64, WorkerModel> = HashMap::new();
    let mut next_id: u64 = 1;

    loop {
        match command_rx.recv() {
            Ok(WorkerCommand::LoadModel {
                options,
                response_tx,
            }) => {
                let result = load_model_internal(&backend, &options).map(|(model, info)| {
                    let id = next_id;
                    next_id += 1;
                    models.insert(id, WorkerModel { model, options });
                    (id, info)
                });
                let _ = response_tx.send(result);
            }
            Ok(WorkerCommand::Generate {
                model_id,
                request,
                cancel,
                response_tx,
            }) => {
                if cancel.load(Ordering::Relaxed) {
                    tracing::debug!("Skipping request abandoned while queued");
                    continue;
                }
                let result = match models.get(&model_id) {
                    Some(loaded) => run_generation(&backend, loaded, &request, &cancel),
                    None => Err(EngineError::UnknownModel),
                };
                if let Err(ref e) = result {
                    tracing::warn!("Generation failed: {}", e);
                }
                let _ = response_tx.send(result);
            }
            Ok(WorkerCommand::Shutdown) => {
                tracing::info!("Worker thread shutting down");
                break;
            }
            Err(_) => {
                // Channel closed, exit
                tracing::debug!("Command channel closed, worker exiting");
                break;
            }
        }
    }
}

/// Loads the model file and extracts its metadata
fn load_model_internal(
    backend: &LlamaBackend,
    options: &ModelOptions,
) -> Result<(LlamaModel, LoadedModelInfo), EngineError> {
    let path: &PathBuf = &options.path;
    let model_params = LlamaModelParams::default().with_n_gpu_layers(options.acceleration_layers);

    let model = LlamaModel::load_from_file(backend, path, &model_params)
        .map_err(|e| EngineError::ModelLoad(e.to_string()))?;

    let info = LoadedModelInfo {
        path: path.to_string_lossy().to_string(),
        vocab_size: model.n_vocab(),
        embedding_dim: model.n_embd(),
        context_length: model.n_ctx_train(),
        param_count: model.n_params() as u64,
        size_bytes: model.size() as u64,
    };

    tracing::info!(
        "Model loaded: {} ({} params, {} vocab, {} ctx, {} gpu layers)",
        info.path,
        info.param_count,
        info.vocab_size,
        info.context_length,
        options.acceleration_layers
    );

    Ok((model, info))
}

/// Run one completion (called from worker thread)
fn run_generation(
    backend: &LlamaBackend,
    loaded: &WorkerModel,
    request: &CompletionRequest,
    cancel: &AtomicBool,
) -> Result<Completion, EngineError> {
    let model = &loaded.model;
    let n_ctx = loaded.options.context_window;

    let tokens = model
        .str_to_token(&request.prompt, AddBos::Always)
        .map_err(|e| EngineError::Tokenization(e.to_string()))?;

    if tokens.is_empty() {
        return Err(EngineError::Tokenization("prompt produced no tokens".to_string()));
    }
    if tokens.len() >= n_ctx as usize {
        return Err(EngineError::ContextOverflow {
            prompt_tokens: tokens.len(),
            context_window: n_ctx,
        });
    }
    tracing::debug!("Tokenized prompt into {} tokens", tokens.len());

    let threads = loaded.options.threads as i32;
    let ctx_params = LlamaContextParams::default()
        .with_n_ctx(NonZeroU32::new(n_ctx))
        .with_n_batch(PREFILL_BATCH_SIZE as u32)
        .with_n_threads(threads)
        .with_n_threads_batch(threads);

    let mut ctx = model
        .new_context(backend, ctx_params)
        .map_err(|e| EngineError::ContextCreate(e.to_string()))?;

    let budget = request.max_tokens.min(n_ctx - tokens.len() as u32);
    run_inference(&mut ctx, model, &tokens, budget, request, cancel)
}

/// Runs prefill and the sampling loop
fn run_inference(
    ctx: &mut LlamaContext,
    model: &LlamaModel,
    prompt_tokens: &[LlamaToken],
    budget: u32,
    request: &CompletionRequest,
    cancel: &AtomicBool,
) -> Result<Completion, EngineError> {
    let mut batch = LlamaBatch::new(PREFILL_BATCH_SIZE, 1);
    let last_pos = prompt_tokens.len() as i32 - 1;

    // Prefill in chunks so the batch never overflows
    let mut pos = 0i32;
    for chunk in prompt_tokens.chunks(PREFILL_BATCH_SIZE) {
        batch.clear();
        for &token in chunk {
            batch.add(token, pos, &[0], pos == last_pos).map_err(|e| {
                EngineError::Inference(format!("Failed to add token to batch: {}", e))
            })?;
            pos += 1;
        }
        ctx.decode(&mut batch)
            .map_err(|e| EngineError::Inference(format!("Failed to decode prompt: {}", e)))?;
    }

    let mut sampler = build_sampler(request);
    let mut stops = StopMatcher::new(&request.stop);
    let mut utf8 = Utf8Carry::default();
    let mut n_cur = prompt_tokens.len() as i32;
    let mut tokens_generated = 0u32;
    let mut finish = FinishReason::Length;

    while tokens_generated < budget {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!("Generation cancelled after {} tokens", tokens_generated);
            return Err(EngineError::Cancelled);
        }

        let token = sampler.sample(ctx, batch.n_tokens() - 1);
        sampler.accept(token);

        if model.is_eog_token(token) {
            finish = FinishReason::EndOfGeneration;
            break;
        }
        tokens_generated += 1;

        let bytes = model
            .token_to_bytes(token, Special::Tokenize)
            .map_err(|e| {
                EngineError::Inference(format!("Failed to convert token to bytes: {}", e))
            })?;

        if let Some(piece) = utf8.push(&bytes) {
            if stops.push(&piece) {
                break;
            }
        }

        batch.clear();
        batch.add(token, n_cur, &[0], true).map_err(|e| {
            EngineError::Inference(format!("Failed to add token to batch: {}", e))
        })?;
        ctx.decode(&mut batch)
            .map_err(|e| EngineError::Inference(format!("Failed to decode: {}", e)))?;
        n_cur += 1;
    }

    if let Some(stop) = stops.hit() {
        finish = FinishReason::StopSequence(stop.to_string());
    } else if let Some(rest) = utf8.finish() {
        stops.push(&rest);
        if let Some(stop) = stops.hit() {
            finish = FinishReason::StopSequence(stop.to_string());
        }
    }

    tracing::debug!(
        "Generated {} tokens ({:?})",
        tokens_generated,
        finish
    );

    Ok(Completion {
        text: stops.into_text(),
        tokens_generated,
        finish,
    })
}

/// Builds the sampler chain for a request
fn build_sampler(request: &CompletionRequest) -> LlamaSampler {
    if request.temperature < 0.01 {
        // Use greedy sampling for very low temperature
        return LlamaSampler::greedy();
    }

    let seed = request.seed.unwrap_or_else(rand_seed);
    LlamaSampler::chain_simple([
        LlamaSampler::top_k(request.top_k as i32),
        LlamaSampler::top_p(request.top_p, 1),
        LlamaSampler::temp(request.temperature),
        LlamaSampler::dist(seed),
    ])
}

/// Generates a random seed using system entropy
fn rand_seed() -> u32 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    RandomState::new().build_hasher().finish() as u32
}

/// The engine every llama.cpp test shares; the backend can only be initialized once
#[cfg(test)]
pub(crate) fn shared_test_engine() -> Arc<LlamaEngine> {
    use std::sync::OnceLock;

    static ENGINE: OnceLock<Arc<LlamaEngine>> = OnceLock::new();
    let engine = ENGINE.get_or_init(|| {
        Arc::new(LlamaEngine::start(EngineConfig::default()).expect("llama.cpp backend init"))
    });
    Arc::clone(engine)
}

/// Holds back the bytes of a UTF-8 character split across tokens
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    /// Adds token bytes, returning whatever text is complete so far
    fn push(&mut self, bytes: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(bytes);

        let mut complete = 0;
        loop {
            match std::str::from_utf8(&self.pending[complete..]) {
                Ok(_) => {
                    complete = self.pending.len();
                    break;
                }
                // Invalid bytes never become valid; emit them lossily and keep scanning
                Err(e) => match e.error_len() {
                    Some(len) => complete += e.valid_up_to() + len,
                    None => {
                        complete += e.valid_up_to();
                        break;
                    }
                },
            }
        }
        if complete == 0 {
            return None;
        }

        let text = String::from_utf8_lossy(&self.pending[..complete]).into_owned();
        self.pending.drain(..complete);
        Some(text)
    }

    /// Flushes an incomplete tail at the end of generation
    fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}
