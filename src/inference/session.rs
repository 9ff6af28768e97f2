//! Model session
//!
//! Loads a model at most once per option set and hands the same handle to every
//! caller for the rest of the process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::inference::engine::{EngineConfig, EngineError, LlamaEngine, LlamaModelHandle};
use crate::inference::model::{validate_gguf, ModelError};
use crate::types::config::ModelOptions;

/// Why a model could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid model options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Validation(#[from] ModelError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Something that turns model options into a usable handle
pub trait ModelLoader: Send + Sync {
    type Handle: Send + Sync;

    fn load(&self, options: &ModelOptions) -> Result<Self::Handle, LoadError>;
}

/// Load-once cache keyed on the full option set
pub struct ModelSession<L: ModelLoader> {
    loader: L,
    handles: Mutex<HashMap<ModelOptions, Arc<L::Handle>>>,
}

impl<L: ModelLoader> ModelSession<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the handle for `options`, loading it on first use
    ///
    /// Failures are not cached, so a later call tries again. The cache lock is
    /// held while loading; concurrent callers wait instead of loading twice.
    pub fn load(&self, options: &ModelOptions) -> Result<Arc<L::Handle>, LoadError> {
        options.check().map_err(LoadError::InvalidOptions)?;

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = handles.get(options) {
            tracing::debug!("Model cache hit for {}", options.path.display());
            return Ok(Arc::clone(handle));
        }

        tracing::info!(
            "Loading model {} (ctx {}, {} threads, {} gpu layers)",
            options.path.display(),
            options.context_window,
            options.threads,
            options.acceleration_layers
        );
        let handle = match self.loader.load(options) {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                tracing::error!("Failed to load {}: {}", options.path.display(), e);
                return Err(e);
            }
        };
        handles.insert(options.clone(), Arc::clone(&handle));
        Ok(handle)
    }

    /// The handle for `options` if it is already loaded
    pub fn cached(&self, options: &ModelOptions) -> Option<Arc<L::Handle>> {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(options)
            .cloned()
    }

    /// Number of distinct option sets loaded so far
    pub fn loaded_count(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Loads GGUF models into a lazily started llama.cpp engine
pub struct LlamaLoader {
    config: EngineConfig,
    engine: OnceCell<Arc<LlamaEngine>>,
}

impl LlamaLoader {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: OnceCell::new(),
        }
    }

    /// A loader over an engine that is already running
    pub fn with_engine(config: EngineConfig, engine: Arc<LlamaEngine>) -> Self {
        Self {
            config,
            engine: OnceCell::with_value(engine),
        }
    }

    fn engine(&self) -> Result<&Arc<LlamaEngine>, EngineError> {
        self.engine
            .get_or_try_init(|| LlamaEngine::start(self.config.clone()).map(Arc::new))
    }
}

impl ModelLoader for LlamaLoader {
    type Handle = LlamaModelHandle;

    fn load(&self, options: &ModelOptions) -> Result<LlamaModelHandle, LoadError> {
        // Cheap header check first; llama.cpp may abort on garbage
        let header = validate_gguf(&options.path)?;
        tracing::debug!(
            "GGUF v{} with {} tensors at {}",
            header.version,
            header.tensor_count,
            options.path.display()
        );

        Ok(self.engine()?.load_model(options)?)
    }
}

/// The session the application runs with
pub type LlamaSession = ModelSession<LlamaLoader>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl CountingLoader {
        fn new() -> Self {
            Self::failing(0)
        }

        fn failing(times: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first: times,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ModelLoader for CountingLoader {
        type Handle = String;

        fn load(&self, options: &ModelOptions) -> Result<String, LoadError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(LoadError::Engine(EngineError::ModelLoad(
                    "simulated failure".to_string(),
                )));
            }
            Ok(options.path.display().to_string())
        }
    }

    #[test]
    fn test_same_options_share_handle() {
        let session = ModelSession::new(CountingLoader::new());
        let options = ModelOptions::new("chat.gguf");

        let first = session.load(&options).unwrap();
        let second = session.load(&options).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.loader.calls(), 1);
        assert_eq!(session.loaded_count(), 1);
    }

    #[test]
    fn test_changed_options_load_again() {
        let session = ModelSession::new(CountingLoader::new());
        let cpu = ModelOptions::new("chat.gguf");
        let gpu = cpu.clone().with_acceleration_layers(32);

        let a = session.load(&cpu).unwrap();
        let b = session.load(&gpu).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(session.loader.calls(), 2);
        assert!(session.cached(&cpu).is_some());
        assert!(session.cached(&gpu.with_threads(8)).is_none());
    }

    #[test]
    fn test_failures_are_not_cached() {
        let session = ModelSession::new(CountingLoader::failing(1));
        let options = ModelOptions::new("chat.gguf");

        let err = session.load(&options).unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(session.cached(&options).is_none());

        assert!(session.load(&options).is_ok());
        assert_eq!(session.loader.calls(), 2);
    }

    #[test]
    fn test_invalid_options_skip_loader() {
        let session = ModelSession::new(CountingLoader::new());
        let err = session
            .load(&ModelOptions::new("chat.gguf").with_threads(0))
            .unwrap_err();

        assert!(matches!(err, LoadError::InvalidOptions(_)));
        assert_eq!(session.loader.calls(), 0);
    }

    #[test]
    fn test_concurrent_callers_load_once() {
        let session = Arc::new(ModelSession::new(CountingLoader::new()));
        let options = ModelOptions::new("chat.gguf");

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                let options = options.clone();
                std::thread::spawn(move || session.load(&options).unwrap())
            })
            .collect();
        let handles: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        assert_eq!(session.loader.calls(), 1);
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_missing_model_file() {
        let session = LlamaSession::new(LlamaLoader::new(EngineConfig::default()));
        let err = session
            .load(&ModelOptions::new("nonexistent.gguf"))
            .unwrap_err();

        assert!(matches!(err, LoadError::Validation(ModelError::NotFound(_))));
        assert!(!err.to_string().is_empty());
        // The engine never started for a file that failed the header check
        assert!(session.loader.engine.get().is_none());
    }

    #[test]
    fn test_loader_reuses_given_engine() {
        let engine = crate::inference::engine::shared_test_engine();
        let loader = LlamaLoader::with_engine(EngineConfig::default(), Arc::clone(&engine));
        assert!(Arc::ptr_eq(loader.engine().unwrap(), &engine));
    }

    #[test]
    fn test_non_gguf_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"this is not a model").unwrap();

        let session = LlamaSession::new(LlamaLoader::new(EngineConfig::default()));
        let err = session.load(&ModelOptions::new(file.path())).unwrap_err();
        assert!(matches!(err, LoadError::Validation(ModelError::InvalidMagic(_))));
    }

    /// Needs a real model: `INVINCIX_TEST_MODEL=/path/model.gguf cargo test -- --ignored`
    #[test]
    #[ignore = "requires a GGUF model file"]
    fn test_end_to_end_answer() {
        use crate::inference::generator::ResponseGenerator;
        use crate::types::config::GenerationRequest;

        let path = std::env::var("INVINCIX_TEST_MODEL").expect("INVINCIX_TEST_MODEL not set");
        let session = LlamaSession::new(LlamaLoader::with_engine(
            EngineConfig::default(),
            crate::inference::engine::shared_test_engine(),
        ));
        let options = ModelOptions::new(path);

        let model = session.load(&options).unwrap();
        assert!(Arc::ptr_eq(&model, &session.load(&options).unwrap()));

        let result = ResponseGenerator::default().generate(
            &*model,
            &GenerationRequest::new("What does INVINCIX do?", 0.7, 300),
        );
        assert!(result.error.is_none(), "{:?}", result.error);
        assert!(!result.text.is_empty());
        assert!(!result.text.contains("### Instruction:"));
    }
}
