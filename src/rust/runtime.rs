use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use std::sync::OnceLock;

use crate::classifier::ClassifierError;

static ENVIRONMENT: OnceLock<Result<(), String>> = OnceLock::new();

/// Execution settings for the ONNX Runtime session that serves the model.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 0, // Let ONNX Runtime decide
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl RuntimeConfig {
    /// Uses the same thread count for inter- and intra-op parallelism.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.inter_threads = threads;
        self.intra_threads = threads;
        self
    }
}

fn copy_level(level: &GraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        GraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        GraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        GraphOptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        GraphOptimizationLevel::Disable => GraphOptimizationLevel::Disable,
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: copy_level(&self.optimization_level),
        }
    }
}

fn init_onnx_environment() -> Result<(), String> {
    ort::init()
        .with_name("newsclass")
        .commit()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Initializes the process-wide ONNX Runtime environment exactly once.
///
/// A failed first initialization is remembered and reported on every call.
pub fn ensure_initialized() -> Result<(), ClassifierError> {
    ENVIRONMENT
        .get_or_init(|| {
            log::debug!("Initializing ONNX Runtime environment");
            init_onnx_environment()
        })
        .clone()
        .map_err(|reason| ClassifierError::Build(format!("ONNX Runtime initialization failed: {}", reason)))
}

pub fn create_session_builder(config: &RuntimeConfig) -> Result<SessionBuilder, ClassifierError> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    // Configure threading
    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }

    builder = builder.with_optimization_level(copy_level(&config.optimization_level))?;

    Ok(builder)
}
