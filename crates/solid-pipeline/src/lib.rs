pub mod config;
pub mod outcome;

use chrono::{DateTime, Local};
use solid_core::{OutputPlanner, OutputTarget, classify};
use solid_kernel::GeometryKernel;
use tracing::{debug, info, warn};

pub use config::Settings;
pub use outcome::{FailureKind, GENERATED_MESSAGE, Outcome, PipelineError};

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub requested_at: DateTime<Local>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::at(prompt, Local::now())
    }

    pub fn at(prompt: impl Into<String>, requested_at: DateTime<Local>) -> Self {
        Self {
            prompt: prompt.into(),
            requested_at,
        }
    }
}

/// Single-pass prompt-to-solid run: validate, check the kernel, classify,
/// plan the output path, generate. Each stage is an exit point and nothing
/// is retried.
pub struct Pipeline<K: GeometryKernel> {
    kernel: K,
    planner: OutputPlanner,
}

impl<K: GeometryKernel> Pipeline<K> {
    pub fn new(kernel: K, planner: OutputPlanner) -> Self {
        Self { kernel, planner }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn planner(&self) -> &OutputPlanner {
        &self.planner
    }

    pub fn into_kernel(self) -> K {
        self.kernel
    }

    pub fn run(&self, prompt: &str) -> Outcome {
        self.run_request(&GenerationRequest::new(prompt))
    }

    pub fn run_request(&self, request: &GenerationRequest) -> Outcome {
        match self.execute(request) {
            Ok(target) => {
                info!(shape = %target.solid, path = %target.path.display(), "model generated");
                Outcome::generated(target.path)
            }
            Err(err) => {
                warn!(stage = ?err.kind(), error = %err, "generation stopped");
                Outcome::failed(&err)
            }
        }
    }

    pub fn execute(&self, request: &GenerationRequest) -> Result<OutputTarget, PipelineError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(PipelineError::EmptyPrompt);
        }

        self.kernel
            .ensure_loaded()
            .map_err(PipelineError::KernelUnavailable)?;

        let kind = classify(prompt);
        debug!(prompt, shape = %kind, "prompt classified");
        let solid = kind.solid().ok_or(PipelineError::UnrecognizedPrompt)?;

        let target = self
            .planner
            .plan(solid, request.requested_at.naive_local())?;
        debug!(path = %target.path.display(), "output planned");

        self.kernel
            .generate(solid.code(), &target.path)
            .map_err(PipelineError::Kernel)?;
        Ok(target)
    }
}
